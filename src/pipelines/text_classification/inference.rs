use std::sync::Arc;

use burn::{
    config::Config as _,
    data::dataloader::batcher::Batcher as BatcherTrait,
    module::Module,
    record::{CompactRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};
use tokenizers::Tokenizer;

use crate::labels::{LabelError, SectionLabels};

use super::{Batcher, Model, ModelConfig};

/// Label a batch of raw text samples against a trained checkpoint, returning
/// `(text, predicted label)` pairs in the same order as the input
pub fn infer<B, M>(
    device: B::Device, // Device on which to perform computation (e.g., CPU or CUDA device)
    data_dir: &str,    // The location of the top-level data directory
    model_name: &str,  // The name of the model (e.g., "bert-base-uncased")
    samples: Vec<String>, // Text samples for inference
) -> anyhow::Result<Vec<(String, String)>>
where
    B: AutodiffBackend,
    M: Model<B> + 'static,
    i64: std::convert::From<<B as burn::tensor::backend::Backend>::IntElem>,
{
    if samples.is_empty() {
        return Ok(Vec::new());
    }

    let artifact_dir = format!("{}/text-classification/{}", data_dir, model_name);
    let config_path = format!("{artifact_dir}/config.json");

    // Load the checkpoint configuration, which carries the label mapping fit
    // at training time. Dropout is zeroed so repeated calls agree.
    let config = M::Config::load(config_path.as_str())
        .map_err(|e| anyhow!("Checkpoint config not found at {}: {}", config_path, e))?
        .with_hidden_dropout(0.0);

    let labels = SectionLabels::from_id2label(config.get_config().id2label);

    // Initialize tokenizer
    let tokenizer = Tokenizer::from_pretrained(model_name, None)
        .map_err(|e| anyhow!("Unable to load tokenizer for {}: {}", model_name, e))?;

    // Initialize batcher for batching samples
    let batcher = Arc::new(Batcher::<B>::new(
        tokenizer,
        config.get_config(),
        device.clone(),
    ));

    log::info!("Loading weights from {}", artifact_dir);

    let record = CompactRecorder::new()
        .load(format!("{artifact_dir}/model").into(), &device)
        .map_err(|e| anyhow!("Checkpoint weights not found in {}: {}", artifact_dir, e))?;

    // Create model using loaded weights
    let model = config.init::<B>(&device).load_record(record);

    log::info!("Running inference on {} sample(s)", samples.len());

    let item = batcher.batch(samples.clone());
    let output = model.infer(item);

    let indexes = output.argmax(1).into_data().convert::<i64>().value;

    Ok(pair_predictions(samples, indexes, &labels)?)
}

/// Pair input texts with decoded predictions, preserving input order
fn pair_predictions(
    samples: Vec<String>,
    indexes: Vec<i64>,
    labels: &SectionLabels,
) -> Result<Vec<(String, String)>, LabelError> {
    samples
        .into_iter()
        .zip(indexes)
        .map(|(text, index)| {
            let label = labels.decode(index as usize)?.to_string();

            Ok((text, label))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use burn::backend::{libtorch::LibTorchDevice, Autodiff, LibTorch};
    use pretty_assertions::assert_eq;

    use crate::models::bert;

    use super::*;

    fn fitted() -> SectionLabels {
        SectionLabels::fit(vec![
            "content_education",
            "header_experience",
            "meta_others",
        ])
    }

    #[test]
    fn pairing_preserves_input_order() {
        let samples = vec![
            "Work Experience".to_string(),
            "BSc Computer Science".to_string(),
            "jane@example.com".to_string(),
        ];

        let pairs = pair_predictions(samples, vec![1, 0, 2], &fitted()).unwrap();

        assert_eq!(
            pairs,
            vec![
                ("Work Experience".to_string(), "header_experience".to_string()),
                (
                    "BSc Computer Science".to_string(),
                    "content_education".to_string()
                ),
                ("jane@example.com".to_string(), "meta_others".to_string()),
            ]
        );
    }

    #[test]
    fn pairing_surfaces_out_of_range_predictions() {
        let result = pair_predictions(vec!["text".to_string()], vec![9], &fitted());

        assert_eq!(result, Err(LabelError::UnknownId(9)));
    }

    #[test]
    fn empty_input_returns_empty_output_without_a_checkpoint() {
        // The data directory does not exist; an empty batch must return
        // before any checkpoint or tokenizer access
        let pairs = infer::<
            Autodiff<LibTorch>,
            bert::text_classification::Model<Autodiff<LibTorch>>,
        >(
            LibTorchDevice::Cpu,
            "no-such-data-dir",
            "bert-base-uncased",
            Vec::new(),
        )
        .unwrap();

        assert_eq!(pairs, Vec::new());
    }
}
