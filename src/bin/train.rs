//! Command line tool to fine-tune a section classifier on a labeled corpus

use anyhow::anyhow;
use burn::{
    backend::{Autodiff, LibTorch},
    data::dataset::Dataset as _,
};
use pico_args::Arguments;
use resume_sections::{
    datasets::{resume, Dataset, LineParsing},
    labels::SectionLabels,
    models::bert,
    pipelines::{text_classification, Pipeline},
    utils::device::parse_device,
};

const HELP: &str = "\
Usage: train PIPELINE DATASET [OPTIONS]

Arguments:
  PIPELINE             The pipeline to use (e.g., 'text-classification')
  DATASET              The dataset to use (e.g., 'resume-sections')

Options:
  -h, --help           Print help
  -m, --model          The model to use (e.g., 'bert-base-uncased')
  -d, --data-dir       The path to the top-level data directory (defaults to 'data')
  -n, --num-epochs     Number of epochs to train for
  -b, --batch-size     Batch size
  --device             The compute device to train on (e.g., 'cpu', 'cuda:0')
  --strict             Abort on malformed corpus lines instead of skipping them
";

#[derive(Debug)]
struct Args {
    pipeline: String,
    dataset: String,
    model: Option<String>,
    num_epochs: Option<usize>,
    batch_size: Option<usize>,
    data_dir: Option<String>,
    device: Option<String>,
    strict: bool,
}

impl Args {
    fn parse() -> anyhow::Result<Option<Self>> {
        let mut pargs = Arguments::from_env();

        // Help has a higher priority and should be handled separately.
        if pargs.contains(["-h", "--help"]) {
            return Ok(None);
        }

        let args = Args {
            model: pargs.opt_value_from_str(["-m", "--model"])?,
            num_epochs: pargs.opt_value_from_str(["-n", "--num-epochs"])?,
            batch_size: pargs.opt_value_from_str(["-b", "--batch-size"])?,
            data_dir: pargs.opt_value_from_str(["-d", "--data-dir"])?,
            device: pargs.opt_value_from_str("--device")?,
            strict: pargs.contains("--strict"),
            pipeline: pargs.free_from_str().map_err(|e| match e {
                pico_args::Error::MissingArgument => anyhow!("Missing required argument: PIPELINE"),
                _ => anyhow!("{}", e),
            })?,
            dataset: pargs.free_from_str().map_err(|e| match e {
                pico_args::Error::MissingArgument => anyhow!("Missing required argument: DATASET"),
                _ => anyhow!("{}", e),
            })?,
        };

        Ok(Some(args))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let output = Args::parse()?;

    if output.is_none() {
        print!("{}", HELP);

        return Ok(());
    }
    let args = output.unwrap();

    let pipeline = Pipeline::try_from(args.pipeline.clone())?;

    let model_name = args
        .model
        .clone()
        .unwrap_or_else(|| pipeline.default_model().to_string());

    pipeline.supports_model(&model_name)?;

    let dataset = Dataset::try_from(args.dataset.clone())?;

    match pipeline {
        Pipeline::TextClassification => {
            handle_text_classification(&dataset, &model_name, &args).await
        }
    }
}

async fn handle_text_classification(
    dataset: &Dataset,
    model_name: &str,
    args: &Args,
) -> anyhow::Result<()> {
    let data_dir = args.data_dir.clone().unwrap_or_else(|| "data".to_string());

    let parsing = if args.strict {
        LineParsing::Strict
    } else {
        LineParsing::Lenient
    };

    let device = parse_device(args.device.as_deref().unwrap_or("cuda"))?;

    match dataset {
        Dataset::ResumeSections => {
            let corpus_dir = format!("{}/datasets/{}", data_dir, resume::DATASET);

            let train = resume::Dataset::load(&corpus_dir, "train", parsing).await?;
            let valid = resume::Dataset::load(&corpus_dir, "valid", parsing).await?;

            let labels = SectionLabels::fit(section_labels(&train).chain(section_labels(&valid)));

            let mut config = text_classification::config::Training::new(
                model_name.to_string(),
                resume::DATASET.to_string(),
                labels.labels(),
            );

            config.data_dir = data_dir;

            if let Some(num_epochs) = args.num_epochs {
                config.num_epochs = num_epochs;
            }

            if let Some(batch_size) = args.batch_size {
                config.batch_size = batch_size;
            }

            text_classification::train::<
                Autodiff<LibTorch>,
                bert::text_classification::Model<Autodiff<LibTorch>>,
                resume::Item,
                resume::Dataset,
            >(vec![device], train, valid, config)
            .await?;
        }
    }

    Ok(())
}

fn section_labels(dataset: &resume::Dataset) -> impl Iterator<Item = String> + '_ {
    (0..dataset.len()).filter_map(|index| dataset.get(index).map(|item| item.section_label()))
}
