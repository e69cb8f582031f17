//! Command line tool to label resume text spans against a trained checkpoint

use std::io::BufRead;

use anyhow::{anyhow, Result};
use burn::backend::{Autodiff, LibTorch};
use pico_args::Arguments;
use resume_sections::{
    models::bert,
    pipelines::{text_classification, Pipeline},
    utils::device::parse_device,
};

const HELP: &str = "\
Usage: infer PIPELINE [OPTIONS] [TEXT]...

Arguments:
  PIPELINE             The pipeline to use (e.g., 'text-classification')
  TEXT                 Text samples to label; read from stdin when omitted

Options:
  -h, --help           Print help
  -m, --model          The model to use (e.g., 'bert-base-uncased')
  -d, --data-dir       The path to the top-level data directory (defaults to 'data')
  --device             The compute device to run on (e.g., 'cpu', 'cuda:0')
";

#[derive(Debug)]
struct Args {
    /// Prints the usage menu
    help: bool,

    /// The pipeline to use
    pipeline: String,

    /// The model to use
    model: Option<String>,

    /// The top-level data directory
    data_dir: Option<String>,

    /// The compute device to run on
    device: Option<String>,

    /// Text samples to label
    samples: Vec<String>,
}

fn parse_args() -> Result<Args, pico_args::Error> {
    let mut pargs = Arguments::from_env();

    let args = Args {
        help: pargs.contains(["-h", "--help"]),
        model: pargs.opt_value_from_str(["-m", "--model"])?,
        data_dir: pargs.opt_value_from_str(["-d", "--data-dir"])?,
        device: pargs.opt_value_from_str("--device")?,
        pipeline: pargs.free_from_str()?,
        samples: pargs
            .finish()
            .into_iter()
            .map(|s| s.to_string_lossy().into_owned())
            .collect(),
    };

    Ok(args)
}

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();

    let args = parse_args()?;

    if args.help {
        println!("{}", HELP);
        return Ok(());
    }

    let pipeline = Pipeline::try_from(args.pipeline.clone())?;

    let model_name = args
        .model
        .clone()
        .unwrap_or_else(|| pipeline.default_model().to_string());

    pipeline.supports_model(&model_name)?;

    let data_dir = args.data_dir.clone().unwrap_or_else(|| "data".to_string());

    let device = parse_device(args.device.as_deref().unwrap_or("cuda"))?;

    let samples = if args.samples.is_empty() {
        read_stdin_samples()?
    } else {
        args.samples
    };

    let predictions = text_classification::infer::<
        Autodiff<LibTorch>,
        bert::text_classification::Model<Autodiff<LibTorch>>,
    >(device, &data_dir, &model_name, samples)?;

    for (text, label) in predictions {
        println!("{}\t{}", text, label);
    }

    Ok(())
}

fn read_stdin_samples() -> Result<Vec<String>> {
    let stdin = std::io::stdin();
    let samples = stdin
        .lock()
        .lines()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| anyhow!("Unable to read samples from stdin: {}", e))?;

    Ok(samples)
}
