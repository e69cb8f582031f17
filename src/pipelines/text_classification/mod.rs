/// The unique string token that identifies this pipeline
pub static PIPELINE: &str = "text-classification";

/// Common model config and traits for text classification
pub mod model;

/// Pipeline configuration
pub mod config;

/// Batcher
pub mod batcher;

/// Text Classification Items
pub mod item;

/// Training
pub mod training;

/// Inference
pub mod inference;

pub use batcher::Batcher;
pub use config::Config;
pub use inference::infer;
pub use item::Item;
pub use model::{Model, ModelConfig};
pub use training::train;
