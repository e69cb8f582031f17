use crate::models::bert;

/// Text Classification
pub mod text_classification;

/// Available Pipelines
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Pipeline {
    /// Text Classification
    TextClassification,
}

impl Pipeline {
    /// Get the unique string token that identifies this pipeline
    pub fn as_str(&self) -> &str {
        match self {
            Pipeline::TextClassification => text_classification::PIPELINE,
        }
    }

    /// Get the default model for this pipeline
    pub fn default_model(&self) -> &'static str {
        match self {
            Pipeline::TextClassification => bert::text_classification::DEFAULT_MODEL,
        }
    }

    /// Check that a model name is supported by this pipeline
    pub fn supports_model(&self, model_name: &str) -> Result<(), PipelineError> {
        match self {
            Pipeline::TextClassification => {
                if bert::text_classification::MODELS.contains(&model_name) {
                    Ok(())
                } else {
                    Err(PipelineError::UnsupportedModel(model_name.to_string()))
                }
            }
        }
    }
}

impl TryFrom<String> for Pipeline {
    type Error = PipelineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == text_classification::PIPELINE {
            Ok(Pipeline::TextClassification)
        } else {
            Err(PipelineError::Unknown(value))
        }
    }
}

/// Pipeline Error
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// No pipeline found for the given string
    #[error("no pipeline found for {0}")]
    Unknown(String),

    /// The model is not supported by the pipeline
    #[error("model {0} is not supported by this pipeline")]
    UnsupportedModel(String),
}
