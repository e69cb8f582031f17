use async_trait::async_trait;

/// The resume sections dataset
pub mod resume;

/// A dataset which can be loaded from a corpus split on disk
#[async_trait]
pub trait LoadableDataset<I>: burn::data::dataset::Dataset<I> {
    /// Load the dataset for the given split
    async fn load(data_dir: &str, split: &str, parsing: LineParsing) -> Result<Self, DatasetError>
    where
        Self: std::marker::Sized;
}

/// How to treat corpus lines that don't parse
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum LineParsing {
    /// Skip bad lines and count them, surfacing the count to the caller
    #[default]
    Lenient,

    /// Abort the load on the first bad line
    Strict,
}

/// The Dataset enum
pub enum Dataset {
    /// Resume sections dataset
    ResumeSections,
}

impl TryFrom<String> for Dataset {
    type Error = DatasetError;

    /// Try to convert a string to a Dataset
    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == *resume::DATASET {
            Ok(Dataset::ResumeSections)
        } else {
            Err(Self::Error::Unknown(value))
        }
    }
}

impl From<Dataset> for String {
    fn from(dataset: Dataset) -> Self {
        match dataset {
            Dataset::ResumeSections => resume::DATASET.to_string(),
        }
    }
}

/// Dataset Error
#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    /// No dataset found for the given string
    #[error("no dataset found for {0}")]
    Unknown(String),

    /// The corpus split directory does not exist
    #[error("corpus split directory not found: {0}")]
    SplitNotFound(String),

    /// A line did not split into the expected three tab-separated fields
    #[error("{file}:{line}: expected 3 tab-separated fields, found {found}")]
    MalformedLine {
        /// The file containing the bad line
        file: String,
        /// The 1-based line number
        line: usize,
        /// The number of fields found
        found: usize,
    },

    /// A class or label field held a value outside the known tags
    #[error("{file}:{line}: unknown {kind} tag '{tag}'")]
    UnknownTag {
        /// The file containing the bad line
        file: String,
        /// The 1-based line number
        line: usize,
        /// Which field was bad ("class" or "label")
        kind: &'static str,
        /// The unrecognized tag value
        tag: String,
    },

    /// An underlying I/O failure
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
