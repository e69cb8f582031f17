use std::{fmt::Display, path::Path, str::FromStr};

use burn::data::dataset::{self, InMemDataset};
use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::{pipelines::text_classification, utils::files::read_file};

use super::{DatasetError, LineParsing, LoadableDataset};

/// The name of the resume sections dataset
pub static DATASET: &str = "resume-sections";

/// The structural tag of a resume text span
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Class {
    /// A section heading
    Header,

    /// Body text within a section
    Content,

    /// Contact details, dates, and other metadata
    Meta,
}

/// The semantic section tag of a resume text span
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    /// Work experience
    Experience,

    /// Education history
    Education,

    /// Skills and knowledge
    Knowledge,

    /// Personal or professional projects
    Project,

    /// Anything else
    Others,
}

impl Class {
    /// The tag as it appears in the corpus
    pub fn as_str(&self) -> &'static str {
        match self {
            Class::Header => "header",
            Class::Content => "content",
            Class::Meta => "meta",
        }
    }
}

impl Section {
    /// The tag as it appears in the corpus
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Experience => "experience",
            Section::Education => "education",
            Section::Knowledge => "knowledge",
            Section::Project => "project",
            Section::Others => "others",
        }
    }
}

impl Display for Class {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Class {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "header" => Ok(Class::Header),
            "content" => Ok(Class::Content),
            "meta" => Ok(Class::Meta),
            _ => Err(s.to_string()),
        }
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "experience" => Ok(Section::Experience),
            "education" => Ok(Section::Education),
            "knowledge" => Ok(Section::Knowledge),
            "project" => Ok(Section::Project),
            "others" => Ok(Section::Others),
            _ => Err(s.to_string()),
        }
    }
}

/// A single labeled span of resume text
#[derive(Clone, Debug, Serialize, Deserialize, new)]
pub struct Item {
    /// The text span for classification
    pub text: String,

    /// The structural tag of the span
    pub class: Class,

    /// The semantic section tag of the span
    pub label: Section,
}

impl Item {
    /// The combined section label the classifier is trained on,
    /// e.g. "header_experience"
    pub fn section_label(&self) -> String {
        format!("{}_{}", self.class, self.label)
    }
}

impl text_classification::Item for Item {
    fn input(&self) -> &str {
        &self.text
    }

    fn class_label(&self) -> String {
        self.section_label()
    }
}

/// Struct for the resume sections dataset
pub struct Dataset {
    /// Underlying In-Memory dataset
    dataset: InMemDataset<Item>,

    /// How many lines were skipped during a lenient load
    skipped: usize,
}

/// Implement the Dataset trait for the resume sections dataset
impl dataset::Dataset<Item> for Dataset {
    /// Returns a specific item from the dataset
    fn get(&self, index: usize) -> Option<Item> {
        self.dataset.get(index)
    }

    /// Returns the length of the dataset
    fn len(&self) -> usize {
        self.dataset.len()
    }
}

#[async_trait::async_trait]
impl LoadableDataset<Item> for Dataset {
    async fn load(data_dir: &str, split: &str, parsing: LineParsing) -> Result<Self, DatasetError> {
        Self::load(data_dir, split, parsing).await
    }
}

impl Dataset {
    /// Constructs the dataset for a corpus split ("train", "test", or "valid")
    ///
    /// Every file in the split directory is read line by line. A well-formed
    /// line is `class<TAB>label<TAB>text` with known class and label tags;
    /// the text field is kept verbatim apart from the surrounding line trim.
    pub async fn load(
        data_dir: &str,
        split: &str,
        parsing: LineParsing,
    ) -> Result<Self, DatasetError> {
        let split_dir = Path::new(data_dir).join(split);

        if !split_dir.is_dir() {
            return Err(DatasetError::SplitNotFound(
                split_dir.to_string_lossy().into_owned(),
            ));
        }

        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(&split_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                files.push(entry.path());
            }
        }

        // Directory order is filesystem-dependent
        files.sort();

        let mut items = Vec::new();
        let mut skipped = 0;

        for path in files {
            let file = path.to_string_lossy().into_owned();
            let lines = read_file(&file).await?;

            for (index, line) in lines.iter().enumerate() {
                match parse_line(line, &file, index + 1) {
                    Ok(item) => items.push(item),
                    Err(error) => match parsing {
                        LineParsing::Lenient => skipped += 1,
                        LineParsing::Strict => return Err(error),
                    },
                }
            }
        }

        if skipped > 0 {
            log::warn!(
                "Skipped {} malformed line(s) while loading the '{}' split",
                skipped,
                split
            );
        }

        Ok(Self {
            dataset: InMemDataset::new(items),
            skipped,
        })
    }

    /// How many lines were skipped during a lenient load
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

fn parse_line(line: &str, file: &str, line_no: usize) -> Result<Item, DatasetError> {
    let fields: Vec<&str> = line.trim().split('\t').collect();

    if fields.len() != 3 {
        return Err(DatasetError::MalformedLine {
            file: file.to_string(),
            line: line_no,
            found: fields.len(),
        });
    }

    let class = fields[0]
        .parse::<Class>()
        .map_err(|tag| DatasetError::UnknownTag {
            file: file.to_string(),
            line: line_no,
            kind: "class",
            tag,
        })?;

    let label = fields[1]
        .parse::<Section>()
        .map_err(|tag| DatasetError::UnknownTag {
            file: file.to_string(),
            line: line_no,
            kind: "label",
            tag,
        })?;

    Ok(Item::new(fields[2].to_string(), class, label))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use burn::data::dataset::Dataset as _;
    use pretty_assertions::assert_eq;

    use super::*;

    static TEST_DIR: AtomicUsize = AtomicUsize::new(0);

    fn write_corpus(lines: &[&str]) -> std::path::PathBuf {
        let data_dir = std::env::temp_dir().join(format!(
            "resume-sections-corpus-{}-{}",
            std::process::id(),
            TEST_DIR.fetch_add(1, Ordering::SeqCst)
        ));

        let split_dir = data_dir.join("train");
        std::fs::create_dir_all(&split_dir).unwrap();
        std::fs::write(split_dir.join("resumes.tsv"), lines.join("\n")).unwrap();

        data_dir
    }

    #[tokio::test]
    async fn loads_one_item_per_well_formed_line() {
        let data_dir = write_corpus(&[
            "header\texperience\tWork Experience",
            "content\texperience\tSoftware Engineer at Acme Corp, 2019-2023",
            "meta\tothers\tjane@example.com | +1 555 0100",
        ]);

        let dataset = Dataset::load(
            data_dir.to_str().unwrap(),
            "train",
            LineParsing::Lenient,
        )
        .await
        .unwrap();

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.skipped(), 0);

        let item = dataset.get(1).unwrap();
        assert_eq!(item.text, "Software Engineer at Acme Corp, 2019-2023");
        assert_eq!(item.class, Class::Content);
        assert_eq!(item.label, Section::Experience);
        assert_eq!(item.section_label(), "content_experience");

        std::fs::remove_dir_all(data_dir).unwrap();
    }

    #[tokio::test]
    async fn lenient_load_skips_and_counts_bad_lines() {
        let data_dir = write_corpus(&[
            "header\texperience\tWork Experience",
            "content\tonly two fields",
            "content\texperience\textra\tfield",
            "",
            "banner\texperience\tunknown class tag",
            "content\thobbies\tunknown label tag",
            "meta\tothers\tjane@example.com",
        ]);

        let dataset = Dataset::load(
            data_dir.to_str().unwrap(),
            "train",
            LineParsing::Lenient,
        )
        .await
        .unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.skipped(), 5);

        std::fs::remove_dir_all(data_dir).unwrap();
    }

    #[tokio::test]
    async fn strict_load_fails_on_the_first_bad_line() {
        let data_dir = write_corpus(&[
            "header\texperience\tWork Experience",
            "content\tonly two fields",
        ]);

        let result = Dataset::load(data_dir.to_str().unwrap(), "train", LineParsing::Strict).await;

        match result {
            Err(DatasetError::MalformedLine { line, found, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(found, 2);
            }
            other => panic!("expected MalformedLine, got {:?}", other.map(|d| d.len())),
        }

        std::fs::remove_dir_all(data_dir).unwrap();
    }

    #[tokio::test]
    async fn strict_load_reports_unknown_tags() {
        let data_dir = write_corpus(&["header\thobbies\tMy Hobbies"]);

        let result = Dataset::load(data_dir.to_str().unwrap(), "train", LineParsing::Strict).await;

        match result {
            Err(DatasetError::UnknownTag { kind, tag, .. }) => {
                assert_eq!(kind, "label");
                assert_eq!(tag, "hobbies");
            }
            other => panic!("expected UnknownTag, got {:?}", other.map(|d| d.len())),
        }

        std::fs::remove_dir_all(data_dir).unwrap();
    }

    #[tokio::test]
    async fn missing_split_directory_is_a_not_found_error() {
        let data_dir = write_corpus(&["header\texperience\tWork Experience"]);

        let result = Dataset::load(data_dir.to_str().unwrap(), "valid", LineParsing::Lenient).await;

        assert!(matches!(result, Err(DatasetError::SplitNotFound(_))));

        std::fs::remove_dir_all(data_dir).unwrap();
    }
}
