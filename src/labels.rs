//! Section label encoding
//!
//! Maps each distinct combined `class_label` string (e.g.
//! "header_experience") to a dense integer class id and back. The table is
//! fit once at training time, in sorted order of the distinct strings, and
//! written into the checkpoint's `config.json` so that inference reloads the
//! exact training-time mapping rather than refitting.

use std::collections::{BTreeMap, BTreeSet};

use crate::utils::classes::invert_map;

/// A bijective mapping between section label strings and dense class ids
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionLabels {
    /// A mapping from class ids to section label strings
    id2label: BTreeMap<usize, String>,

    /// A mapping from section label strings to class ids
    label2id: BTreeMap<String, usize>,
}

impl SectionLabels {
    /// Fit the mapping over an iterator of section label strings, assigning
    /// ids in sorted order of the distinct labels
    pub fn fit<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let distinct: BTreeSet<String> = labels.into_iter().map(Into::into).collect();

        let id2label: BTreeMap<usize, String> = distinct.into_iter().enumerate().collect();
        let label2id = invert_map(id2label.clone());

        Self { id2label, label2id }
    }

    /// Rebuild the mapping from a persisted id2label table
    pub fn from_id2label(id2label: BTreeMap<usize, String>) -> Self {
        let label2id = invert_map(id2label.clone());

        Self { id2label, label2id }
    }

    /// Encode a section label string to its class id
    pub fn encode(&self, label: &str) -> Result<usize, LabelError> {
        self.label2id
            .get(label)
            .copied()
            .ok_or_else(|| LabelError::Unknown(label.to_string()))
    }

    /// Decode a class id back to its section label string
    pub fn decode(&self, id: usize) -> Result<&str, LabelError> {
        self.id2label
            .get(&id)
            .map(String::as_str)
            .ok_or(LabelError::UnknownId(id))
    }

    /// The fitted id2label table, for persistence in the model config
    pub fn id2label(&self) -> &BTreeMap<usize, String> {
        &self.id2label
    }

    /// The fitted labels in id order
    pub fn labels(&self) -> Vec<String> {
        self.id2label.values().cloned().collect()
    }

    /// The number of distinct labels
    pub fn len(&self) -> usize {
        self.id2label.len()
    }

    /// Whether the mapping is empty
    pub fn is_empty(&self) -> bool {
        self.id2label.is_empty()
    }
}

/// Label encoding errors
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum LabelError {
    /// The label was not present when the mapping was fit
    #[error("unknown label '{0}': not present when the label mapping was fit")]
    Unknown(String),

    /// The class id is outside the fitted mapping
    #[error("unknown class id {0}: outside the fitted label mapping")]
    UnknownId(usize),
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn encode_decode_is_a_bijection() {
        let labels = SectionLabels::fit(vec![
            "header_experience",
            "content_experience",
            "header_education",
            "content_education",
            "meta_others",
        ]);

        assert_eq!(labels.len(), 5);

        for label in labels.labels() {
            let id = labels.encode(&label).unwrap();
            assert_eq!(labels.decode(id).unwrap(), label);
        }
    }

    #[test]
    fn fit_is_deterministic_regardless_of_input_order() {
        let a = SectionLabels::fit(vec!["header_project", "content_knowledge", "meta_others"]);
        let b = SectionLabels::fit(vec!["meta_others", "header_project", "content_knowledge"]);

        assert_eq!(a, b);
        assert_eq!(a.encode("content_knowledge").unwrap(), 0);
        assert_eq!(a.encode("header_project").unwrap(), 1);
        assert_eq!(a.encode("meta_others").unwrap(), 2);
    }

    #[test]
    fn duplicate_labels_collapse_to_one_id() {
        let labels = SectionLabels::fit(vec![
            "header_experience",
            "header_experience",
            "content_experience",
        ]);

        assert_eq!(labels.len(), 2);
    }

    #[test]
    fn unknown_label_is_a_distinct_error() {
        let labels = SectionLabels::fit(vec!["header_experience"]);

        assert_eq!(
            labels.encode("header_hobbies"),
            Err(LabelError::Unknown("header_hobbies".to_string()))
        );
    }

    #[test]
    fn unknown_id_is_a_distinct_error() {
        let labels = SectionLabels::fit(vec!["header_experience"]);

        assert_eq!(labels.decode(7), Err(LabelError::UnknownId(7)));
    }

    #[test]
    fn round_trips_through_a_persisted_table() {
        let fit = SectionLabels::fit(vec!["header_experience", "content_project"]);
        let reloaded = SectionLabels::from_id2label(fit.id2label().clone());

        assert_eq!(fit, reloaded);
    }
}
