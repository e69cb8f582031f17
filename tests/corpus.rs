//! Loader + label encoder over a toy on-disk corpus

use burn::data::dataset::Dataset as _;
use pretty_assertions::assert_eq;
use resume_sections::{
    datasets::{resume, LineParsing},
    labels::SectionLabels,
};

const TRAIN: &str = "\
header\texperience\tWork Experience
content\texperience\tSoftware Engineer, Acme Corp (2019-2023)
header\teducation\tEducation
content\teducation\tBSc Computer Science, State University
header\tknowledge\tSkills
content\tknowledge\tRust, Python, distributed systems
header\tproject\tProjects
content\tproject\tBuilt an open-source resume generator
meta\tothers\tjane@example.com | +1 555 0100
content\tothers\tReferences available on request
";

const VALID: &str = "\
content\texperience\tLed a team of four engineers
content\teducation\tGraduated with honors
";

fn write_corpus(name: &str) -> std::path::PathBuf {
    let data_dir = std::env::temp_dir().join(format!(
        "resume-sections-it-{}-{}",
        std::process::id(),
        name
    ));

    for (split, content) in [("train", TRAIN), ("valid", VALID)] {
        let split_dir = data_dir.join(split);
        std::fs::create_dir_all(&split_dir).unwrap();
        std::fs::write(split_dir.join("corpus.tsv"), content).unwrap();
    }

    data_dir
}

fn section_labels(dataset: &resume::Dataset) -> Vec<String> {
    (0..dataset.len())
        .filter_map(|index| dataset.get(index).map(|item| item.section_label()))
        .collect()
}

#[tokio::test]
async fn fits_a_bijective_label_mapping_over_the_corpus() {
    let data_dir = write_corpus("bijection");
    let data_dir_str = data_dir.to_str().unwrap();

    let train = resume::Dataset::load(data_dir_str, "train", LineParsing::Lenient)
        .await
        .unwrap();
    let valid = resume::Dataset::load(data_dir_str, "valid", LineParsing::Lenient)
        .await
        .unwrap();

    assert_eq!(train.len(), 10);
    assert_eq!(valid.len(), 2);
    assert_eq!(train.skipped(), 0);

    let train_labels = section_labels(&train);
    let valid_labels = section_labels(&valid);

    let labels = SectionLabels::fit(train_labels.iter().chain(&valid_labels).cloned());

    // 10 distinct class/label combinations appear in the corpus above
    assert_eq!(labels.len(), 10);

    for label in train_labels.iter().chain(&valid_labels) {
        let id = labels.encode(label).unwrap();
        assert_eq!(labels.decode(id).unwrap(), label.as_str());
    }

    std::fs::remove_dir_all(data_dir).unwrap();
}

#[tokio::test]
async fn preserves_corpus_line_order_and_content() {
    let data_dir = write_corpus("ordering");

    let train = resume::Dataset::load(
        data_dir.to_str().unwrap(),
        "train",
        LineParsing::Lenient,
    )
    .await
    .unwrap();

    let first = train.get(0).unwrap();
    assert_eq!(first.text, "Work Experience");
    assert_eq!(first.section_label(), "header_experience");

    let last = train.get(9).unwrap();
    assert_eq!(last.text, "References available on request");
    assert_eq!(last.section_label(), "content_others");

    std::fs::remove_dir_all(data_dir).unwrap();
}

#[tokio::test]
async fn label_mapping_survives_a_config_round_trip() {
    let data_dir = write_corpus("round-trip");

    let train = resume::Dataset::load(
        data_dir.to_str().unwrap(),
        "train",
        LineParsing::Lenient,
    )
    .await
    .unwrap();

    let fit = SectionLabels::fit(section_labels(&train));

    // The id2label table is what gets persisted in the checkpoint config
    let persisted = serde_json::to_string(fit.id2label()).unwrap();
    let reloaded = SectionLabels::from_id2label(serde_json::from_str(&persisted).unwrap());

    assert_eq!(fit, reloaded);

    std::fs::remove_dir_all(data_dir).unwrap();
}
