/// BERT for Text Classification (resume section labeling)
pub mod text_classification;
