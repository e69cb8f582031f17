//! # Resume Sections
//!
//! Fine-tunes a pretrained BERT encoder to classify spans of resume text
//! into semantic sections (experience, education, knowledge, project, ...).
#![forbid(unsafe_code)]

/// Models
pub mod models;

/// Pipelines
pub mod pipelines;

/// Datasets
pub mod datasets;

/// Section label encoding
pub mod labels;

/// Utilities
pub mod utils;

/// Error macros
#[macro_use]
extern crate anyhow;
