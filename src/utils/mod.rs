/// File utilities
pub mod files;

/// Hugging Face utilities
pub mod hugging_face;

/// Compute device selection
pub mod device;

/// Utilities for classification tasks
pub mod classes;
