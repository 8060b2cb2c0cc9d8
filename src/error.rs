use std::path::PathBuf;
use thiserror::Error;

use crate::validation::ValidationReport;

/// The main error type for xml2coco operations.
#[derive(Debug, Error)]
pub enum Xml2CocoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse annotation XML {path}: {message}")]
    XmlParse { path: PathBuf, message: String },

    #[error("Failed to read annotation directory {path}: {message}")]
    AnnotationDirInvalid { path: PathBuf, message: String },

    #[error("Failed to read image dimensions from {path}: {message}")]
    ImageUnreadable { path: PathBuf, message: String },

    #[error("Failed to parse COCO JSON from {path}: {source}")]
    CocoJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write COCO JSON to {path}: {source}")]
    CocoJsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid category configuration: {0}")]
    InvalidCategories(String),

    #[error("Invalid dataset config {path}: {message}")]
    DatasetConfigInvalid { path: PathBuf, message: String },

    #[error("Detector command '{command}' failed: {message}")]
    Detector { command: String, message: String },

    #[error("Validation failed with {error_count} error(s) and {warning_count} warning(s)")]
    ValidationFailed {
        error_count: usize,
        warning_count: usize,
        report: ValidationReport,
    },

    #[error("Unsupported value: {0}")]
    Unsupported(String),
}
