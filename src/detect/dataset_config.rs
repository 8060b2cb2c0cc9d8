//! Preflight check of a YOLO dataset configuration file.
//!
//! Training takes a YAML file describing image locations and class names.
//! The file is read before any model is loaded, so a bad path or a file
//! without class names fails the session immediately.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_yaml::Value;

use crate::error::Xml2CocoError;

#[derive(Debug, Deserialize)]
struct DatasetConfigFile {
    #[serde(default)]
    train: Option<Value>,
    #[serde(default)]
    names: Option<Value>,
}

/// Summary of a dataset configuration that passed preflight.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetConfigSummary {
    pub class_count: usize,
}

/// Checks that `path` is a readable YAML mapping with a `train` entry and a
/// non-empty `names` list or map.
pub fn preflight_dataset_config(path: &Path) -> Result<DatasetConfigSummary, Xml2CocoError> {
    let invalid = |message: String| Xml2CocoError::DatasetConfigInvalid {
        path: path.to_path_buf(),
        message,
    };

    let contents = fs::read_to_string(path).map_err(|source| invalid(source.to_string()))?;
    let config: DatasetConfigFile =
        serde_yaml::from_str(&contents).map_err(|source| invalid(source.to_string()))?;

    if config.train.is_none() {
        return Err(invalid("missing 'train' entry".to_string()));
    }

    let class_count = match config.names {
        Some(Value::Sequence(names)) => names.len(),
        Some(Value::Mapping(names)) => names.len(),
        Some(_) => return Err(invalid("'names' must be a list or a map".to_string())),
        None => return Err(invalid("missing 'names' entry".to_string())),
    };

    if class_count == 0 {
        return Err(invalid("'names' is empty".to_string()));
    }

    Ok(DatasetConfigSummary { class_count })
}
