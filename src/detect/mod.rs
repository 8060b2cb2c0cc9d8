//! Detection session: optional fine-tuning followed by one inference.
//!
//! The detector itself is external. This module decides what to ask it to
//! do, given a [`SessionConfig`], and talks to it through
//! [`DetectorBackend`]. The shipped backend is [`YoloCli`], which drives the
//! Ultralytics `yolo` command-line tool.
//!
//! A session:
//! 1. with `retrain`, loads the pretrained weights, trains on the dataset
//!    config and saves the result to the trained-model path;
//! 2. otherwise loads the trained model if one was saved earlier, falling
//!    back to the pretrained weights;
//! 3. stops with a message if the image does not exist;
//! 4. runs inference on the image and prints the result.

mod dataset_config;
mod prompt;
mod yolo_cli;

pub use dataset_config::{preflight_dataset_config, DatasetConfigSummary};
pub use prompt::{parse_epochs, resolve_session, Prompter};
pub use yolo_cli::{YoloCli, YoloModel};

use std::io::Write;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::Xml2CocoError;

/// Pretrained weights loaded when no trained model is available.
pub const DEFAULT_WEIGHTS: &str = "yolo11n.pt";
/// Where a fine-tuned model is saved and looked for.
pub const DEFAULT_TRAINED_MODEL: &str = "trained_model.pt";
/// Training image size.
pub const DEFAULT_IMAGE_SIZE: u32 = 640;
/// Epoch count used when the given count is not a positive integer.
pub const DEFAULT_EPOCHS: u32 = 1;

/// A fully specified detection session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    pub retrain: bool,
    /// Dataset YAML used for training. Required when `retrain` is set.
    pub dataset_config: Option<PathBuf>,
    pub epochs: u32,
    pub image_path: PathBuf,
    /// Pretrained weights identifier.
    pub weights: String,
    pub trained_model: PathBuf,
    pub image_size: u32,
}

/// Session fields given up front (e.g. as flags). Anything left `None` is
/// prompted for by [`resolve_session`].
#[derive(Clone, Debug)]
pub struct SessionOverrides {
    pub retrain: Option<bool>,
    pub dataset_config: Option<PathBuf>,
    pub epochs: Option<u32>,
    pub image_path: Option<PathBuf>,
    pub weights: String,
    pub trained_model: PathBuf,
    pub image_size: u32,
}

impl Default for SessionOverrides {
    fn default() -> Self {
        Self {
            retrain: None,
            dataset_config: None,
            epochs: None,
            image_path: None,
            weights: DEFAULT_WEIGHTS.to_string(),
            trained_model: PathBuf::from(DEFAULT_TRAINED_MODEL),
            image_size: DEFAULT_IMAGE_SIZE,
        }
    }
}

/// Printable output of one inference call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Detections {
    pub text: String,
}

/// The capabilities a session needs from a detector.
pub trait DetectorBackend {
    type Model;

    /// Loads a model from a pretrained-weights identifier or a saved model path.
    fn load(&mut self, identifier: &str) -> Result<Self::Model, Xml2CocoError>;

    fn train(
        &mut self,
        model: &mut Self::Model,
        dataset_config: &Path,
        epochs: u32,
        image_size: u32,
    ) -> Result<(), Xml2CocoError>;

    /// Persists a model so a later [`DetectorBackend::load`] of `path` finds it.
    fn save(&mut self, model: &Self::Model, path: &Path) -> Result<(), Xml2CocoError>;

    fn infer(&mut self, model: &Self::Model, image_path: &Path)
        -> Result<Detections, Xml2CocoError>;
}

/// How a session ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionOutcome {
    Predicted(Detections),
    /// The image path did not exist; nothing was inferred.
    ImageNotFound,
}

/// Runs one session against `backend`, printing progress to `out`.
pub fn run_session<B: DetectorBackend, W: Write>(
    config: &SessionConfig,
    backend: &mut B,
    out: &mut W,
) -> Result<SessionOutcome, Xml2CocoError> {
    let model = if config.retrain {
        let dataset_config = config
            .dataset_config
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
            .ok_or_else(|| {
                Xml2CocoError::Unsupported("retraining requires a dataset config path".to_string())
            })?;
        let summary = preflight_dataset_config(dataset_config)?;
        info!(
            "dataset config {} declares {} class(es)",
            dataset_config.display(),
            summary.class_count
        );

        writeln!(out, "Loading a pre-trained model for training")?;
        let mut model = backend.load(&config.weights)?;

        writeln!(
            out,
            "Starting training for {} epoch(s) on data config: {}",
            config.epochs,
            dataset_config.display()
        )?;
        backend.train(&mut model, dataset_config, config.epochs, config.image_size)?;

        backend.save(&model, &config.trained_model)?;
        writeln!(
            out,
            "Model trained and saved to {}",
            config.trained_model.display()
        )?;
        model
    } else if config.trained_model.exists() {
        writeln!(out, "Loading the previously trained model")?;
        backend.load(&config.trained_model.to_string_lossy())?
    } else {
        writeln!(out, "No trained model found. Loading pre-trained model instead")?;
        backend.load(&config.weights)?
    };

    if !config.image_path.exists() {
        writeln!(
            out,
            "Image file '{}' not found. Exiting.",
            config.image_path.display()
        )?;
        return Ok(SessionOutcome::ImageNotFound);
    }

    writeln!(out, "Running inference on {}...", config.image_path.display())?;
    let detections = backend.infer(&model, &config.image_path)?;
    writeln!(out, "{}", detections.text)?;

    Ok(SessionOutcome::Predicted(detections))
}
