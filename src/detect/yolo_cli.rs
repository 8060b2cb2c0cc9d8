//! [`DetectorBackend`] that shells out to the Ultralytics `yolo` CLI.
//!
//! Models are weight files: loading only records which file to use, and
//! training points the model at the weights the training run wrote.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;

use super::{DetectorBackend, Detections};
use crate::error::Xml2CocoError;

/// Directory (relative to the working directory) that training runs write to.
const RUNS_PROJECT: &str = "runs/xml2coco";
const RUN_NAME: &str = "train";

/// Weights used by a [`YoloCli`] session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct YoloModel {
    /// Hub identifier (e.g. `yolo11n.pt`) or path to a `.pt` file.
    pub weights: String,
}

/// Runs the `yolo` executable as a child process.
#[derive(Clone, Debug)]
pub struct YoloCli {
    program: String,
    runs_dir: PathBuf,
}

impl YoloCli {
    /// Uses `program` as the `yolo` executable (looked up on `PATH`).
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            runs_dir: PathBuf::from(RUNS_PROJECT),
        }
    }

    /// Weights written by the last training run.
    fn trained_weights(&self) -> PathBuf {
        self.runs_dir.join(RUN_NAME).join("weights").join("last.pt")
    }

    fn run(&self, args: &[String]) -> Result<String, Xml2CocoError> {
        let command = format!("{} {}", self.program, args.join(" "));
        debug!("running {command}");

        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|source| Xml2CocoError::Detector {
                command: command.clone(),
                message: source.to_string(),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            let detail = stderr.trim();
            return Err(Xml2CocoError::Detector {
                command,
                message: if detail.is_empty() {
                    format!("exited with {}", output.status)
                } else {
                    detail.to_string()
                },
            });
        }

        // Ultralytics logs results to stderr on some versions.
        Ok(format!("{}{}", stdout, stderr).trim().to_string())
    }
}

impl Default for YoloCli {
    fn default() -> Self {
        Self::new("yolo")
    }
}

impl DetectorBackend for YoloCli {
    type Model = YoloModel;

    fn load(&mut self, identifier: &str) -> Result<YoloModel, Xml2CocoError> {
        Ok(YoloModel {
            weights: identifier.to_string(),
        })
    }

    fn train(
        &mut self,
        model: &mut YoloModel,
        dataset_config: &Path,
        epochs: u32,
        image_size: u32,
    ) -> Result<(), Xml2CocoError> {
        let args = train_args(model, dataset_config, epochs, image_size, &self.runs_dir);
        self.run(&args)?;

        let weights = self.trained_weights();
        if !weights.is_file() {
            return Err(Xml2CocoError::Detector {
                command: format!("{} {}", self.program, args.join(" ")),
                message: format!("training finished but {} was not written", weights.display()),
            });
        }
        model.weights = weights.to_string_lossy().into_owned();
        Ok(())
    }

    fn save(&mut self, model: &YoloModel, path: &Path) -> Result<(), Xml2CocoError> {
        if Path::new(&model.weights) == path {
            return Ok(());
        }
        fs::copy(&model.weights, path).map_err(Xml2CocoError::Io)?;
        Ok(())
    }

    fn infer(&mut self, model: &YoloModel, image_path: &Path) -> Result<Detections, Xml2CocoError> {
        let text = self.run(&predict_args(model, image_path))?;
        Ok(Detections { text })
    }
}

fn train_args(
    model: &YoloModel,
    dataset_config: &Path,
    epochs: u32,
    image_size: u32,
    runs_dir: &Path,
) -> Vec<String> {
    vec![
        "detect".to_string(),
        "train".to_string(),
        format!("model={}", model.weights),
        format!("data={}", dataset_config.display()),
        format!("epochs={epochs}"),
        format!("imgsz={image_size}"),
        format!("project={}", runs_dir.display()),
        format!("name={RUN_NAME}"),
        "exist_ok=True".to_string(),
    ]
}

fn predict_args(model: &YoloModel, image_path: &Path) -> Vec<String> {
    vec![
        "detect".to_string(),
        "predict".to_string(),
        format!("model={}", model.weights),
        format!("source={}", image_path.display()),
        "save=False".to_string(),
    ]
}
