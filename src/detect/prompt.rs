//! Interactive prompts for filling in a detection session.
//!
//! Every field that was not given on the command line is asked for, in
//! the order: retrain, dataset config, epoch count, image path.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use super::{SessionConfig, SessionOverrides, DEFAULT_EPOCHS};

/// Line-oriented question/answer over any reader and writer.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Prints `question` and returns the trimmed answer. End of input reads
    /// as an empty answer.
    pub fn ask(&mut self, question: &str) -> io::Result<String> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim().to_string())
    }

    /// Prints a line of feedback.
    pub fn say(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{message}")
    }

    /// Gives back the writer, e.g. to inspect what was printed.
    pub fn into_output(self) -> W {
        self.output
    }
}

/// Completes `overrides` into a [`SessionConfig`], prompting for anything
/// missing.
///
/// Only an exact `yes` (any case) selects retraining. An epoch answer that
/// is not a positive integer falls back to [`DEFAULT_EPOCHS`] with a notice.
pub fn resolve_session<R: BufRead, W: Write>(
    overrides: SessionOverrides,
    prompter: &mut Prompter<R, W>,
) -> io::Result<SessionConfig> {
    let retrain = match overrides.retrain {
        Some(retrain) => retrain,
        None => {
            let answer = prompter.ask("Do you want to retrain the model? (yes/no): ")?;
            answer.eq_ignore_ascii_case("yes")
        }
    };

    let mut dataset_config = overrides.dataset_config;
    let mut epochs = overrides.epochs.unwrap_or(DEFAULT_EPOCHS);

    if retrain {
        if dataset_config.is_none() {
            let answer = prompter.ask("Enter path to your dataset YAML configuration file: ")?;
            dataset_config = Some(PathBuf::from(answer));
        }

        if overrides.epochs.is_none() {
            let answer = prompter.ask("Enter number of training epochs: ")?;
            epochs = match parse_epochs(&answer) {
                Some(epochs) => epochs,
                None => {
                    prompter.say(&format!(
                        "Invalid input for epochs. Using default of {DEFAULT_EPOCHS} epoch."
                    ))?;
                    DEFAULT_EPOCHS
                }
            };
        }
    }

    let image_path = match overrides.image_path {
        Some(path) => path,
        None => PathBuf::from(prompter.ask("Enter the path to the image for prediction: ")?),
    };

    Ok(SessionConfig {
        retrain,
        dataset_config,
        epochs,
        image_path,
        weights: overrides.weights,
        trained_model: overrides.trained_model,
        image_size: overrides.image_size,
    })
}

/// Parses a positive epoch count.
pub fn parse_epochs(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|epochs| *epochs > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn retrain_prompts_for_everything() {
        let mut prompter = prompter("yes\ndata/drone.yaml\n5\nimgs/a.jpg\n");
        let config = resolve_session(SessionOverrides::default(), &mut prompter).expect("resolve");

        assert!(config.retrain);
        assert_eq!(config.dataset_config, Some(PathBuf::from("data/drone.yaml")));
        assert_eq!(config.epochs, 5);
        assert_eq!(config.image_path, PathBuf::from("imgs/a.jpg"));
    }

    #[test]
    fn invalid_epochs_fall_back_to_one() {
        let mut prompter = prompter("YES\ndata.yaml\nten\nimg.jpg\n");
        let config = resolve_session(SessionOverrides::default(), &mut prompter).expect("resolve");

        assert_eq!(config.epochs, 1);
        let printed = String::from_utf8(prompter.into_output()).expect("utf8");
        assert!(printed.contains("Invalid input for epochs. Using default of 1 epoch."));
    }

    #[test]
    fn anything_but_yes_skips_training_prompts() {
        let mut prompter = prompter("y\nimg.jpg\n");
        let config = resolve_session(SessionOverrides::default(), &mut prompter).expect("resolve");

        assert!(!config.retrain);
        assert_eq!(config.dataset_config, None);
        assert_eq!(config.image_path, PathBuf::from("img.jpg"));
        let printed = String::from_utf8(prompter.into_output()).expect("utf8");
        assert!(!printed.contains("epochs"));
    }

    #[test]
    fn flags_suppress_prompts() {
        let overrides = SessionOverrides {
            retrain: Some(true),
            dataset_config: Some(PathBuf::from("d.yaml")),
            epochs: Some(3),
            image_path: Some(PathBuf::from("i.png")),
            ..Default::default()
        };
        let mut prompter = prompter("");
        let config = resolve_session(overrides, &mut prompter).expect("resolve");

        assert_eq!(config.epochs, 3);
        assert!(prompter.into_output().is_empty());
    }

    #[test]
    fn parse_epochs_rejects_zero_and_negative() {
        assert_eq!(parse_epochs(" 12 "), Some(12));
        assert_eq!(parse_epochs("0"), None);
        assert_eq!(parse_epochs("-3"), None);
        assert_eq!(parse_epochs(""), None);
    }
}
