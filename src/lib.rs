//! xml2coco: per-image XML annotations to a COCO dataset.
//!
//! xml2coco reads a directory of per-image XML annotation files (LabelMe /
//! Pascal VOC style bounding boxes) plus the directory of images they refer
//! to, and writes one COCO JSON file with images, categories and
//! annotations. It also wraps an external YOLO detector for fine-tuning and
//! single-image inference.
//!
//! # Modules
//!
//! - [`ir`]: COCO record types and the XML / JSON readers and writers
//! - [`categories`]: the closed category vocabulary
//! - [`conversion`]: the conversion run and its report
//! - [`validation`]: integrity checks on COCO files
//! - [`detect`]: training / inference session against a detector backend
//! - [`error`]: Error types for xml2coco operations

pub mod categories;
pub mod conversion;
pub mod detect;
pub mod error;
pub mod image_probe;
pub mod ir;
pub mod validation;

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use categories::{CategoryTable, DEFAULT_SUPERCATEGORY};
use conversion::{BBoxPolicy, ConvertOptions, ImageErrorPolicy, DEFAULT_OUTPUT};
use detect::{Prompter, SessionOverrides, YoloCli};
use image_probe::ImageProbe;
use ir::DatasetInfo;

pub use error::Xml2CocoError;

/// The xml2coco CLI application.
#[derive(Parser)]
#[command(name = "xml2coco")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Convert a directory of XML annotations into one COCO JSON file.
    Convert(ConvertArgs),
    /// Check a COCO JSON file for broken references and inconsistent records.
    Validate(ValidateArgs),
    /// Optionally fine-tune a YOLO model, then run it on one image.
    Detect(DetectArgs),
}

/// Output format for reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

/// Arguments for the convert subcommand.
#[derive(clap::Args)]
struct ConvertArgs {
    /// Directory holding the image files referenced by the annotations.
    #[arg(long = "images", value_name = "DIR")]
    image_dir: PathBuf,

    /// Directory holding one XML annotation file per image.
    #[arg(long = "annotations", value_name = "DIR")]
    annotation_dir: PathBuf,

    /// Output COCO JSON file. Overwritten if it exists.
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Comma-separated category names, in id order [default: Semantic Drone classes].
    #[arg(long, value_delimiter = ',', conflicts_with = "categories_file")]
    categories: Vec<String>,

    /// File with one category name per line, in id order.
    #[arg(long, value_name = "FILE")]
    categories_file: Option<PathBuf>,

    /// Supercategory written for every category.
    #[arg(long, default_value = DEFAULT_SUPERCATEGORY)]
    supercategory: String,

    /// What to do with boxes whose max corner lies before the min corner.
    #[arg(long, value_enum, default_value = "reject")]
    bbox_policy: BBoxPolicy,

    /// What to do when an image exists but cannot be read.
    #[arg(long = "on-image-error", value_enum, default_value = "abort")]
    image_error_policy: ImageErrorPolicy,

    /// How image dimensions are obtained.
    #[arg(long, value_enum, default_value = "decode")]
    probe: ImageProbe,

    /// Override info.description.
    #[arg(long)]
    description: Option<String>,

    /// Override info.contributor.
    #[arg(long)]
    contributor: Option<String>,

    /// Override info.version.
    #[arg(long = "dataset-version")]
    dataset_version: Option<String>,

    /// Override info.year.
    #[arg(long)]
    year: Option<u32>,

    /// Override info.date_created.
    #[arg(long)]
    date_created: Option<String>,

    /// Format of the conversion report printed to stdout.
    #[arg(long, value_enum, default_value = "text")]
    report: ReportFormat,

    /// Do not draw a progress bar.
    #[arg(short, long)]
    quiet: bool,
}

/// Arguments for the validate subcommand.
#[derive(clap::Args)]
struct ValidateArgs {
    /// COCO JSON file to validate.
    input: PathBuf,

    /// Treat warnings as errors (exit non-zero if any warnings).
    #[arg(long)]
    strict: bool,

    /// Output format for the report.
    #[arg(long, value_enum, default_value = "text")]
    output: ReportFormat,
}

/// Arguments for the detect subcommand. Anything not given is prompted for.
#[derive(clap::Args)]
struct DetectArgs {
    /// Fine-tune before inference.
    #[arg(long, conflicts_with = "no_retrain")]
    retrain: bool,

    /// Skip fine-tuning.
    #[arg(long)]
    no_retrain: bool,

    /// Dataset YAML configuration used for training.
    #[arg(long, value_name = "YAML")]
    data: Option<PathBuf>,

    /// Number of training epochs.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    epochs: Option<u32>,

    /// Image to run inference on.
    #[arg(long)]
    image: Option<PathBuf>,

    /// Pretrained weights identifier.
    #[arg(long, default_value = detect::DEFAULT_WEIGHTS)]
    weights: String,

    /// Where the fine-tuned model is saved and looked for.
    #[arg(long, default_value = detect::DEFAULT_TRAINED_MODEL)]
    trained: PathBuf,

    /// Training image size.
    #[arg(long, default_value_t = detect::DEFAULT_IMAGE_SIZE)]
    imgsz: u32,

    /// The Ultralytics `yolo` executable.
    #[arg(long, env = "XML2COCO_YOLO_BIN", default_value = "yolo")]
    yolo_bin: String,
}

/// Run the xml2coco CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), Xml2CocoError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Convert(args)) => run_convert(args),
        Some(Commands::Validate(args)) => run_validate(args),
        Some(Commands::Detect(args)) => run_detect(args),
        None => {
            println!("xml2coco {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Convert per-image XML annotations into a COCO dataset.");
            println!();
            println!("Run 'xml2coco --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the convert subcommand.
fn run_convert(args: ConvertArgs) -> Result<(), Xml2CocoError> {
    let categories = if let Some(path) = &args.categories_file {
        CategoryTable::from_file(path, &args.supercategory)?
    } else if !args.categories.is_empty() {
        CategoryTable::from_names(args.categories.iter().map(|name| name.trim()), &args.supercategory)?
    } else {
        CategoryTable::semantic_drone(&args.supercategory)?
    };

    let defaults = DatasetInfo::semantic_drone();
    let info = DatasetInfo {
        description: args.description.or(defaults.description),
        version: args.dataset_version.or(defaults.version),
        year: args.year.or(defaults.year),
        contributor: args.contributor.or(defaults.contributor),
        date_created: args.date_created.or(defaults.date_created),
    };

    let mut opts = ConvertOptions::new(args.image_dir, args.annotation_dir, categories);
    opts.info = info;
    opts.bbox_policy = args.bbox_policy;
    opts.image_error_policy = args.image_error_policy;
    opts.probe = args.probe;
    opts.show_progress = !args.quiet;

    let report = conversion::convert_to_file(&opts, &args.output)?;

    match args.report {
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(&report).map_err(|source| {
                Xml2CocoError::CocoJsonWrite {
                    path: PathBuf::from("<stdout>"),
                    source,
                }
            })?;
            println!("{json}");
        }
        ReportFormat::Text => {
            println!("Conversion complete! COCO dataset saved as {}", args.output.display());
            print!("{}", report);
        }
    }

    Ok(())
}

/// Execute the validate subcommand.
fn run_validate(args: ValidateArgs) -> Result<(), Xml2CocoError> {
    let dataset = ir::io_coco_json::read_coco_json(&args.input)?;

    let opts = validation::ValidateOptions {
        strict: args.strict,
    };
    let report = validation::validate_dataset(&dataset, &opts);

    match args.output {
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(&report).map_err(|source| {
                Xml2CocoError::CocoJsonWrite {
                    path: PathBuf::from("<stdout>"),
                    source,
                }
            })?;
            println!("{json}");
        }
        ReportFormat::Text => print!("{}", report),
    }

    if report.passes() {
        Ok(())
    } else {
        Err(Xml2CocoError::ValidationFailed {
            error_count: report.error_count(),
            warning_count: report.warning_count(),
            report,
        })
    }
}

/// Execute the detect subcommand.
fn run_detect(args: DetectArgs) -> Result<(), Xml2CocoError> {
    let retrain = match (args.retrain, args.no_retrain) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    };

    let overrides = SessionOverrides {
        retrain,
        dataset_config: args.data,
        epochs: args.epochs,
        image_path: args.image,
        weights: args.weights,
        trained_model: args.trained,
        image_size: args.imgsz,
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let config = {
        let mut prompter = Prompter::new(stdin.lock(), stdout.lock());
        detect::resolve_session(overrides, &mut prompter)?
    };

    let mut backend = YoloCli::new(args.yolo_bin);
    let mut out = stdout.lock();
    detect::run_session(&config, &mut backend, &mut out)?;
    out.flush()?;
    Ok(())
}
