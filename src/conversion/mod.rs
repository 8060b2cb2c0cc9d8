//! XML annotation directory to COCO conversion.
//!
//! A run lists the annotation directory, converts each file in name order
//! and only then writes the output, so a run that fails part way leaves no
//! output file behind.
//!
//! Skips never fail the run:
//! - an annotation file whose image is absent is dropped whole, and no id
//!   is consumed for it;
//! - an object whose label is outside the vocabulary is dropped alone.
//!
//! What happens on an unreadable image or a box with `max < min` is decided
//! by [`ImageErrorPolicy`] and [`BBoxPolicy`].

pub mod report;

pub use report::{
    ConversionCounts, ConversionIssue, ConversionIssueCode, ConversionReport, ConversionSeverity,
};

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use serde::Serialize;

use crate::categories::CategoryTable;
use crate::error::Xml2CocoError;
use crate::image_probe::ImageProbe;
use crate::ir::io_coco_json::write_coco_json;
use crate::ir::io_xml::{list_annotation_files, read_annotation_file, Corners};
use crate::ir::{Annotation, AnnotationId, BBox, Dataset, DatasetInfo, Image, ImageId, License};

/// Default output path of the `convert` subcommand.
pub const DEFAULT_OUTPUT: &str = "coco_annotations.json";

/// What to do with a box whose max corner lies before its min corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BBoxPolicy {
    /// Skip the object and warn. No annotation id is consumed.
    #[default]
    Reject,
    /// Raise negative width/height to zero and warn.
    Clamp,
    /// Write the negative dimensions and area unchanged, with a warning.
    PassThrough,
}

/// What to do when an existing image cannot be read or decoded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageErrorPolicy {
    /// Fail the whole run.
    #[default]
    Abort,
    /// Skip the annotation file like a missing image, with a warning.
    Skip,
}

/// Inputs and policies for one conversion run.
#[derive(Clone, Debug)]
pub struct ConvertOptions {
    pub image_dir: PathBuf,
    pub annotation_dir: PathBuf,
    pub categories: CategoryTable,
    pub info: DatasetInfo,
    pub bbox_policy: BBoxPolicy,
    pub image_error_policy: ImageErrorPolicy,
    pub probe: ImageProbe,
    /// Draw a progress bar on stderr.
    pub show_progress: bool,
}

impl ConvertOptions {
    /// Options with the default policies and the Semantic Drone metadata.
    pub fn new(
        image_dir: impl Into<PathBuf>,
        annotation_dir: impl Into<PathBuf>,
        categories: CategoryTable,
    ) -> Self {
        Self {
            image_dir: image_dir.into(),
            annotation_dir: annotation_dir.into(),
            categories,
            info: DatasetInfo::semantic_drone(),
            bbox_policy: BBoxPolicy::default(),
            image_error_policy: ImageErrorPolicy::default(),
            probe: ImageProbe::default(),
            show_progress: false,
        }
    }
}

/// Converts an annotation directory into an in-memory COCO dataset.
///
/// # Errors
/// Fails on an unreadable annotation directory, a malformed annotation file,
/// or (under [`ImageErrorPolicy::Abort`]) an unreadable image.
pub fn convert(opts: &ConvertOptions) -> Result<(Dataset, ConversionReport), Xml2CocoError> {
    let mut report = ConversionReport::new();
    let listing = list_annotation_files(&opts.annotation_dir)?;

    if let Some(sample) = listing.nested.first() {
        warn!(
            "annotation directory is scanned flat; ignoring {} nested .xml file(s), e.g. {}",
            listing.nested.len(),
            sample.display()
        );
        report.add(ConversionIssue::warning(
            ConversionIssueCode::NestedXmlIgnored,
            format!(
                "{} nested .xml file(s) ignored, e.g. {}",
                listing.nested.len(),
                sample.display()
            ),
        ));
    }

    let mut images = Vec::new();
    let mut annotations = Vec::new();
    let mut next_image_id = ImageId::new(1);
    let mut next_annotation_id = AnnotationId::new(1);

    let progress = progress_bar(listing.files.len() as u64, opts.show_progress);

    for xml_path in &listing.files {
        progress.inc(1);
        let parsed = read_annotation_file(xml_path)?;
        let xml_name = display_name(xml_path);

        let image_path = opts.image_dir.join(&parsed.filename);
        if !image_path.exists() {
            debug!("{xml_name}: image {} not found, skipping", image_path.display());
            report.add(ConversionIssue::info(
                ConversionIssueCode::MissingImage,
                format!("{xml_name}: image '{}' not found", parsed.filename),
            ));
            continue;
        }

        let (width, height) = match opts.probe.dimensions(&image_path) {
            Ok(dims) => dims,
            Err(err) => match opts.image_error_policy {
                ImageErrorPolicy::Abort => return Err(err),
                ImageErrorPolicy::Skip => {
                    warn!("{xml_name}: {err}; skipping");
                    report.add(ConversionIssue::warning(
                        ConversionIssueCode::ImageUnreadable,
                        format!("{xml_name}: {err}"),
                    ));
                    continue;
                }
            },
        };

        let image_id = next_image_id;
        next_image_id = next_image_id.next();
        images.push(Image::new(image_id, parsed.filename.clone(), width, height));

        report.counts.objects += parsed.objects.len();
        for object in &parsed.objects {
            let Some(category_id) = opts.categories.lookup(&object.label) else {
                debug!("{xml_name}: label '{}' not in vocabulary, skipping", object.label);
                report.add(ConversionIssue::info(
                    ConversionIssueCode::UnknownLabel,
                    format!("{xml_name}: label '{}'", object.label),
                ));
                continue;
            };

            // A box is only required once the label is known to convert.
            let corners = object
                .corners
                .as_ref()
                .map_err(|message| Xml2CocoError::XmlParse {
                    path: xml_path.to_path_buf(),
                    message: format!("object '{}': {message}", object.label),
                })?;

            let Some(bbox) = apply_bbox_policy(
                &object.label,
                corners,
                opts.bbox_policy,
                &xml_name,
                &mut report,
            ) else {
                continue;
            };

            annotations.push(Annotation::new(
                next_annotation_id,
                image_id,
                category_id,
                bbox,
            ));
            next_annotation_id = next_annotation_id.next();
        }
    }

    progress.finish_and_clear();

    report.counts.annotation_files = listing.files.len();
    report.counts.images = images.len();
    report.counts.annotations = annotations.len();
    report.counts.categories = opts.categories.len();

    let dataset = Dataset {
        info: opts.info.clone(),
        licenses: vec![License::public_domain()],
        images,
        annotations,
        categories: opts.categories.categories().to_vec(),
    };

    Ok((dataset, report))
}

/// Runs [`convert`] and writes the result to `output`, replacing any file
/// already there.
pub fn convert_to_file(
    opts: &ConvertOptions,
    output: &Path,
) -> Result<ConversionReport, Xml2CocoError> {
    let (dataset, report) = convert(opts)?;
    write_coco_json(output, &dataset)?;
    info!(
        "wrote {} images and {} annotations to {}",
        dataset.images.len(),
        dataset.annotations.len(),
        output.display()
    );
    Ok(report)
}

/// Truncates the object's corners to a box and applies `policy`.
///
/// Returns `None` when the object must be skipped.
fn apply_bbox_policy(
    label: &str,
    corners: &Corners,
    policy: BBoxPolicy,
    xml_name: &str,
    report: &mut ConversionReport,
) -> Option<BBox> {
    let Corners {
        xmin,
        ymin,
        xmax,
        ymax,
    } = *corners;
    let bbox = BBox::from_float_corners(xmin, ymin, xmax, ymax);
    if !bbox.is_degenerate() {
        return Some(bbox);
    }

    let described = format!(
        "{xml_name}: '{label}' box ({xmin}, {ymin}, {xmax}, {ymax}) has max < min"
    );
    warn!("{described}");

    match policy {
        BBoxPolicy::Reject => {
            report.add(ConversionIssue::warning(
                ConversionIssueCode::DegenerateBoxRejected,
                described,
            ));
            None
        }
        BBoxPolicy::Clamp => {
            report.add(ConversionIssue::warning(
                ConversionIssueCode::DegenerateBoxClamped,
                described,
            ));
            Some(bbox.clamped())
        }
        BBoxPolicy::PassThrough => {
            report.add(ConversionIssue::warning(
                ConversionIssueCode::DegenerateBoxKept,
                described,
            ));
            Some(bbox)
        }
    }
}

fn progress_bar(len: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [Converting to COCO] [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
