//! Integrity checks for COCO datasets.
//!
//! Checks performed:
//! - Structural integrity (unique ids, ids increasing, valid references)
//! - Data quality (non-empty and unique names, positive image dimensions)
//! - Geometry (non-negative box dimensions, `area == w * h`, within bounds)
//!
//! A dataset produced by the converter with the default policies passes
//! with no errors.

mod report;

pub use report::{IssueCode, IssueContext, Severity, ValidationIssue, ValidationReport};

use std::collections::{HashMap, HashSet};

use crate::ir::{AnnotationId, CategoryId, Dataset, ImageId};

/// Options for validation behavior.
#[derive(Clone, Debug, Default)]
pub struct ValidateOptions {
    /// If true, treat warnings as errors.
    pub strict: bool,
}

/// Validates a dataset and returns a report of all issues found.
///
/// With [`ValidateOptions::strict`] the report also fails on warnings.
pub fn validate_dataset(dataset: &Dataset, opts: &ValidateOptions) -> ValidationReport {
    let mut report = if opts.strict {
        ValidationReport::strict()
    } else {
        ValidationReport::new()
    };

    let image_dims: HashMap<ImageId, (u32, u32)> = dataset
        .images
        .iter()
        .map(|image| (image.id, (image.width, image.height)))
        .collect();
    let category_ids: HashSet<CategoryId> = dataset.categories.iter().map(|c| c.id).collect();

    validate_images(dataset, &mut report);
    validate_categories(dataset, &mut report);
    validate_annotations(dataset, &image_dims, &category_ids, &mut report);

    report
}

fn validate_images(dataset: &Dataset, report: &mut ValidationReport) {
    let mut seen_ids: HashMap<ImageId, usize> = HashMap::new();
    let mut previous: Option<ImageId> = None;

    for (idx, image) in dataset.images.iter().enumerate() {
        let id = image.id.as_u64();

        if let Some(first_idx) = seen_ids.get(&image.id) {
            report.add(ValidationIssue::error(
                IssueCode::DuplicateImageId,
                format!(
                    "Duplicate image ID {} (first seen at index {})",
                    id, first_idx
                ),
                IssueContext::Image { id },
            ));
        } else {
            seen_ids.insert(image.id, idx);
        }

        if previous.is_some_and(|prev| image.id <= prev) {
            report.add(ValidationIssue::warning(
                IssueCode::IdsOutOfOrder,
                format!("Image ID {} does not increase on the previous image", id),
                IssueContext::Image { id },
            ));
        }
        previous = Some(image.id);

        if image.width == 0 || image.height == 0 {
            report.add(ValidationIssue::error(
                IssueCode::InvalidImageDimensions,
                format!(
                    "Invalid dimensions {}x{} (must be positive)",
                    image.width, image.height
                ),
                IssueContext::Image { id },
            ));
        }

        if image.file_name.is_empty() {
            report.add(ValidationIssue::warning(
                IssueCode::EmptyFileName,
                "Empty filename",
                IssueContext::Image { id },
            ));
        }
    }
}

fn validate_categories(dataset: &Dataset, report: &mut ValidationReport) {
    let mut seen_ids: HashSet<CategoryId> = HashSet::new();
    let mut seen_names: HashMap<&str, CategoryId> = HashMap::new();

    for category in &dataset.categories {
        let id = category.id.as_u64();

        if !seen_ids.insert(category.id) {
            report.add(ValidationIssue::error(
                IssueCode::DuplicateCategoryId,
                format!("Duplicate category ID {}", id),
                IssueContext::Category { id },
            ));
        }

        if category.name.is_empty() {
            report.add(ValidationIssue::warning(
                IssueCode::EmptyCategoryName,
                "Empty category name",
                IssueContext::Category { id },
            ));
        } else if let Some(first_id) = seen_names.get(category.name.as_str()) {
            report.add(ValidationIssue::error(
                IssueCode::DuplicateCategoryName,
                format!(
                    "Duplicate category name '{}' (also used by category {})",
                    category.name, first_id
                ),
                IssueContext::Category { id },
            ));
        } else {
            seen_names.insert(&category.name, category.id);
        }
    }
}

fn validate_annotations(
    dataset: &Dataset,
    image_dims: &HashMap<ImageId, (u32, u32)>,
    category_ids: &HashSet<CategoryId>,
    report: &mut ValidationReport,
) {
    let mut seen_ids: HashMap<AnnotationId, usize> = HashMap::new();
    let mut previous: Option<AnnotationId> = None;

    for (idx, annotation) in dataset.annotations.iter().enumerate() {
        let id = annotation.id.as_u64();
        let context = || IssueContext::Annotation { id };

        if let Some(first_idx) = seen_ids.get(&annotation.id) {
            report.add(ValidationIssue::error(
                IssueCode::DuplicateAnnotationId,
                format!(
                    "Duplicate annotation ID {} (first seen at index {})",
                    id, first_idx
                ),
                context(),
            ));
        } else {
            seen_ids.insert(annotation.id, idx);
        }

        if previous.is_some_and(|prev| annotation.id <= prev) {
            report.add(ValidationIssue::warning(
                IssueCode::IdsOutOfOrder,
                format!("Annotation ID {} does not increase on the previous annotation", id),
                context(),
            ));
        }
        previous = Some(annotation.id);

        if !category_ids.contains(&annotation.category_id) {
            report.add(ValidationIssue::error(
                IssueCode::MissingCategoryRef,
                format!(
                    "References non-existent category {}",
                    annotation.category_id
                ),
                context(),
            ));
        }

        let bbox = &annotation.bbox;

        if bbox.area() != annotation.area {
            report.add(ValidationIssue::error(
                IssueCode::AreaMismatch,
                format!(
                    "Area {} does not match bbox {}x{}",
                    annotation.area, bbox.width, bbox.height
                ),
                context(),
            ));
        }

        if bbox.is_degenerate() {
            report.add(ValidationIssue::warning(
                IssueCode::NegativeBBoxDimensions,
                format!("Negative dimensions {}x{}", bbox.width, bbox.height),
                context(),
            ));
        }

        if annotation.iscrowd != 0 {
            report.add(ValidationIssue::warning(
                IssueCode::CrowdAnnotation,
                format!("iscrowd is {}", annotation.iscrowd),
                context(),
            ));
        }

        let Some(&(width, height)) = image_dims.get(&annotation.image_id) else {
            report.add(ValidationIssue::error(
                IssueCode::MissingImageRef,
                format!("References non-existent image {}", annotation.image_id),
                context(),
            ));
            continue;
        };

        let (xmax, ymax) = (
            bbox.x.saturating_add(bbox.width),
            bbox.y.saturating_add(bbox.height),
        );
        if bbox.x < 0 || bbox.y < 0 || xmax > i64::from(width) || ymax > i64::from(height) {
            report.add(ValidationIssue::warning(
                IssueCode::BBoxOutOfBounds,
                format!(
                    "Bounding box ({}, {}, {}, {}) extends outside image bounds (0, 0, {}, {})",
                    bbox.x, bbox.y, xmax, ymax, width, height
                ),
                context(),
            ));
        }
    }
}
