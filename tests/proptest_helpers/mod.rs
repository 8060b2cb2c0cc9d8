#![allow(dead_code)]

use std::collections::BTreeSet;
use std::path::Path;

use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};
use xml2coco::categories::SEMANTIC_DRONE_CLASSES;
use xml2coco::ir::{CategoryId, Dataset, ImageId};

use crate::common::{write_annotation, write_bmp, XmlObject};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(32);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// One generated annotation file and the image it points at.
#[derive(Clone, Debug)]
pub struct FileSpec {
    /// Whether the image is written to the image directory.
    pub image_present: bool,
    pub width: u32,
    pub height: u32,
    pub objects: Vec<XmlObject>,
}

impl FileSpec {
    pub fn image_name(idx: usize) -> String {
        format!("frame_{idx:03}.bmp")
    }

    pub fn xml_name(idx: usize) -> String {
        format!("{idx:03}.xml")
    }
}

/// Labels that are never part of the drone vocabulary.
const UNKNOWN_LABELS: &[&str] = &["unknown-thing", "Person", "boat", "traffic-light"];

fn label_strategy() -> BoxedStrategy<String> {
    prop_oneof![
        4 => prop::sample::select(SEMANTIC_DRONE_CLASSES).prop_map(str::to_string),
        1 => prop::sample::select(UNKNOWN_LABELS).prop_map(str::to_string),
    ]
    .boxed()
}

/// Coordinates on a quarter-pixel grid inside `[0, limit]`.
fn coord_strategy(limit: u32) -> BoxedStrategy<f64> {
    (0u32..=limit * 4).prop_map(|q| q as f64 / 4.0).boxed()
}

fn object_strategy(width: u32, height: u32) -> BoxedStrategy<XmlObject> {
    (
        label_strategy(),
        coord_strategy(width),
        coord_strategy(height),
        coord_strategy(width),
        coord_strategy(height),
    )
        .prop_map(|(label, x1, y1, x2, y2)| XmlObject {
            label,
            corners: (x1, y1, x2, y2),
        })
        .boxed()
}

pub fn arb_file_spec(max_objects: usize) -> BoxedStrategy<FileSpec> {
    (prop::bool::weighted(0.8), 2u32..=64, 2u32..=64)
        .prop_flat_map(move |(image_present, width, height)| {
            proptest::collection::vec(object_strategy(width, height), 0..=max_objects).prop_map(
                move |objects| FileSpec {
                    image_present,
                    width,
                    height,
                    objects,
                },
            )
        })
        .boxed()
}

pub fn arb_file_specs(max_files: usize, max_objects: usize) -> BoxedStrategy<Vec<FileSpec>> {
    proptest::collection::vec(arb_file_spec(max_objects), 1..=max_files).boxed()
}

/// Writes `specs` as `<root>/images` and `<root>/gt`.
pub fn materialize(root: &Path, specs: &[FileSpec]) {
    let images = root.join("images");
    let annotations = root.join("gt");
    std::fs::create_dir_all(&images).expect("create images dir");
    for (idx, spec) in specs.iter().enumerate() {
        let image_name = FileSpec::image_name(idx);
        if spec.image_present {
            write_bmp(&images.join(&image_name), spec.width, spec.height);
        }
        write_annotation(
            &annotations,
            &FileSpec::xml_name(idx),
            &image_name,
            &spec.objects,
        );
    }
}

/// Whether an object survives the default reject policy.
pub fn keeps_object(object: &XmlObject) -> bool {
    let (xmin, ymin, xmax, ymax) = object.corners;
    SEMANTIC_DRONE_CLASSES.contains(&object.label.as_str())
        && xmax.trunc() >= xmin.trunc()
        && ymax.trunc() >= ymin.trunc()
}

pub fn expected_image_count(specs: &[FileSpec]) -> usize {
    specs.iter().filter(|spec| spec.image_present).count()
}

pub fn expected_annotation_count(specs: &[FileSpec]) -> usize {
    specs
        .iter()
        .filter(|spec| spec.image_present)
        .flat_map(|spec| spec.objects.iter())
        .filter(|object| keeps_object(object))
        .count()
}

/// Ids must be exactly `1..=n` in record order.
pub fn assert_sequential_ids(dataset: &Dataset) -> Result<(), String> {
    for (idx, image) in dataset.images.iter().enumerate() {
        if image.id.as_u64() != idx as u64 + 1 {
            return Err(format!(
                "image at position {idx} has id {}, expected {}",
                image.id.as_u64(),
                idx + 1
            ));
        }
    }
    for (idx, ann) in dataset.annotations.iter().enumerate() {
        if ann.id.as_u64() != idx as u64 + 1 {
            return Err(format!(
                "annotation at position {idx} has id {}, expected {}",
                ann.id.as_u64(),
                idx + 1
            ));
        }
    }
    Ok(())
}

pub fn assert_valid_references(dataset: &Dataset) -> Result<(), String> {
    let image_ids: BTreeSet<ImageId> = dataset.images.iter().map(|img| img.id).collect();
    let category_ids: BTreeSet<CategoryId> = dataset.categories.iter().map(|cat| cat.id).collect();

    for ann in &dataset.annotations {
        if !image_ids.contains(&ann.image_id) {
            return Err(format!(
                "annotation {} references missing image_id {}",
                ann.id.as_u64(),
                ann.image_id.as_u64()
            ));
        }
        if !category_ids.contains(&ann.category_id) {
            return Err(format!(
                "annotation {} references missing category_id {}",
                ann.id.as_u64(),
                ann.category_id.as_u64()
            ));
        }
    }

    Ok(())
}

pub fn assert_areas_match(dataset: &Dataset) -> Result<(), String> {
    for ann in &dataset.annotations {
        if ann.area != ann.bbox.width * ann.bbox.height {
            return Err(format!(
                "annotation {} has area {} for bbox {:?}",
                ann.id.as_u64(),
                ann.area,
                ann.bbox
            ));
        }
        if ann.bbox.width < 0 || ann.bbox.height < 0 {
            return Err(format!(
                "annotation {} kept a negative box {:?}",
                ann.id.as_u64(),
                ann.bbox
            ));
        }
    }
    Ok(())
}
