//! Core dataset model: the COCO envelope the converter produces.
//!
//! Field order in these structs is the field order in the written JSON, so
//! the top-level keys come out as `info, licenses, images, annotations,
//! categories`.

use serde::{Deserialize, Serialize};

use super::bbox::BBox;
use super::ids::{AnnotationId, CategoryId, ImageId, LicenseId};

/// A complete COCO-style object detection dataset.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Dataset {
    /// Static metadata about the dataset.
    #[serde(default)]
    pub info: DatasetInfo,

    /// License definitions for the dataset.
    #[serde(default)]
    pub licenses: Vec<License>,

    /// All images, in processing order.
    pub images: Vec<Image>,

    /// All annotations, in processing order.
    pub annotations: Vec<Annotation>,

    /// All category definitions, in vocabulary order.
    pub categories: Vec<Category>,
}

/// The COCO `info` block.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributor: Option<String>,

    /// Creation date (ISO 8601 or similar).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_created: Option<String>,
}

impl DatasetInfo {
    /// The metadata block written for the Semantic Drone Dataset.
    pub fn semantic_drone() -> Self {
        Self {
            description: Some("Semantic Drone Dataset in COCO Format".to_string()),
            version: Some("1.0".to_string()),
            year: Some(2025),
            contributor: Some("Mannan".to_string()),
            date_created: Some("2025-02-14".to_string()),
        }
    }
}

/// A license entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct License {
    pub id: LicenseId,

    /// Name of the license (e.g., "CC0: Public Domain").
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl License {
    pub fn new(id: impl Into<LicenseId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: None,
        }
    }

    /// The single public-domain license written with every converted dataset.
    pub fn public_domain() -> Self {
        Self::new(1u64, "CC0: Public Domain")
    }
}

/// An image record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: ImageId,

    /// Filename as referenced by the annotation file.
    pub file_name: String,

    /// Width of the image in pixels.
    pub width: u32,

    /// Height of the image in pixels.
    pub height: u32,
}

impl Image {
    pub fn new(
        id: impl Into<ImageId>,
        file_name: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            id: id.into(),
            file_name: file_name.into(),
            width,
            height,
        }
    }
}

/// A category (class label).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,

    /// Name of the category (e.g., "person", "car", "tree").
    pub name: String,

    pub supercategory: String,
}

impl Category {
    pub fn new(
        id: impl Into<CategoryId>,
        name: impl Into<String>,
        supercategory: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            supercategory: supercategory.into(),
        }
    }
}

/// A region annotation: one labelled box tied to one image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,

    pub image_id: ImageId,

    pub category_id: CategoryId,

    /// `[x_min, y_min, width, height]` in pixels.
    pub bbox: BBox,

    /// `bbox.width * bbox.height`.
    pub area: i64,

    /// Always 0 for boxes produced by the converter.
    #[serde(default)]
    pub iscrowd: u8,
}

impl Annotation {
    /// Creates an annotation, deriving `area` from the box.
    pub fn new(
        id: impl Into<AnnotationId>,
        image_id: impl Into<ImageId>,
        category_id: impl Into<CategoryId>,
        bbox: BBox,
    ) -> Self {
        Self {
            id: id.into(),
            image_id: image_id.into(),
            category_id: category_id.into(),
            area: bbox.area(),
            bbox,
            iscrowd: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotation_derives_area() {
        let annotation = Annotation::new(1u64, 1u64, 16u64, BBox::from_corners(10, 20, 110, 220));
        assert_eq!(annotation.area, 20_000);
        assert_eq!(annotation.iscrowd, 0);
    }

    #[test]
    fn test_dataset_key_order() {
        let dataset = Dataset {
            info: DatasetInfo::semantic_drone(),
            licenses: vec![License::public_domain()],
            ..Default::default()
        };
        let json = serde_json::to_string(&dataset).expect("serialize dataset");

        let positions: Vec<usize> = ["\"info\"", "\"licenses\"", "\"images\"", "\"annotations\"", "\"categories\""]
            .iter()
            .map(|key| json.find(key).expect("key present"))
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_license_omits_missing_url() {
        let json = serde_json::to_string(&License::public_domain()).expect("serialize license");
        assert_eq!(json, r#"{"id":1,"name":"CC0: Public Domain"}"#);
    }
}
