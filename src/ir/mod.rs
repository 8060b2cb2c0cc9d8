//! In-memory COCO record types for xml2coco.
//!
//! The converter builds a [`Dataset`] envelope in memory and serializes it
//! once at the end of a run. The types mirror the COCO detection layout
//! directly: images, categories and per-region annotations cross-referenced
//! by integer ids.
//!
//! # Design Principles
//!
//! 1. **Type Safety**: newtype ids keep image, annotation and category ids
//!    from being mixed up.
//!
//! 2. **Integer Pixels**: source coordinates are truncated to whole pixels
//!    when read, so boxes and areas are integers end to end.
//!
//! 3. **Permissive Construction**: [`BBox`] can hold negative dimensions, so
//!    the conversion policy and the validator decide what to do with them
//!    rather than the constructor.
//!
//! # Example
//!
//! ```
//! use xml2coco::ir::{Annotation, BBox, Category, Dataset, Image};
//!
//! let dataset = Dataset {
//!     images: vec![Image::new(1u64, "image.jpg", 640, 480)],
//!     categories: vec![Category::new(1u64, "person", "object")],
//!     annotations: vec![Annotation::new(1u64, 1u64, 1u64, BBox::from_corners(10, 20, 110, 220))],
//!     ..Default::default()
//! };
//! assert_eq!(dataset.annotations[0].area, 20_000);
//! ```

mod bbox;
mod ids;
pub mod io_coco_json;
pub mod io_xml;
mod model;

// Re-export core types for convenient access
pub use bbox::BBox;
pub use ids::{AnnotationId, CategoryId, ImageId, LicenseId};
pub use model::{Annotation, Category, Dataset, DatasetInfo, Image, License};
