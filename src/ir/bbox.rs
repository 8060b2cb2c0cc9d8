//! Integer pixel bounding boxes in COCO `[x, y, width, height]` layout.

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box in whole pixels.
///
/// Serialized as the COCO array `[x_min, y_min, width, height]`.
///
/// Width and height are stored signed: a source box whose max corner lies
/// before its min corner produces a negative dimension, and it is up to the
/// caller to reject, clamp or keep it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i64; 4]", into = "[i64; 4]")]
pub struct BBox {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl BBox {
    /// Creates a box from explicit `x, y, width, height` values.
    #[inline]
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a box from min/max corners. Dimensions are `max - min`.
    #[inline]
    pub fn from_corners(xmin: i64, ymin: i64, xmax: i64, ymax: i64) -> Self {
        Self::new(
            xmin,
            ymin,
            xmax.saturating_sub(xmin),
            ymax.saturating_sub(ymin),
        )
    }

    /// Creates a box from fractional corners, truncating each toward zero.
    ///
    /// `12.9` becomes `12` and `-0.5` becomes `0`; this is truncation, not
    /// rounding. Non-finite inputs saturate the way `as` casts do.
    #[inline]
    pub fn from_float_corners(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self::from_corners(
            xmin.trunc() as i64,
            ymin.trunc() as i64,
            xmax.trunc() as i64,
            ymax.trunc() as i64,
        )
    }

    /// Returns `width * height`, saturating. Negative for a box with exactly
    /// one negative dimension.
    #[inline]
    pub fn area(&self) -> i64 {
        self.width.saturating_mul(self.height)
    }

    /// Returns true if either dimension is negative.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.width < 0 || self.height < 0
    }

    /// Returns a copy with negative dimensions raised to zero.
    #[inline]
    pub fn clamped(&self) -> Self {
        Self::new(self.x, self.y, self.width.max(0), self.height.max(0))
    }
}

impl From<[i64; 4]> for BBox {
    fn from([x, y, width, height]: [i64; 4]) -> Self {
        Self::new(x, y, width, height)
    }
}

impl From<BBox> for [i64; 4] {
    fn from(bbox: BBox) -> Self {
        [bbox.x, bbox.y, bbox.width, bbox.height]
    }
}
