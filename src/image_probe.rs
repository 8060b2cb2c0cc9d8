//! Image dimension probing.
//!
//! The default probe fully decodes the raster, so a truncated or corrupt
//! image is caught at conversion time. The header probe only reads enough
//! bytes to learn the dimensions and is much faster on large datasets.

use std::path::Path;

use clap::ValueEnum;
use serde::Serialize;

use crate::error::Xml2CocoError;

/// How the pixel width and height of an image are obtained.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageProbe {
    /// Decode the whole image.
    #[default]
    Decode,
    /// Read the dimensions from the file header only.
    Header,
}

impl ImageProbe {
    /// Returns `(width, height)` of the image at `path`.
    ///
    /// # Errors
    /// [`Xml2CocoError::ImageUnreadable`] if the file cannot be opened, its
    /// format is unknown, or (for [`ImageProbe::Decode`]) its pixel data is
    /// corrupt.
    pub fn dimensions(self, path: &Path) -> Result<(u32, u32), Xml2CocoError> {
        match self {
            ImageProbe::Decode => decode_dimensions(path),
            ImageProbe::Header => header_dimensions(path),
        }
    }
}

fn decode_dimensions(path: &Path) -> Result<(u32, u32), Xml2CocoError> {
    let unreadable = |message: String| Xml2CocoError::ImageUnreadable {
        path: path.to_path_buf(),
        message,
    };

    let image = image::ImageReader::open(path)
        .map_err(|source| unreadable(source.to_string()))?
        .with_guessed_format()
        .map_err(|source| unreadable(source.to_string()))?
        .decode()
        .map_err(|source| unreadable(source.to_string()))?;

    Ok((image.width(), image.height()))
}

fn header_dimensions(path: &Path) -> Result<(u32, u32), Xml2CocoError> {
    let size = imagesize::size(path).map_err(|source| Xml2CocoError::ImageUnreadable {
        path: path.to_path_buf(),
        message: source.to_string(),
    })?;

    let width: u32 = size
        .width
        .try_into()
        .map_err(|_| Xml2CocoError::ImageUnreadable {
            path: path.to_path_buf(),
            message: format!("image width {} does not fit in u32", size.width),
        })?;

    let height: u32 = size
        .height
        .try_into()
        .map_err(|_| Xml2CocoError::ImageUnreadable {
            path: path.to_path_buf(),
            message: format!("image height {} does not fit in u32", size.height),
        })?;

    Ok((width, height))
}
