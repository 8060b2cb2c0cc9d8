//! COCO JSON reader and writer.
//!
//! The writer emits UTF-8 JSON indented with four spaces. Lists are written
//! in the order they appear in the [`Dataset`], which for converted datasets
//! is processing order (ids ascending).
//!
//! COCO bounding boxes use `[x, y, width, height]` where `(x, y)` is the
//! top-left corner in absolute pixel coordinates.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use super::model::Dataset;
use crate::error::Xml2CocoError;

const INDENT: &[u8] = b"    ";

/// Reads a dataset from a COCO JSON file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use xml2coco::ir::io_coco_json::read_coco_json;
///
/// let dataset = read_coco_json(Path::new("coco_annotations.json"))?;
/// # Ok::<(), xml2coco::Xml2CocoError>(())
/// ```
pub fn read_coco_json(path: &Path) -> Result<Dataset, Xml2CocoError> {
    let file = File::open(path).map_err(Xml2CocoError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| Xml2CocoError::CocoJsonParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a dataset to a COCO JSON file, replacing any existing file.
///
/// # Errors
/// Returns an error if the file cannot be created or written.
pub fn write_coco_json(path: &Path, dataset: &Dataset) -> Result<(), Xml2CocoError> {
    let file = File::create(path).map_err(Xml2CocoError::Io)?;
    let mut writer = BufWriter::new(file);

    write_indented(&mut writer, dataset).map_err(|source| Xml2CocoError::CocoJsonWrite {
        path: path.to_path_buf(),
        source,
    })?;

    writer.flush().map_err(Xml2CocoError::Io)
}

/// Reads a dataset from a COCO JSON string.
///
/// Useful for testing without file I/O.
pub fn from_coco_str(json: &str) -> Result<Dataset, serde_json::Error> {
    serde_json::from_str(json)
}

/// Reads a dataset from a COCO JSON byte slice.
pub fn from_coco_slice(bytes: &[u8]) -> Result<Dataset, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Writes a dataset to a COCO JSON string with the same layout as
/// [`write_coco_json`].
pub fn to_coco_string(dataset: &Dataset) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    write_indented(&mut buf, dataset)?;
    // serde_json only ever emits valid UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn write_indented<W: Write>(writer: W, dataset: &Dataset) -> Result<(), serde_json::Error> {
    let formatter = PrettyFormatter::with_indent(INDENT);
    let mut serializer = Serializer::with_formatter(writer, formatter);
    dataset.serialize(&mut serializer)
}
