//! Per-image XML annotation reader.
//!
//! Each annotation file describes one image: a root-level `<filename>` and
//! zero or more `<object>` elements, each with a `<name>` label and a
//! `<bndbox>` holding `xmin`, `ymin`, `xmax` and `ymax`. This is the layout
//! written by LabelMe's XML export and by Pascal VOC tools.
//!
//! Annotation files are only ever read flat from one directory; the
//! directory listing is sorted so that ids assigned downstream are stable
//! across platforms.

use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::Node;
use walkdir::WalkDir;

use crate::error::Xml2CocoError;

const XML_EXTENSION: &str = "xml";

/// The content of one annotation file.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotationFile {
    /// Image filename referenced by the root `<filename>` element.
    pub filename: String,
    pub objects: Vec<AnnotatedObject>,
}

/// One `<object>` element: its label and, if readable, its box corners.
///
/// A box that cannot be read is kept as an error message; whether that
/// fails the run depends on whether the object is converted.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotatedObject {
    /// Text of `<name>` exactly as written. Empty if the element is missing
    /// or has no text.
    pub label: String,
    /// Corners read from `<bndbox>`, or a description of what was wrong.
    pub corners: Result<Corners, String>,
}

/// Box corners as written in `<bndbox>`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Corners {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

/// The `.xml` files of an annotation directory.
#[derive(Clone, Debug, Default)]
pub struct AnnotationListing {
    /// Top-level annotation files, sorted by file name.
    pub files: Vec<PathBuf>,
    /// `.xml` files found in subdirectories. These are not converted.
    pub nested: Vec<PathBuf>,
}

/// Lists the annotation files directly inside `dir`.
///
/// Only regular files whose extension is `xml` (any case) are returned.
/// Subdirectories are not descended into, but any `.xml` files they hold
/// are reported in [`AnnotationListing::nested`] so callers can warn.
pub fn list_annotation_files(dir: &Path) -> Result<AnnotationListing, Xml2CocoError> {
    if !dir.is_dir() {
        return Err(Xml2CocoError::AnnotationDirInvalid {
            path: dir.to_path_buf(),
            message: "not a directory".to_string(),
        });
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(Xml2CocoError::Io)? {
        let entry = entry.map_err(Xml2CocoError::Io)?;
        let path = entry.path();
        if path.is_file() && has_xml_extension(&path) {
            files.push(path);
        }
    }
    files.sort_by_cached_key(|path| rel_string(dir, path));

    let mut nested = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true).min_depth(2) {
        let entry = entry.map_err(|source| Xml2CocoError::AnnotationDirInvalid {
            path: dir.to_path_buf(),
            message: format!("failed while traversing annotations directory: {source}"),
        })?;

        if entry.file_type().is_file() && has_xml_extension(entry.path()) {
            nested.push(entry.path().to_path_buf());
        }
    }
    nested.sort_by_cached_key(|path| rel_string(dir, path));

    Ok(AnnotationListing { files, nested })
}

/// Reads and parses one annotation file.
pub fn read_annotation_file(path: &Path) -> Result<AnnotationFile, Xml2CocoError> {
    let xml = fs::read_to_string(path).map_err(|source| Xml2CocoError::XmlParse {
        path: path.to_path_buf(),
        message: source.to_string(),
    })?;
    parse_annotation_str(&xml, path)
}

/// Parses annotation XML from a UTF-8 string.
///
/// `path` is only used for error messages.
pub fn parse_annotation_str(xml: &str, path: &Path) -> Result<AnnotationFile, Xml2CocoError> {
    let document = roxmltree::Document::parse(xml).map_err(|source| Xml2CocoError::XmlParse {
        path: path.to_path_buf(),
        message: source.to_string(),
    })?;

    let root = document.root_element();
    let context = format!("<{}>", root.tag_name().name());
    let filename = required_child_text(root, "filename", path, &context)?;

    let mut objects = Vec::new();
    for object in root
        .children()
        .filter(|node| node.is_element() && node.tag_name().name() == "object")
    {
        let label = child_element(object, "name")
            .and_then(|name| name.text())
            .unwrap_or_default()
            .to_string();

        objects.push(AnnotatedObject {
            label,
            corners: read_corners(object),
        });
    }

    Ok(AnnotationFile { filename, objects })
}

/// Parses annotation XML from bytes. The input must be valid UTF-8.
///
/// Fuzz-only entrypoint.
#[cfg(feature = "fuzzing")]
pub fn parse_annotation_slice(bytes: &[u8]) -> Result<AnnotationFile, Xml2CocoError> {
    let memory = Path::new("<memory>");
    let xml = std::str::from_utf8(bytes).map_err(|source| Xml2CocoError::XmlParse {
        path: memory.to_path_buf(),
        message: format!("input is not valid UTF-8: {source}"),
    })?;
    parse_annotation_str(xml, memory)
}

fn required_child_text(
    node: Node<'_, '_>,
    tag: &str,
    path: &Path,
    context: &str,
) -> Result<String, Xml2CocoError> {
    child_element(node, tag)
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(ToOwned::to_owned)
        .ok_or_else(|| Xml2CocoError::XmlParse {
            path: path.to_path_buf(),
            message: format!("missing <{tag}> in {context}"),
        })
}

/// Reads `<bndbox>` of an object.
fn read_corners(object: Node<'_, '_>) -> Result<Corners, String> {
    let bndbox =
        child_element(object, "bndbox").ok_or_else(|| "missing <bndbox> in <object>".to_string())?;

    Ok(Corners {
        xmin: read_coord(bndbox, "xmin")?,
        ymin: read_coord(bndbox, "ymin")?,
        xmax: read_coord(bndbox, "xmax")?,
        ymax: read_coord(bndbox, "ymax")?,
    })
}

fn read_coord(bndbox: Node<'_, '_>, tag: &str) -> Result<f64, String> {
    let raw = child_element(bndbox, tag)
        .and_then(|node| node.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| format!("missing <{tag}> in <bndbox>"))?;

    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| format!("invalid <{tag}> value '{raw}' in <bndbox>; expected a finite number"))
}

fn child_element<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && child.tag_name().name() == tag)
}

fn has_xml_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(XML_EXTENSION))
        .unwrap_or(false)
}

fn rel_string(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.to_string_lossy().replace('\\', "/")
}
