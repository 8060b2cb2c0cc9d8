#![allow(dead_code)]

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use xml2coco::categories::{CategoryTable, DEFAULT_SUPERCATEGORY};

/// A minimal uncompressed 24-bit BMP of the given size.
pub fn bmp_bytes(width: u32, height: u32) -> Vec<u8> {
    let row_stride = (width * 3).div_ceil(4) * 4;
    let pixel_array_size = row_stride * height;
    let file_size = 54 + pixel_array_size;

    let mut bytes = Vec::with_capacity(file_size as usize);
    bytes.extend_from_slice(b"BM");
    bytes.extend_from_slice(&file_size.to_le_bytes());
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes.extend_from_slice(&54u32.to_le_bytes());

    bytes.extend_from_slice(&40u32.to_le_bytes());
    bytes.extend_from_slice(&(width as i32).to_le_bytes());
    bytes.extend_from_slice(&(height as i32).to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&24u16.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&pixel_array_size.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());

    bytes.resize(file_size as usize, 0);
    bytes
}

pub fn write_bmp(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, bmp_bytes(width, height)).expect("write bmp file");
}

/// One `<object>` of a generated annotation file.
#[derive(Clone, Debug)]
pub struct XmlObject {
    pub label: String,
    pub corners: (f64, f64, f64, f64),
}

impl XmlObject {
    pub fn new(label: &str, xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            label: label.to_string(),
            corners: (xmin, ymin, xmax, ymax),
        }
    }
}

/// Renders an annotation file in the LabelMe XML export layout.
pub fn annotation_xml(filename: &str, objects: &[XmlObject]) -> String {
    let mut xml = String::new();
    writeln!(xml, "<?xml version=\"1.0\" encoding=\"utf-8\"?>").unwrap();
    writeln!(xml, "<annotation>").unwrap();
    writeln!(xml, "  <folder>images</folder>").unwrap();
    writeln!(xml, "  <filename>{}</filename>", filename).unwrap();
    for object in objects {
        let (xmin, ymin, xmax, ymax) = object.corners;
        writeln!(xml, "  <object>").unwrap();
        writeln!(xml, "    <name>{}</name>", object.label).unwrap();
        writeln!(xml, "    <deleted>0</deleted>").unwrap();
        writeln!(xml, "    <bndbox>").unwrap();
        writeln!(xml, "      <xmin>{}</xmin>", xmin).unwrap();
        writeln!(xml, "      <ymin>{}</ymin>", ymin).unwrap();
        writeln!(xml, "      <xmax>{}</xmax>", xmax).unwrap();
        writeln!(xml, "      <ymax>{}</ymax>", ymax).unwrap();
        writeln!(xml, "    </bndbox>").unwrap();
        writeln!(xml, "  </object>").unwrap();
    }
    writeln!(xml, "</annotation>").unwrap();
    xml
}

pub fn write_annotation(dir: &Path, xml_name: &str, filename: &str, objects: &[XmlObject]) {
    fs::create_dir_all(dir).expect("create annotation dir");
    fs::write(dir.join(xml_name), annotation_xml(filename, objects)).expect("write annotation");
}

/// The built-in drone vocabulary.
pub fn drone_categories() -> CategoryTable {
    CategoryTable::semantic_drone(DEFAULT_SUPERCATEGORY).expect("built-in vocabulary")
}

/// Renders an annotation file whose `<object>` elements are given verbatim.
pub fn raw_annotation_xml(filename: &str, objects: &[&str]) -> String {
    let mut xml = String::new();
    writeln!(xml, "<annotation>").unwrap();
    writeln!(xml, "  <filename>{}</filename>", filename).unwrap();
    for object in objects {
        writeln!(xml, "  {}", object).unwrap();
    }
    writeln!(xml, "</annotation>").unwrap();
    xml
}

pub fn write_raw_annotation(dir: &Path, xml_name: &str, filename: &str, objects: &[&str]) {
    fs::create_dir_all(dir).expect("create annotation dir");
    fs::write(dir.join(xml_name), raw_annotation_xml(filename, objects))
        .expect("write annotation");
}
