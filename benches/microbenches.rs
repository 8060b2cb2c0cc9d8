//! Criterion microbenches for xml2coco parsing and writing.
//!
//! Run with: `cargo bench`
//!
//! These benchmarks measure the performance of:
//! - annotation XML parsing (parse_annotation_str)
//! - COCO JSON writing and parsing (to_coco_string, from_coco_str)

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::fmt::Write as _;
use std::hint::black_box;
use std::path::Path;

use xml2coco::categories::{CategoryTable, DEFAULT_SUPERCATEGORY};
use xml2coco::ir::io_coco_json::{from_coco_str, to_coco_string};
use xml2coco::ir::io_xml::parse_annotation_str;
use xml2coco::ir::{Annotation, BBox, Dataset, DatasetInfo, Image, License};

/// One annotation file with `objects` boxes, in the LabelMe export layout.
fn annotation_fixture(objects: usize) -> String {
    let mut xml = String::from("<annotation><filename>000.jpg</filename>");
    for i in 0..objects {
        let x = (i * 13 % 4000) as f64 + 0.5;
        let y = (i * 7 % 3000) as f64;
        write!(
            xml,
            "<object><name>person</name><deleted>0</deleted><bndbox>\
             <xmin>{x}</xmin><ymin>{y}</ymin><xmax>{}</xmax><ymax>{}</ymax>\
             </bndbox></object>",
            x + 40.0,
            y + 90.0
        )
        .expect("write to string");
    }
    xml.push_str("</annotation>");
    xml
}

/// A converted dataset of the given shape, built without touching disk.
fn dataset_fixture(images: u64, per_image: u64) -> Dataset {
    let categories =
        CategoryTable::semantic_drone(DEFAULT_SUPERCATEGORY).expect("built-in vocabulary");
    let mut dataset = Dataset {
        info: DatasetInfo::semantic_drone(),
        licenses: vec![License::public_domain()],
        categories: categories.categories().to_vec(),
        ..Default::default()
    };

    let mut next_annotation = 1u64;
    for image_id in 1..=images {
        dataset
            .images
            .push(Image::new(image_id, format!("{image_id:03}.jpg"), 6000, 4000));
        for j in 0..per_image {
            let category = (j % categories.len() as u64) + 1;
            let bbox = BBox::new((j * 17) as i64, (j * 11) as i64, 40, 90);
            dataset
                .annotations
                .push(Annotation::new(next_annotation, image_id, category, bbox));
            next_annotation += 1;
        }
    }
    dataset
}

fn bench_xml_parse(c: &mut Criterion) {
    let xml = annotation_fixture(200);
    let mut group = c.benchmark_group("xml_parse");
    group.throughput(Throughput::Bytes(xml.len() as u64));

    group.bench_function("parse_annotation_str", |b| {
        b.iter(|| {
            let file = parse_annotation_str(black_box(&xml), Path::new("bench.xml")).unwrap();
            black_box(file)
        })
    });

    group.finish();
}

fn bench_coco_write(c: &mut Criterion) {
    let dataset = dataset_fixture(100, 50);
    let mut group = c.benchmark_group("coco_write");
    group.throughput(Throughput::Elements(dataset.annotations.len() as u64));

    group.bench_function("to_coco_string", |b| {
        b.iter(|| {
            let json = to_coco_string(black_box(&dataset)).unwrap();
            black_box(json)
        })
    });

    group.finish();
}

fn bench_coco_parse(c: &mut Criterion) {
    let json = to_coco_string(&dataset_fixture(100, 50)).expect("serialize fixture");
    let mut group = c.benchmark_group("coco_parse");
    group.throughput(Throughput::Bytes(json.len() as u64));

    group.bench_function("from_coco_str", |b| {
        b.iter(|| {
            let ds = from_coco_str(black_box(&json)).unwrap();
            black_box(ds)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_xml_parse, bench_coco_write, bench_coco_parse);
criterion_main!(benches);
