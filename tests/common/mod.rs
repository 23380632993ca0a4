#![allow(dead_code)]

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

pub const VALID_NDPA: &str = "tests/fixtures/valid_sample.ndpa";
pub const VALID_CSV: &str = "tests/fixtures/valid_sample.csv";

/// A region for [`ndpa_xml`]: either a circle or a point list (or nothing).
pub enum Fixture<'a> {
    Circle(&'a str, i64, i64),
    Pointlist(&'a str, &'a [(i64, i64)]),
    Ruler(&'a str),
    Empty(&'a str),
}

/// Build an NDPA document from region descriptions.
pub fn ndpa_xml(regions: &[Fixture<'_>]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<annotations>\n");
    for (i, region) in regions.iter().enumerate() {
        writeln!(xml, "  <ndpviewstate id=\"{}\">", i + 1).expect("write to string");
        match region {
            Fixture::Circle(title, x, y) => {
                writeln!(xml, "    <title>{title}</title>").expect("write to string");
                writeln!(
                    xml,
                    "    <annotation type=\"circle\"><x>{x}</x><y>{y}</y></annotation>"
                )
                .expect("write to string");
            }
            Fixture::Pointlist(title, points) => {
                writeln!(xml, "    <title>{title}</title>").expect("write to string");
                writeln!(xml, "    <annotation type=\"freehand\"><pointlist>")
                    .expect("write to string");
                for (x, y) in points.iter() {
                    writeln!(xml, "      <point><x>{x}</x><y>{y}</y></point>")
                        .expect("write to string");
                }
                writeln!(xml, "    </pointlist></annotation>").expect("write to string");
            }
            Fixture::Ruler(title) => {
                writeln!(xml, "    <title>{title}</title>").expect("write to string");
                writeln!(
                    xml,
                    "    <annotation type=\"linearmeasure\"><x1>0</x1><y1>0</y1><x2>9</x2><y2>9</y2></annotation>"
                )
                .expect("write to string");
            }
            Fixture::Empty(title) => {
                writeln!(xml, "    <title>{title}</title>").expect("write to string");
            }
        }
        xml.push_str("  </ndpviewstate>\n");
    }
    xml.push_str("</annotations>\n");
    xml
}

/// Three circle calibration points at 1000, 2000 and 3000 micrometers.
pub fn calibration_circles() -> [Fixture<'static>; 3] {
    [
        Fixture::Circle("Cal_1", 1_000_000, 1_000_000),
        Fixture::Circle("Cal_2", 2_000_000, 2_000_000),
        Fixture::Circle("Cal_3", 3_000_000, 3_000_000),
    ]
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(&path, contents).expect("write fixture file");
    path
}

/// Values of every `<tag>value</tag>` line, in document order.
pub fn element_values(xml: &str, tag: &str) -> Vec<String> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    xml.lines()
        .filter_map(|line| {
            let line = line.trim();
            line.strip_prefix(&open)?
                .strip_suffix(&close)
                .map(str::to_string)
        })
        .collect()
}
