#![allow(dead_code)]

use std::fmt::Write as _;

use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

/// Coordinates stay well inside the range where `f64` division is exact enough.
pub const MAX_NANOMETERS: i64 = 1_000_000_000_000;

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// What one generated NDPA region contains.
#[derive(Clone, Debug)]
pub enum RegionSpec {
    Circle(i64, i64),
    Pointlist(Vec<(i64, i64)>),
    Ruler,
    Empty,
}

impl RegionSpec {
    /// Points the region contributes as a capture shape.
    pub fn shape_points(&self) -> usize {
        match self {
            RegionSpec::Pointlist(points) => points.len(),
            _ => 0,
        }
    }
}

pub fn arb_nanometers() -> impl Strategy<Value = i64> {
    -MAX_NANOMETERS..=MAX_NANOMETERS
}

pub fn arb_point() -> impl Strategy<Value = (i64, i64)> {
    (arb_nanometers(), arb_nanometers())
}

pub fn arb_calibration_region() -> BoxedStrategy<RegionSpec> {
    prop_oneof![
        arb_point().prop_map(|(x, y)| RegionSpec::Circle(x, y)),
        prop::collection::vec(arb_point(), 1..4).prop_map(RegionSpec::Pointlist),
    ]
    .boxed()
}

pub fn arb_shape_region() -> BoxedStrategy<RegionSpec> {
    prop_oneof![
        3 => prop::collection::vec(arb_point(), 0..6).prop_map(RegionSpec::Pointlist),
        1 => arb_point().prop_map(|(x, y)| RegionSpec::Circle(x, y)),
        1 => Just(RegionSpec::Ruler),
        1 => Just(RegionSpec::Empty),
    ]
    .boxed()
}

/// Three resolvable calibration regions followed by up to `max_shapes` candidates.
pub fn arb_regions(max_shapes: usize) -> impl Strategy<Value = Vec<RegionSpec>> {
    (
        prop::collection::vec(arb_calibration_region(), 3),
        prop::collection::vec(arb_shape_region(), 0..=max_shapes),
    )
        .prop_map(|(mut calibration, shapes)| {
            calibration.extend(shapes);
            calibration
        })
}

pub fn ndpa_document(regions: &[RegionSpec]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<annotations>\n");
    for (i, region) in regions.iter().enumerate() {
        writeln!(xml, "<ndpviewstate id=\"{i}\"><title>R{i}</title>").expect("write to string");
        match region {
            RegionSpec::Circle(x, y) => {
                writeln!(xml, "<annotation type=\"circle\"><x>{x}</x><y>{y}</y></annotation>")
                    .expect("write to string");
            }
            RegionSpec::Pointlist(points) => {
                xml.push_str("<annotation type=\"freehand\"><pointlist>\n");
                for (x, y) in points {
                    writeln!(xml, "<point><x>{x}</x><y>{y}</y></point>").expect("write to string");
                }
                xml.push_str("</pointlist></annotation>\n");
            }
            RegionSpec::Ruler => {
                xml.push_str(
                    "<annotation type=\"linearmeasure\"><x1>1</x1><y1>1</y1><x2>5</x2><y2>5</y2></annotation>\n",
                );
            }
            RegionSpec::Empty => {}
        }
        xml.push_str("</ndpviewstate>\n");
    }
    xml.push_str("</annotations>\n");
    xml
}

/// Nanometers to micrometers with round-half-to-even, in exact integer arithmetic.
pub fn nanometers_to_micrometers(nm: i64) -> i64 {
    let quotient = nm.div_euclid(1000);
    let remainder = nm.rem_euclid(1000);
    match remainder.cmp(&500) {
        std::cmp::Ordering::Less => quotient,
        std::cmp::Ordering::Greater => quotient + 1,
        std::cmp::Ordering::Equal => quotient + quotient.rem_euclid(2),
    }
}
