//! Integration tests for region CSV to LMD XML conversion.

mod common;

use std::fs;
use std::path::Path;

use common::{element_values, write_file, VALID_CSV};
use microbridge::conversion::{
    convert, convert_file, ConversionIssueCode, ConvertOptions, FormatChoice, MemorySink,
};
use microbridge::ir::io_region_csv::read_region_csv;
use microbridge::MicroBridgeError;

#[test]
fn read_valid_sample_rows() {
    let regions = read_region_csv(Path::new(VALID_CSV)).expect("read fixture");
    assert_eq!(regions.len(), 5, "header and blank line are not data rows");
    assert_eq!(regions[3].raw.fields[1], "Region_A");
}

#[test]
fn valid_sample_converts_centroids() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let output = temp.path().join("rows_LMD.xml");

    let result = convert(Path::new(VALID_CSV), Some(&output), false);
    assert!(result.success, "{:?}", result.diagnostics());

    let xml = fs::read_to_string(&output).expect("read output");
    assert_eq!(element_values(&xml, "X_CalibrationPoint_1"), vec!["101"]);
    assert_eq!(element_values(&xml, "Y_CalibrationPoint_1"), vec!["200"]);
    assert_eq!(element_values(&xml, "X_CalibrationPoint_2"), vec!["150"]);
    assert_eq!(element_values(&xml, "Y_CalibrationPoint_2"), vec!["250"]);
    assert_eq!(element_values(&xml, "X_CalibrationPoint_3"), vec!["200"]);
    assert_eq!(element_values(&xml, "Y_CalibrationPoint_3"), vec!["301"]);

    assert_eq!(element_values(&xml, "ShapeCount"), vec!["2"]);
    assert_eq!(element_values(&xml, "PointCount"), vec!["1", "1"]);
    assert_eq!(element_values(&xml, "X_1"), vec!["1000", "0"]);
    assert_eq!(element_values(&xml, "Y_1"), vec!["2000", "0"]);
}

#[test]
fn non_numeric_row_warns_and_notes_centroids() {
    let sink = MemorySink::new();
    let temp = tempfile::tempdir().expect("create temp dir");
    let input = temp.path().join("rows.csv");
    fs::copy(VALID_CSV, &input).expect("copy fixture");

    let result = convert_file(&input, None, &ConvertOptions::default(), &sink);

    assert!(result.success);
    assert!(result.report.has(ConversionIssueCode::CsvCoordinateDefaulted));
    assert!(result.report.has(ConversionIssueCode::CentroidsOnly));
    assert_eq!(result.report.warning_count(), 2);
    assert!(sink
        .lines()
        .iter()
        .any(|line| line.starts_with("  Warning: ") && line.contains("not-a-number")));
}

#[test]
fn header_only_csv_fails() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let input = write_file(temp.path(), "header.csv", "A,B,C,D,E,X,Y\n1,,,,,1,1\n");

    let result = convert(&input, None, false);

    assert!(!result.success);
    assert!(matches!(
        result.error,
        Some(MicroBridgeError::InsufficientRows { found: 1, .. })
    ));
    assert!(!temp.path().join("header_LMD.xml").exists());
}

#[test]
fn exactly_three_rows_gives_zero_shapes() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let input = write_file(
        temp.path(),
        "three.csv",
        "A,B,C,D,E,X,Y\n1,,,,,1,2\n2,,,,,3,4\n3,,,,,5,6\n",
    );

    let result = convert(&input, None, false);
    assert!(result.success);

    let xml = fs::read_to_string(temp.path().join("three_LMD.xml")).expect("read output");
    assert_eq!(element_values(&xml, "ShapeCount"), vec!["0"]);
}

#[test]
fn short_rows_soft_fail_to_origin() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let input = write_file(
        temp.path(),
        "short.csv",
        "A,B,C\n1,2,3\n1,,,,,10,20\n1,,,,,30,40\n1,2\n",
    );

    let result = convert(&input, None, false);
    assert!(result.success, "{:?}", result.diagnostics());
    assert_eq!(result.report.counts.shapes, 1);

    let xml = fs::read_to_string(temp.path().join("short_LMD.xml")).expect("read output");
    assert_eq!(element_values(&xml, "X_CalibrationPoint_1"), vec!["0"]);
    assert_eq!(element_values(&xml, "X_1"), vec!["0"]);
}

#[test]
fn empty_field_row_keeps_its_position() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let input = write_file(
        temp.path(),
        "gap.csv",
        "Id,A,B,C,D,X,Y\n1,,,,,10,20\n,,,,,,\n3,,,,,50,60\n4,,,,,70,80\n",
    );

    let result = convert(&input, None, false);
    assert!(result.success, "{:?}", result.diagnostics());
    assert_eq!(result.report.counts.shapes, 1);
    assert!(result.report.has(ConversionIssueCode::CsvCoordinateDefaulted));

    let xml = fs::read_to_string(temp.path().join("gap_LMD.xml")).expect("read output");
    assert_eq!(element_values(&xml, "X_CalibrationPoint_1"), vec!["10"]);
    assert_eq!(element_values(&xml, "X_CalibrationPoint_2"), vec!["0"]);
    assert_eq!(element_values(&xml, "Y_CalibrationPoint_2"), vec!["0"]);
    assert_eq!(element_values(&xml, "X_CalibrationPoint_3"), vec!["50"]);
    assert_eq!(element_values(&xml, "X_1"), vec!["70"]);
    assert_eq!(element_values(&xml, "Y_1"), vec!["80"]);
}

#[test]
fn forced_csv_format_reads_unknown_extension() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let input = temp.path().join("export.txt");
    fs::copy(VALID_CSV, &input).expect("copy fixture");

    let auto = convert_file(&input, None, &ConvertOptions::default(), &MemorySink::new());
    assert!(matches!(
        auto.error,
        Some(MicroBridgeError::UnsupportedFormat(_))
    ));

    let options = ConvertOptions {
        format: FormatChoice::Csv,
        ..Default::default()
    };
    let forced = convert_file(&input, None, &options, &MemorySink::new());
    assert!(forced.success, "{:?}", forced.diagnostics());
    assert!(temp.path().join("export_LMD.xml").exists());
}
