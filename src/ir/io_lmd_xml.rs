//! LMD XML writer.
//!
//! The laser-microdissection instrument reads a flat XML document:
//!
//! ```text
//! <ImageData>
//!   <GlobalCoordinates>1</GlobalCoordinates>
//!   <X_CalibrationPoint_1>..</X_CalibrationPoint_1>
//!   <Y_CalibrationPoint_1>..</Y_CalibrationPoint_1>
//!   ... (points 2 and 3)
//!   <ShapeCount>N</ShapeCount>
//!   <Shape_1>
//!     <PointCount>k</PointCount>
//!     <X_1>..</X_1>
//!     <Y_1>..</Y_1>
//!     ...
//!   </Shape_1>
//!   ...
//! </ImageData>
//! ```
//!
//! All values are integer micrometers. Output is deterministic: the same
//! document always serializes to the same bytes.

use std::fmt::Write as _;
use std::fs;
use std::io::Write as _;
use std::path::Path;

use super::model::LmdDocument;
use crate::error::MicroBridgeError;

/// Value of the `GlobalCoordinates` flag; the instrument only accepts `1`.
const GLOBAL_COORDINATES: u8 = 1;

/// Serialize a document to an LMD XML string.
pub fn to_lmd_xml_string(document: &LmdDocument) -> String {
    let mut xml = String::new();

    writeln!(xml, "<?xml version=\"1.0\" encoding=\"utf-8\"?>").expect("write to string");
    writeln!(xml, "<ImageData>").expect("write to string");
    writeln!(
        xml,
        "  <GlobalCoordinates>{GLOBAL_COORDINATES}</GlobalCoordinates>"
    )
    .expect("write to string");

    for (slot, point) in document.calibration.iter().enumerate() {
        let n = slot + 1;
        writeln!(xml, "  <X_CalibrationPoint_{n}>{}</X_CalibrationPoint_{n}>", point.x)
            .expect("write to string");
        writeln!(xml, "  <Y_CalibrationPoint_{n}>{}</Y_CalibrationPoint_{n}>", point.y)
            .expect("write to string");
    }

    writeln!(xml, "  <ShapeCount>{}</ShapeCount>", document.shape_count())
        .expect("write to string");

    for shape in &document.shapes {
        let n = shape.number;
        writeln!(xml, "  <Shape_{n}>").expect("write to string");
        writeln!(xml, "    <PointCount>{}</PointCount>", shape.point_count())
            .expect("write to string");
        for (i, point) in shape.points.iter().enumerate() {
            let i = i + 1;
            writeln!(xml, "    <X_{i}>{}</X_{i}>", point.x).expect("write to string");
            writeln!(xml, "    <Y_{i}>{}</Y_{i}>", point.y).expect("write to string");
        }
        writeln!(xml, "  </Shape_{n}>").expect("write to string");
    }

    writeln!(xml, "</ImageData>").expect("write to string");
    xml
}

/// Write a document to `path`.
///
/// The XML is written to a temporary file in the target directory and then
/// renamed over `path`, so a failure never leaves a truncated file behind.
/// The parent directory is created if needed. On Unix the file gets the same
/// mode a plain `File::create` would give it (`0o666` less the umask).
pub fn write_lmd_xml(path: &Path, document: &LmdDocument) -> Result<(), MicroBridgeError> {
    let xml = to_lmd_xml_string(document);

    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)
        .map_err(|source| MicroBridgeError::from_io(dir, "creating directory", source))?;

    let mut builder = tempfile::Builder::new();
    builder.prefix(".microbridge-").suffix(".tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut staged = builder
        .tempfile_in(dir)
        .map_err(|source| MicroBridgeError::from_io(dir, "writing to", source))?;
    staged
        .write_all(xml.as_bytes())
        .and_then(|()| staged.flush())
        .map_err(|source| MicroBridgeError::from_io(path, "writing", source))?;

    staged
        .persist(path)
        .map_err(|source| MicroBridgeError::from_io(path, "writing", source.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{LmdPoint, RegionIndex, Shape, ShapeNumber};

    fn sample_document() -> LmdDocument {
        LmdDocument {
            calibration: [
                LmdPoint::new(100_000, 200_000),
                LmdPoint::new(150_000, 250_000),
                LmdPoint::new(200_000, 300_000),
            ],
            shapes: vec![Shape {
                number: ShapeNumber::new(1),
                source: RegionIndex::new(3),
                title: "Tumour".to_string(),
                points: vec![
                    LmdPoint::new(300_000, 400_000),
                    LmdPoint::new(350_000, 450_000),
                ],
            }],
        }
    }

    #[test]
    fn serializes_fixed_schema() {
        let expected = "<?xml version=\"1.0\" encoding=\"utf-8\"?>
<ImageData>
  <GlobalCoordinates>1</GlobalCoordinates>
  <X_CalibrationPoint_1>100000</X_CalibrationPoint_1>
  <Y_CalibrationPoint_1>200000</Y_CalibrationPoint_1>
  <X_CalibrationPoint_2>150000</X_CalibrationPoint_2>
  <Y_CalibrationPoint_2>250000</Y_CalibrationPoint_2>
  <X_CalibrationPoint_3>200000</X_CalibrationPoint_3>
  <Y_CalibrationPoint_3>300000</Y_CalibrationPoint_3>
  <ShapeCount>1</ShapeCount>
  <Shape_1>
    <PointCount>2</PointCount>
    <X_1>300000</X_1>
    <Y_1>400000</Y_1>
    <X_2>350000</X_2>
    <Y_2>450000</Y_2>
  </Shape_1>
</ImageData>
";
        assert_eq!(to_lmd_xml_string(&sample_document()), expected);
    }

    #[test]
    fn zero_shapes_still_writes_count() {
        let document = LmdDocument::default();
        let xml = to_lmd_xml_string(&document);
        assert!(xml.contains("  <ShapeCount>0</ShapeCount>\n</ImageData>\n"));
        assert!(xml.contains("<X_CalibrationPoint_3>0</X_CalibrationPoint_3>"));
    }

    #[test]
    fn negative_values_have_no_padding() {
        let mut document = LmdDocument::default();
        document.calibration[0] = LmdPoint::new(-5, 7);
        let xml = to_lmd_xml_string(&document);
        assert!(xml.contains("<X_CalibrationPoint_1>-5</X_CalibrationPoint_1>"));
        assert!(xml.contains("<Y_CalibrationPoint_1>7</Y_CalibrationPoint_1>"));
    }

    #[test]
    fn write_creates_parent_and_leaves_no_temp_files() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("nested").join("slide_LMD.xml");

        write_lmd_xml(&path, &sample_document()).expect("write lmd");

        let written = fs::read_to_string(&path).expect("read back");
        assert_eq!(written, to_lmd_xml_string(&sample_document()));

        let leftovers: Vec<_> = fs::read_dir(path.parent().expect("parent"))
            .expect("list dir")
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn written_file_has_default_create_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("slide_LMD.xml");
        let reference = temp.path().join("reference.xml");
        fs::File::create(&reference).expect("create reference");

        write_lmd_xml(&path, &sample_document()).expect("write lmd");

        let mode = |p: &Path| fs::metadata(p).expect("metadata").permissions().mode() & 0o777;
        assert_eq!(mode(path.as_path()), mode(reference.as_path()));
    }
}
