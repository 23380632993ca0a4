//! NDP.view2 annotation (`.ndpa`) reader.
//!
//! An NDPA file is an XML document holding one `ndpviewstate` element per
//! region. A region carries an optional `title` and an `annotation`, which
//! is either a circle (direct `x`/`y` children) or a freehand/polygon shape
//! (a `pointlist` of `point` elements). Linear measurements ("rulers") store
//! their endpoints as `x1`/`y1`/`x2`/`y2` and have neither.
//!
//! Coordinates are nanometers, stored as decimal text. The reader keeps that
//! text as-is; parsing and unit conversion happen in the conversion pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::Node;

use super::model::{RawPoint, Region, XmlRegion};
use crate::error::MicroBridgeError;

const REGION_TAG: &str = "ndpviewstate";
const MIN_REGIONS: usize = 3;

/// Read the regions of an NDPA file, in document order.
///
/// # Errors
/// Fails when the file cannot be read, is not well-formed XML, or holds
/// fewer than three regions (the calibration points are mandatory).
pub fn read_ndpa_xml(path: &Path) -> Result<Vec<Region<XmlRegion>>, MicroBridgeError> {
    let xml = fs::read(path).map_err(|source| MicroBridgeError::from_io(path, "reading", source))?;
    parse_ndpa_xml_slice(&xml, path)
}

/// Parse NDPA XML from a UTF-8 string.
///
/// This helper is primarily useful for testing/fuzzing parse behavior in-memory.
pub fn from_ndpa_xml_str(xml: &str) -> Result<Vec<Region<XmlRegion>>, MicroBridgeError> {
    parse_ndpa_xml_str(xml, Path::new("<memory>"))
}

/// Parse NDPA XML from bytes.
///
/// The input must be valid UTF-8.
pub fn from_ndpa_xml_slice(bytes: &[u8]) -> Result<Vec<Region<XmlRegion>>, MicroBridgeError> {
    parse_ndpa_xml_slice(bytes, Path::new("<memory>"))
}

pub(crate) fn parse_ndpa_xml_slice(
    bytes: &[u8],
    path: &Path,
) -> Result<Vec<Region<XmlRegion>>, MicroBridgeError> {
    let xml = std::str::from_utf8(bytes).map_err(|source| MicroBridgeError::InvalidUtf8 {
        path: path.to_path_buf(),
        source,
    })?;
    parse_ndpa_xml_str(xml, path)
}

fn parse_ndpa_xml_str(xml: &str, path: &Path) -> Result<Vec<Region<XmlRegion>>, MicroBridgeError> {
    let document =
        roxmltree::Document::parse(xml).map_err(|source| MicroBridgeError::MalformedXml {
            path: path.to_path_buf(),
            source,
        })?;

    let regions: Vec<Region<XmlRegion>> = document
        .descendants()
        .filter(|node| is_element_named(*node, REGION_TAG))
        .enumerate()
        .map(|(index, node)| parse_region(node, index))
        .collect();

    if regions.len() < MIN_REGIONS {
        return Err(MicroBridgeError::InsufficientRegions {
            path: PathBuf::from(path),
            found: regions.len(),
        });
    }

    Ok(regions)
}

fn parse_region(node: Node<'_, '_>, index: usize) -> Region<XmlRegion> {
    let title = first_descendant(node, "title").and_then(|title| title.text().map(str::to_owned));

    let circle = first_descendant(node, "annotation").and_then(|annotation| {
        let x = child_element(annotation, "x")?;
        let y = child_element(annotation, "y")?;
        Some(RawPoint::new(element_text(Some(x)), element_text(Some(y))))
    });

    let pointlist = first_descendant(node, "pointlist").map(|pointlist| {
        pointlist
            .descendants()
            .filter(|child| is_element_named(*child, "point"))
            .map(|point| {
                RawPoint::new(
                    element_text(first_descendant(point, "x")),
                    element_text(first_descendant(point, "y")),
                )
            })
            .collect()
    });

    Region::new(index, title, XmlRegion { circle, pointlist })
}

fn is_element_named(node: Node<'_, '_>, tag: &str) -> bool {
    node.is_element() && node.tag_name().name() == tag
}

fn child_element<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| is_element_named(*child, tag))
}

fn first_descendant<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.descendants()
        .skip(1)
        .find(|child| is_element_named(*child, tag))
}

/// Trimmed text of an element; absent elements and empty text read as `"0"`.
fn element_text(node: Option<Node<'_, '_>>) -> String {
    node.and_then(|node| node.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .unwrap_or("0")
        .to_string()
}
