//! Core model for the microbridge conversion pipeline.
//!
//! Readers turn a source file into an ordered list of [`Region`]s. The
//! conversion pipeline resolves those regions into an [`LmdDocument`], which
//! the LMD writer serializes.

use serde::Serialize;
use std::fmt;

use super::coord::{Coord, LmdPoint};
use super::ids::{RegionIndex, ShapeNumber};

/// One annotation unit from a source file, in document or row order.
///
/// The payload `P` is format specific: [`XmlRegion`] for NDP.view2 files,
/// [`CsvRow`] for CSV exports. Regions are created once by a reader and are
/// read-only afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Region<P> {
    /// Position in the source. Role assignment depends only on this.
    pub index: RegionIndex,

    /// Display name, synthesized as `Region_<index>` when the source has none.
    pub title: String,

    /// Format-specific fields.
    pub raw: P,
}

impl<P> Region<P> {
    /// Creates a region, falling back to a synthesized title.
    pub fn new(index: usize, title: Option<String>, raw: P) -> Self {
        let title = title
            .map(|title| title.trim().to_string())
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| format!("Region_{index}"));
        Self {
            index: RegionIndex::new(index),
            title,
            raw,
        }
    }
}

/// The coordinate-bearing fields of one `ndpviewstate` element.
///
/// Values are kept as the raw text found in the file; missing or empty
/// elements are recorded as `"0"`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct XmlRegion {
    /// Direct `x`/`y` children of the first `annotation` element, when both exist.
    pub circle: Option<RawPoint>,

    /// Points of the first `pointlist` element, or `None` when there is no pointlist.
    pub pointlist: Option<Vec<RawPoint>>,
}

/// An unparsed `x`/`y` pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawPoint {
    pub x: String,
    pub y: String,
}

impl RawPoint {
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }
}

/// One data row of a CSV export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsvRow {
    /// 1-based line number in the source file.
    pub line: u64,
    pub fields: Vec<String>,
}

/// Where a coordinate pair came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    /// Direct `x`/`y` of a circle annotation.
    Circle,
    /// First point of a `pointlist`.
    Pointlist,
    /// CSV columns 5 and 6.
    CsvColumn,
    /// Nothing usable was found; the value is a `(0, 0)` placeholder.
    None,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Provenance::Circle => "circle annotation",
            Provenance::Pointlist => "pointlist",
            Provenance::CsvColumn => "CSV columns",
            Provenance::None => "placeholder",
        };
        f.write_str(label)
    }
}

/// A coordinate in the source's native unit, tagged with its origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordinatePair<TUnit> {
    pub coord: Coord<TUnit>,
    pub provenance: Provenance,
}

impl<TUnit> CoordinatePair<TUnit> {
    pub fn new(x: f64, y: f64, provenance: Provenance) -> Self {
        Self {
            coord: Coord::new(x, y),
            provenance,
        }
    }

    /// The `(0, 0)` soft-fail value.
    pub fn placeholder() -> Self {
        Self::new(0.0, 0.0, Provenance::None)
    }
}

/// One of the three calibration slots, after extraction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CalibrationPoint {
    /// 1, 2 or 3.
    pub number: usize,
    pub title: String,
    /// `None` marks a calibration region with no resolvable coordinates.
    pub value: Option<LmdPoint>,
    pub provenance: Option<Provenance>,
}

impl CalibrationPoint {
    pub fn is_missing(&self) -> bool {
        self.value.is_none()
    }

    /// The value written to the LMD file: `(0, 0)` when missing.
    pub fn written_value(&self) -> LmdPoint {
        self.value.unwrap_or(LmdPoint::ORIGIN)
    }
}

/// A capture shape that survived filtering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Shape {
    /// Position among surviving shapes, starting at 1.
    pub number: ShapeNumber,
    /// Index of the region this shape came from.
    pub source: RegionIndex,
    pub title: String,
    /// Never empty.
    pub points: Vec<LmdPoint>,
}

impl Shape {
    pub fn point_count(&self) -> usize {
        self.points.len()
    }
}

/// Everything the LMD writer needs: three calibration points and the shapes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LmdDocument {
    pub calibration: [LmdPoint; 3],
    pub shapes: Vec<Shape>,
}

impl LmdDocument {
    /// The value written as `ShapeCount`.
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }
}
