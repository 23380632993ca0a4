//! Coordinate extraction from raw region payloads.
//!
//! Each source payload knows how to resolve a calibration coordinate and a
//! shape's coordinates in its own unit. Unit conversion and policy decisions
//! are left to the pipeline.

use crate::ir::{
    to_lmd_value, CoordinatePair, CsvRow, LengthUnit, Micrometer, Nanometer, Provenance, RawPoint,
    XmlRegion,
};

use super::report::ConversionIssueCode;

/// CSV column holding X (0-indexed).
pub const CSV_X_COLUMN: usize = 5;
/// CSV column holding Y (0-indexed).
pub const CSV_Y_COLUMN: usize = 6;

const CSV_MIN_COLUMNS: usize = CSV_Y_COLUMN + 1;

/// A recoverable problem noticed during extraction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractionWarning {
    pub code: ConversionIssueCode,
    pub message: String,
}

/// A shape point whose coordinate text is not a usable number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidCoordinate {
    /// 1-based point position within the shape.
    pub point: usize,
    pub axis: &'static str,
    pub value: String,
}

/// A region payload that coordinates can be extracted from.
pub trait CoordinateSource {
    /// Unit the source stores coordinates in.
    type Unit: LengthUnit;

    /// Resolve the single coordinate of a calibration region.
    ///
    /// `None` means the region has no usable coordinate at all.
    fn calibration_coordinate(
        &self,
        warnings: &mut Vec<ExtractionWarning>,
    ) -> Option<CoordinatePair<Self::Unit>>;

    /// Resolve every coordinate of a shape region, in source order.
    ///
    /// An empty list means the region is not a capture shape.
    fn shape_coordinates(
        &self,
        warnings: &mut Vec<ExtractionWarning>,
    ) -> Result<Vec<CoordinatePair<Self::Unit>>, InvalidCoordinate>;
}

type CalibrationStrategy = fn(&XmlRegion) -> Option<&RawPoint>;

/// Calibration strategies for NDPA regions, tried in order.
const CALIBRATION_STRATEGIES: [(Provenance, CalibrationStrategy); 2] = [
    (Provenance::Circle, circle_point),
    (Provenance::Pointlist, first_pointlist_point),
];

fn circle_point(region: &XmlRegion) -> Option<&RawPoint> {
    region.circle.as_ref()
}

fn first_pointlist_point(region: &XmlRegion) -> Option<&RawPoint> {
    region.pointlist.as_deref()?.first()
}

impl CoordinateSource for XmlRegion {
    type Unit = Nanometer;

    fn calibration_coordinate(
        &self,
        warnings: &mut Vec<ExtractionWarning>,
    ) -> Option<CoordinatePair<Nanometer>> {
        for (provenance, strategy) in CALIBRATION_STRATEGIES {
            let Some(raw) = strategy(self) else {
                continue;
            };
            match parse_raw_point::<Nanometer>(raw) {
                Ok((x, y)) => return Some(CoordinatePair::new(x, y, provenance)),
                Err((axis, value)) => warnings.push(ExtractionWarning {
                    code: ConversionIssueCode::ExtractionFallback,
                    message: format!(
                        "{provenance} has non-numeric or out-of-range {axis} value '{value}'"
                    ),
                }),
            }
        }
        None
    }

    fn shape_coordinates(
        &self,
        _warnings: &mut Vec<ExtractionWarning>,
    ) -> Result<Vec<CoordinatePair<Nanometer>>, InvalidCoordinate> {
        let Some(points) = &self.pointlist else {
            return Ok(Vec::new());
        };

        points
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                parse_raw_point::<Nanometer>(raw)
                    .map(|(x, y)| CoordinatePair::new(x, y, Provenance::Pointlist))
                    .map_err(|(axis, value)| InvalidCoordinate {
                        point: i + 1,
                        axis,
                        value,
                    })
            })
            .collect()
    }
}

impl CsvRow {
    fn centroid(&self, warnings: &mut Vec<ExtractionWarning>) -> CoordinatePair<Micrometer> {
        if self.fields.len() < CSV_MIN_COLUMNS {
            warnings.push(ExtractionWarning {
                code: ConversionIssueCode::CsvCoordinateDefaulted,
                message: format!(
                    "row {} has only {} column(s), need at least {} (X in column {}, Y in column {}); using (0, 0)",
                    self.line,
                    self.fields.len(),
                    CSV_MIN_COLUMNS,
                    CSV_X_COLUMN,
                    CSV_Y_COLUMN
                ),
            });
            return CoordinatePair::placeholder();
        }

        let raw_x = &self.fields[CSV_X_COLUMN];
        let raw_y = &self.fields[CSV_Y_COLUMN];
        match (
            parse_axis::<Micrometer>(raw_x),
            parse_axis::<Micrometer>(raw_y),
        ) {
            (Some(x), Some(y)) => CoordinatePair::new(x, y, Provenance::CsvColumn),
            _ => {
                warnings.push(ExtractionWarning {
                    code: ConversionIssueCode::CsvCoordinateDefaulted,
                    message: format!(
                        "row {} has non-numeric or out-of-range coordinates ('{}', '{}'); using (0, 0)",
                        self.line, raw_x, raw_y
                    ),
                });
                CoordinatePair::placeholder()
            }
        }
    }
}

impl CoordinateSource for CsvRow {
    type Unit = Micrometer;

    fn calibration_coordinate(
        &self,
        warnings: &mut Vec<ExtractionWarning>,
    ) -> Option<CoordinatePair<Micrometer>> {
        Some(self.centroid(warnings))
    }

    fn shape_coordinates(
        &self,
        warnings: &mut Vec<ExtractionWarning>,
    ) -> Result<Vec<CoordinatePair<Micrometer>>, InvalidCoordinate> {
        Ok(vec![self.centroid(warnings)])
    }
}

fn parse_raw_point<U: LengthUnit>(raw: &RawPoint) -> Result<(f64, f64), (&'static str, String)> {
    let x = parse_axis::<U>(&raw.x).ok_or_else(|| ("x", raw.x.clone()))?;
    let y = parse_axis::<U>(&raw.y).ok_or_else(|| ("y", raw.y.clone()))?;
    Ok((x, y))
}

/// Parse one axis value that also fits the LMD integer grid once rescaled.
fn parse_axis<U: LengthUnit>(raw: &str) -> Option<f64> {
    parse_number(raw).filter(|&value| to_lmd_value::<U>(value).is_some())
}

/// Parse a finite decimal number, ignoring surrounding whitespace.
pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
