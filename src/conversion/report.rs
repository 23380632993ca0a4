//! Conversion report types for per-file diagnostics.
//!
//! Every conversion produces a [`ConversionReport`]: the ordered log of what
//! happened to one input file, plus the counts and the last pipeline stage
//! reached. It renders as human-readable log lines and serializes to JSON.

use serde::Serialize;
use std::fmt;

use crate::ir::CalibrationPoint;

/// Pipeline stages of a single-file conversion, in order.
///
/// `CalibrationMissing` is only passed through when the placeholder policy is
/// active; otherwise the conversion fails there.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConversionStage {
    Loaded,
    Classified,
    CalibrationResolved,
    CalibrationMissing,
    ShapesFiltered,
    Serialized,
}

/// The ordered diagnostics of one file's conversion.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ConversionReport {
    /// Input path as given by the caller.
    pub input: String,
    /// Detected source format name, once known.
    pub format: Option<String>,
    /// Last stage the pipeline reached.
    pub stage: Option<ConversionStage>,
    pub counts: ConversionCounts,
    /// Calibration slots as resolved, once extraction has run.
    pub calibration: Vec<CalibrationPoint>,
    /// Issues in the order they were recorded.
    pub issues: Vec<ConversionIssue>,
}

impl ConversionReport {
    /// Create a new empty report for one input file.
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            ..Default::default()
        }
    }

    /// Add an issue to the report.
    pub fn add(&mut self, issue: ConversionIssue) {
        self.issues.push(issue);
    }

    /// Count of warning-level issues.
    pub fn warning_count(&self) -> usize {
        self.count(ConversionSeverity::Warning)
    }

    /// Count of error-level issues.
    pub fn error_count(&self) -> usize {
        self.count(ConversionSeverity::Error)
    }

    /// True if any issue with this code was recorded.
    pub fn has(&self, code: ConversionIssueCode) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }

    /// Rendered log lines, in order.
    pub fn lines(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }

    fn count(&self, severity: ConversionSeverity) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == severity)
            .count()
    }
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for issue in &self.issues {
            writeln!(f, "{}", issue)?;
        }
        Ok(())
    }
}

/// Counts of what the conversion saw and produced.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConversionCounts {
    /// Regions (XML) or data rows (CSV) read from the source.
    pub regions: usize,
    /// Calibration points written with `(0, 0)` placeholders.
    pub placeholder_calibrations: usize,
    /// Regions after the first three.
    pub shape_candidates: usize,
    /// Shapes written to the output.
    pub shapes: usize,
}

impl ConversionCounts {
    /// Candidates dropped because they had no points.
    pub fn skipped_shapes(&self) -> usize {
        self.shape_candidates.saturating_sub(self.shapes)
    }
}

/// A single log entry of a conversion.
#[derive(Clone, Debug, Serialize)]
pub struct ConversionIssue {
    pub severity: ConversionSeverity,
    pub code: ConversionIssueCode,
    pub message: String,
}

impl ConversionIssue {
    /// Create an info-level entry (progress and results).
    pub fn info(code: ConversionIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: ConversionSeverity::Info,
            code,
            message: message.into(),
        }
    }

    /// Create a warning-level entry (degraded but usable output).
    pub fn warning(code: ConversionIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: ConversionSeverity::Warning,
            code,
            message: message.into(),
        }
    }

    /// Create an error-level entry (the file failed).
    pub fn error(code: ConversionIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: ConversionSeverity::Error,
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConversionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            ConversionSeverity::Info => write!(f, "  {}", self.message),
            ConversionSeverity::Warning => write!(f, "  Warning: {}", self.message),
            ConversionSeverity::Error => write!(f, "  ERROR: {}", self.message),
        }
    }
}

/// Severity level for conversion log entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionSeverity {
    Info,
    Warning,
    Error,
}

/// Stable codes for conversion log entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionIssueCode {
    /// Regions or rows found in the source.
    SourceLoaded,
    /// A calibration point was resolved.
    CalibrationResolved,
    /// A calibration strategy found data but it was not numeric.
    ExtractionFallback,
    /// A `(0, 0)` placeholder was written for a calibration point.
    CalibrationPlaceholder,
    /// A CSV row had too few columns or unusable coordinates.
    CsvCoordinateDefaulted,
    /// One shape was converted.
    ShapeConverted,
    /// Shape candidates without points were skipped (rulers, empty regions).
    ShapesSkipped,
    /// CSV sources only carry centroids, not polygon vertices.
    CentroidsOnly,
    /// The output file was written.
    OutputWritten,
    /// Final counts for the file.
    Summary,
    /// The conversion failed.
    ConversionFailed,
    /// A suggested fix for a failure.
    FixHint,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_render_severity_prefixes() {
        let mut report = ConversionReport::new("slide.ndpa");
        report.add(ConversionIssue::info(
            ConversionIssueCode::SourceLoaded,
            "Found 4 regions",
        ));
        report.add(ConversionIssue::warning(
            ConversionIssueCode::CsvCoordinateDefaulted,
            "row 2 has only 3 column(s)",
        ));
        report.add(ConversionIssue::error(
            ConversionIssueCode::ConversionFailed,
            "boom",
        ));

        assert_eq!(
            report.lines(),
            vec![
                "  Found 4 regions",
                "  Warning: row 2 has only 3 column(s)",
                "  ERROR: boom"
            ]
        );
        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.error_count(), 1);
        assert!(report.has(ConversionIssueCode::SourceLoaded));
        assert!(!report.has(ConversionIssueCode::OutputWritten));
    }

    #[test]
    fn skipped_shapes_never_underflows() {
        let counts = ConversionCounts {
            shape_candidates: 2,
            shapes: 2,
            ..Default::default()
        };
        assert_eq!(counts.skipped_shapes(), 0);
    }

    #[test]
    fn stages_are_ordered() {
        assert!(ConversionStage::Loaded < ConversionStage::Classified);
        assert!(ConversionStage::ShapesFiltered < ConversionStage::Serialized);
    }

    #[test]
    fn report_serializes_to_json() {
        let mut report = ConversionReport::new("rows.csv");
        report.stage = Some(ConversionStage::CalibrationResolved);
        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["stage"], "calibration-resolved");
        assert_eq!(json["input"], "rows.csv");
    }
}
