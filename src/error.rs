use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::preflight::PreflightReport;

/// The main error type for microbridge operations.
#[derive(Debug, Error)]
pub enum MicroBridgeError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Input file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Permission denied while {action} {path}")]
    PermissionDenied { path: PathBuf, action: &'static str },

    #[error("Invalid XML format in {path}: {source}")]
    MalformedXml {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("Input {path} is not valid UTF-8: {source}")]
    InvalidUtf8 {
        path: PathBuf,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("Failed to parse CSV from {path}: {source}")]
    MalformedCsv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Found {found} region(s) in {path}; need at least 3 regions for calibration points")]
    InsufficientRegions { path: PathBuf, found: usize },

    #[error("Found {found} data row(s) in {path}; need at least 3 data rows (after the header) for calibration points")]
    InsufficientRows { path: PathBuf, found: usize },

    #[error("Calibration point {point} ('{title}') in {path} has no valid coordinates")]
    MissingCalibration {
        path: PathBuf,
        point: usize,
        title: String,
    },

    #[error("Invalid numeric data in {path}: {context} has value '{value}'")]
    InvalidNumericData {
        path: PathBuf,
        context: String,
        value: String,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Pre-flight validation failed with {issue_count} issue(s)")]
    PreflightFailed {
        issue_count: usize,
        report: PreflightReport,
    },

    #[error("No convertible input files found (expected .ndpa or .csv)")]
    NoInputFiles,

    #[error("Batch conversion failed: {failed} of {total} file(s) could not be converted")]
    BatchFailed { failed: usize, total: usize },
}

impl MicroBridgeError {
    /// Classify an I/O error raised while touching `path`.
    pub(crate) fn from_io(path: &Path, action: &'static str, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => MicroBridgeError::FileNotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::PermissionDenied => MicroBridgeError::PermissionDenied {
                path: path.to_path_buf(),
                action,
            },
            _ => MicroBridgeError::Io(source),
        }
    }

    /// Steps a user can take to fix this failure.
    pub fn hints(&self) -> &'static [&'static str] {
        match self {
            MicroBridgeError::FileNotFound { .. } => &[
                "The file may have been moved or deleted.",
                "Please check the file path and try again.",
            ],
            MicroBridgeError::PermissionDenied { .. } => &[
                "You don't have permission to read this file or write to the output location.",
                "Try choosing a different output folder with write permissions.",
            ],
            MicroBridgeError::MalformedXml { .. } | MicroBridgeError::InvalidUtf8 { .. } => &[
                "This file may be corrupted or not a valid NDPA file.",
                "Try opening it in NDP.view2 to verify it's valid.",
            ],
            MicroBridgeError::MalformedCsv { .. } => &[
                "The file may not be a valid CSV or may use an unsupported encoding.",
            ],
            MicroBridgeError::InsufficientRegions { .. } => &[
                "The first 3 regions must be the calibration/reference points.",
                "Add the missing calibration regions in NDP.view2 and export again.",
            ],
            MicroBridgeError::InsufficientRows { .. } => &[
                "The CSV needs a header row followed by 3 calibration rows.",
            ],
            MicroBridgeError::MissingCalibration { .. } => &[
                "Open the file in NDP.view2.",
                "Ensure the first 3 regions have valid annotations.",
                "Use circle annotations for calibration points (recommended).",
                "To force conversion with placeholder (0,0) coordinates, use the --force flag.",
            ],
            MicroBridgeError::InvalidNumericData { .. } => &[
                "The file contains invalid coordinate or numeric data.",
                "Please check the annotation data in NDP.view2.",
            ],
            MicroBridgeError::UnsupportedFormat(_) => {
                &["Use --format ndpa or --format csv to choose the input format explicitly."]
            }
            MicroBridgeError::NoInputFiles => {
                &["Pass .ndpa or .csv files, or a directory containing them (use --recursive for subfolders)."]
            }
            MicroBridgeError::Io(_)
            | MicroBridgeError::PreflightFailed { .. }
            | MicroBridgeError::BatchFailed { .. } => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_io_classifies_by_kind() {
        let path = Path::new("slide.ndpa");

        let not_found = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert!(matches!(
            MicroBridgeError::from_io(path, "reading", not_found),
            MicroBridgeError::FileNotFound { .. }
        ));

        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        assert!(matches!(
            MicroBridgeError::from_io(path, "reading", denied),
            MicroBridgeError::PermissionDenied {
                action: "reading",
                ..
            }
        ));

        let other = io::Error::other("disk on fire");
        assert!(matches!(
            MicroBridgeError::from_io(path, "reading", other),
            MicroBridgeError::Io(_)
        ));
    }

    #[test]
    fn missing_calibration_hints_mention_force() {
        let err = MicroBridgeError::MissingCalibration {
            path: PathBuf::from("slide.ndpa"),
            point: 2,
            title: "Point2".to_string(),
        };
        assert!(err.hints().iter().any(|hint| hint.contains("--force")));
        assert_eq!(
            err.to_string(),
            "Calibration point 2 ('Point2') in slide.ndpa has no valid coordinates"
        );
    }
}
