//! Single-file conversion into LMD XML.
//!
//! One call converts one file and returns a [`ConversionResult`]. The
//! pipeline runs: load regions, classify them by position, extract and
//! rescale coordinates, filter shapes, serialize. Nothing is written unless
//! every earlier step succeeded.

pub mod classify;
pub mod extract;
pub mod report;
pub mod sink;

pub use classify::{classify, filter_shapes, Classified, FilteredShapes, ShapeCandidate};
pub use extract::{CoordinateSource, ExtractionWarning, InvalidCoordinate};
pub use report::{
    ConversionCounts, ConversionIssue, ConversionIssueCode, ConversionReport, ConversionSeverity,
    ConversionStage,
};
pub use sink::{ConsoleSink, LogSink, MemorySink, NullSink};

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::MicroBridgeError;
use crate::ir::io_lmd_xml::{to_lmd_xml_string, write_lmd_xml};
use crate::ir::{
    io_ndpa_xml, io_region_csv, CalibrationPoint, LengthUnit, LmdDocument, LmdPoint, Micrometer,
    Nanometer, Region,
};

/// Default extension of written LMD files.
pub const DEFAULT_OUTPUT_EXTENSION: &str = ".xml";

/// Suffix appended to the input file stem.
const OUTPUT_SUFFIX: &str = "_LMD";

/// A supported input format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceFormat {
    /// NDP.view2 region XML, coordinates in nanometers.
    NdpaXml,
    /// Region CSV export, centroids in micrometers.
    RegionCsv,
}

impl SourceFormat {
    /// Human-readable name for the format.
    pub fn name(&self) -> &'static str {
        match self {
            SourceFormat::NdpaXml => "ndpa",
            SourceFormat::RegionCsv => "csv",
        }
    }

    /// Guess the format from a file extension (case-insensitive).
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "ndpa" | "xml" => Some(SourceFormat::NdpaXml),
            "csv" => Some(SourceFormat::RegionCsv),
            _ => None,
        }
    }

    /// Guess the format from the first bytes of a file.
    ///
    /// Only XML is recognized; CSV has no reliable signature.
    pub fn sniff(head: &[u8]) -> Option<Self> {
        let head = head.strip_prefix(b"\xef\xbb\xbf").unwrap_or(head);
        let first = head.iter().find(|b| !b.is_ascii_whitespace())?;
        (*first == b'<').then_some(SourceFormat::NdpaXml)
    }
}

/// Input format selection.
///
/// This mirrors the CLI's `--format` flag but is decoupled from clap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormatChoice {
    /// Decide from the extension, then from the file content.
    #[default]
    Auto,
    Ndpa,
    Csv,
}

impl FormatChoice {
    /// Resolve to a concrete format for `path`, whose content starts with `head`.
    pub fn resolve(self, path: &Path, head: &[u8]) -> Result<SourceFormat, MicroBridgeError> {
        match self {
            FormatChoice::Ndpa => Ok(SourceFormat::NdpaXml),
            FormatChoice::Csv => Ok(SourceFormat::RegionCsv),
            FormatChoice::Auto => SourceFormat::from_extension(path)
                .or_else(|| SourceFormat::sniff(head))
                .ok_or_else(|| {
                    MicroBridgeError::UnsupportedFormat(format!(
                        "unknown file type '{}' (expected .ndpa or .csv)",
                        path.display()
                    ))
                }),
        }
    }
}

/// Options for a conversion run.
#[derive(Clone, Debug)]
pub struct ConvertOptions {
    /// Directory for output files; `None` writes next to each input.
    pub output_dir: Option<PathBuf>,
    /// Extension of output files, with or without the leading dot.
    pub output_extension: String,
    /// Write `(0, 0)` for unresolvable calibration points instead of failing.
    pub allow_missing_calibration: bool,
    pub format: FormatChoice,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            output_dir: None,
            output_extension: DEFAULT_OUTPUT_EXTENSION.to_string(),
            allow_missing_calibration: false,
            format: FormatChoice::Auto,
        }
    }
}

impl ConvertOptions {
    /// The default output path for `input`: `<stem>_LMD<ext>`.
    pub fn output_path_for(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());

        let extension = match self.output_extension.as_str() {
            "" => String::new(),
            ext if ext.starts_with('.') => ext.to_string(),
            ext => format!(".{ext}"),
        };

        let dir = match &self.output_dir {
            Some(dir) => dir.clone(),
            None => input
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        };

        dir.join(format!("{stem}{OUTPUT_SUFFIX}{extension}"))
    }
}

/// The outcome of converting one file.
#[derive(Debug)]
pub struct ConversionResult {
    pub success: bool,
    /// Where the LMD file was written; only set on success.
    pub output_path: Option<PathBuf>,
    pub report: ConversionReport,
    /// The failure, when `success` is false.
    pub error: Option<MicroBridgeError>,
}

impl ConversionResult {
    /// The ordered, human-readable log lines of this conversion.
    pub fn diagnostics(&self) -> Vec<String> {
        self.report.lines()
    }

    /// The last pipeline stage reached.
    pub fn stage(&self) -> Option<ConversionStage> {
        self.report.stage
    }
}

/// Convert one file with default options.
///
/// `output` overrides the default `<stem>_LMD.xml` path next to the input.
pub fn convert(
    input: &Path,
    output: Option<&Path>,
    allow_missing_calibration: bool,
) -> ConversionResult {
    let options = ConvertOptions {
        allow_missing_calibration,
        ..Default::default()
    };
    convert_file(input, output, &options, &NullSink)
}

/// Convert one file, streaming log lines to `sink`.
///
/// Failures are reported in the result, never returned as `Err`: one file's
/// failure must not stop a batch.
pub fn convert_file(
    input: &Path,
    output: Option<&Path>,
    options: &ConvertOptions,
    sink: &dyn LogSink,
) -> ConversionResult {
    let mut diag = Diagnostics::new(input, sink);

    match run_file(input, output, options, &mut diag) {
        Ok(output_path) => ConversionResult {
            success: true,
            output_path: Some(output_path),
            report: diag.report,
            error: None,
        },
        Err(error) => {
            diag.error(ConversionIssueCode::ConversionFailed, error.to_string());
            for hint in error.hints() {
                diag.info(ConversionIssueCode::FixHint, format!("  {hint}"));
            }
            ConversionResult {
                success: false,
                output_path: None,
                report: diag.report,
                error: Some(error),
            }
        }
    }
}

/// Convert in-memory source bytes into an [`LmdDocument`].
pub fn convert_bytes(
    bytes: &[u8],
    format: SourceFormat,
    allow_missing_calibration: bool,
) -> Result<LmdDocument, MicroBridgeError> {
    let path = Path::new("<memory>");
    let mut diag = Diagnostics::new(path, &NullSink);
    build_document(bytes, format, path, allow_missing_calibration, &mut diag)
}

/// Convert in-memory source text straight to LMD XML.
pub fn convert_str_to_lmd_xml(
    source: &str,
    format: SourceFormat,
    allow_missing_calibration: bool,
) -> Result<String, MicroBridgeError> {
    let document = convert_bytes(source.as_bytes(), format, allow_missing_calibration)?;
    Ok(to_lmd_xml_string(&document))
}

fn run_file(
    input: &Path,
    output: Option<&Path>,
    options: &ConvertOptions,
    diag: &mut Diagnostics<'_>,
) -> Result<PathBuf, MicroBridgeError> {
    let bytes =
        fs::read(input).map_err(|source| MicroBridgeError::from_io(input, "reading", source))?;
    let format = options.format.resolve(input, &bytes)?;

    let document = build_document(
        &bytes,
        format,
        input,
        options.allow_missing_calibration,
        diag,
    )?;

    let output_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| options.output_path_for(input));
    write_lmd_xml(&output_path, &document)?;
    diag.reach(ConversionStage::Serialized);

    diag.info(
        ConversionIssueCode::OutputWritten,
        format!("Saved to: {}", output_path.display()),
    );
    let counts = diag.report.counts.clone();
    diag.info(
        ConversionIssueCode::Summary,
        format!(
            "Total regions processed: {} ({} calibration points, {} capture shapes)",
            counts.regions,
            classify::CALIBRATION_POINTS,
            counts.shapes
        ),
    );
    Ok(output_path)
}

fn build_document(
    bytes: &[u8],
    format: SourceFormat,
    path: &Path,
    allow_missing_calibration: bool,
    diag: &mut Diagnostics<'_>,
) -> Result<LmdDocument, MicroBridgeError> {
    diag.report.format = Some(format.name().to_string());

    match format {
        SourceFormat::NdpaXml => {
            let regions = io_ndpa_xml::parse_ndpa_xml_slice(bytes, path)?;
            diag.info(
                ConversionIssueCode::SourceLoaded,
                format!(
                    "Found {} regions (coordinates in {})",
                    regions.len(),
                    Nanometer::LABEL
                ),
            );
            resolve_document(&regions, path, allow_missing_calibration, diag)
        }
        SourceFormat::RegionCsv => {
            let regions = io_region_csv::parse_region_csv(bytes, path)?;
            diag.info(
                ConversionIssueCode::SourceLoaded,
                format!(
                    "Found {} data rows in CSV (coordinates in {})",
                    regions.len(),
                    Micrometer::LABEL
                ),
            );
            let document = resolve_document(&regions, path, allow_missing_calibration, diag)?;
            diag.warning(
                ConversionIssueCode::CentroidsOnly,
                "CSV contains centroids only; shapes are single points (use NDPA for full polygons)",
            );
            Ok(document)
        }
    }
}

fn resolve_document<P: CoordinateSource>(
    regions: &[Region<P>],
    path: &Path,
    allow_missing_calibration: bool,
    diag: &mut Diagnostics<'_>,
) -> Result<LmdDocument, MicroBridgeError> {
    diag.report.counts.regions = regions.len();
    diag.reach(ConversionStage::Loaded);

    let classified = classify(regions).ok_or_else(|| MicroBridgeError::InsufficientRegions {
        path: path.to_path_buf(),
        found: regions.len(),
    })?;
    diag.report.counts.shape_candidates = classified.shape_candidates.len();
    diag.reach(ConversionStage::Classified);

    let mut calibration = [LmdPoint::ORIGIN; classify::CALIBRATION_POINTS];
    for (slot, region) in classified.calibration.iter().enumerate() {
        let number = slot + 1;
        let mut warnings = Vec::new();
        let resolved = region.raw.calibration_coordinate(&mut warnings);
        for warning in warnings {
            diag.warning(
                warning.code,
                format!(
                    "Calibration point {number} ('{}'): {}",
                    region.title, warning.message
                ),
            );
        }

        let resolved =
            resolved.and_then(|pair| Some((pair.coord.to_lmd_point()?, pair.provenance)));
        let point = CalibrationPoint {
            number,
            title: region.title.clone(),
            value: resolved.map(|(value, _)| value),
            provenance: resolved.map(|(_, provenance)| provenance),
        };
        calibration[slot] = point.written_value();
        diag.report.calibration.push(point);

        match resolved {
            Some((value, provenance)) => {
                diag.info(
                    ConversionIssueCode::CalibrationResolved,
                    format!(
                        "Calibration point {number} ('{}'): X={}, Y={} (from {provenance})",
                        region.title, value.x, value.y
                    ),
                );
            }
            None if allow_missing_calibration => {
                diag.report.counts.placeholder_calibrations += 1;
                diag.warning(
                    ConversionIssueCode::CalibrationPlaceholder,
                    format!(
                        "Calibration point {number} ('{}') has no valid coordinates; using placeholder (0, 0). The LMD system may malfunction!",
                        region.title
                    ),
                );
            }
            None => {
                diag.reach(ConversionStage::CalibrationMissing);
                return Err(MicroBridgeError::MissingCalibration {
                    path: path.to_path_buf(),
                    point: number,
                    title: region.title.clone(),
                });
            }
        }
    }
    diag.reach(if diag.report.counts.placeholder_calibrations > 0 {
        ConversionStage::CalibrationMissing
    } else {
        ConversionStage::CalibrationResolved
    });

    let mut candidates = Vec::with_capacity(classified.shape_candidates.len());
    for region in classified.shape_candidates {
        let mut warnings = Vec::new();
        let pairs = region
            .raw
            .shape_coordinates(&mut warnings)
            .map_err(|bad| MicroBridgeError::InvalidNumericData {
                path: path.to_path_buf(),
                context: format!(
                    "region {} ('{}') point {} <{}>",
                    region.index, region.title, bad.point, bad.axis
                ),
                value: bad.value,
            })?;
        for warning in warnings {
            diag.warning(
                warning.code,
                format!("Shape region '{}': {}", region.title, warning.message),
            );
        }

        let points = pairs
            .iter()
            .enumerate()
            .map(|(i, pair)| {
                pair.coord
                    .to_lmd_point()
                    .ok_or_else(|| MicroBridgeError::InvalidNumericData {
                        path: path.to_path_buf(),
                        context: format!(
                            "region {} ('{}') point {}",
                            region.index,
                            region.title,
                            i + 1
                        ),
                        value: format!("({}, {})", pair.coord.x, pair.coord.y),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        candidates.push(ShapeCandidate {
            source: region.index,
            title: region.title.clone(),
            points,
        });
    }

    let FilteredShapes { shapes, skipped } = filter_shapes(candidates);
    diag.report.counts.shapes = shapes.len();
    if !skipped.is_empty() {
        let titles: Vec<&str> = skipped.iter().map(|c| c.title.as_str()).collect();
        diag.info(
            ConversionIssueCode::ShapesSkipped,
            format!(
                "Skipped {} region(s) without points (rulers or empty annotations): {}",
                skipped.len(),
                titles.join(", ")
            ),
        );
    }
    diag.reach(ConversionStage::ShapesFiltered);

    diag.info(
        ConversionIssueCode::ShapeConverted,
        format!("Processing {} capture shapes", shapes.len()),
    );
    for shape in &shapes {
        if let Some(first) = shape.points.first() {
            diag.info(
                ConversionIssueCode::ShapeConverted,
                format!(
                    "Shape {} ('{}'): {} point(s), first=({}, {})",
                    shape.number,
                    shape.title,
                    shape.point_count(),
                    first.x,
                    first.y
                ),
            );
        }
    }

    Ok(LmdDocument {
        calibration,
        shapes,
    })
}

/// Records log entries into the report and mirrors them to the sink.
struct Diagnostics<'a> {
    report: ConversionReport,
    sink: &'a dyn LogSink,
}

impl<'a> Diagnostics<'a> {
    fn new(input: &Path, sink: &'a dyn LogSink) -> Self {
        Self {
            report: ConversionReport::new(input.display().to_string()),
            sink,
        }
    }

    fn record(&mut self, issue: ConversionIssue) {
        self.sink.append(&issue.to_string());
        self.report.add(issue);
    }

    fn info(&mut self, code: ConversionIssueCode, message: impl Into<String>) {
        self.record(ConversionIssue::info(code, message));
    }

    fn warning(&mut self, code: ConversionIssueCode, message: impl Into<String>) {
        self.record(ConversionIssue::warning(code, message));
    }

    fn error(&mut self, code: ConversionIssueCode, message: impl Into<String>) {
        self.record(ConversionIssue::error(code, message));
    }

    fn reach(&mut self, stage: ConversionStage) {
        self.report.stage = Some(stage);
    }
}
