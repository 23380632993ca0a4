//! Pre-flight checks run before a batch starts.
//!
//! The checks are cheap: existence, readability, a peek at the first bytes
//! of each file, output name clashes and a test write into the output
//! directory. They catch the common mistakes before any output is produced.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::conversion::ConvertOptions;
use crate::error::MicroBridgeError;

/// Bytes read from each file for the format check.
const SNIFF_LEN: usize = 100;

/// Entries listed per category before truncating.
const MAX_LISTED: usize = 5;

const XML_DECLARATION: &str = "<?xml";

/// Problems found before conversion.
#[derive(Clone, Debug, Default, Serialize)]
pub struct PreflightReport {
    /// File names that do not exist.
    pub missing: Vec<String>,
    /// File names that cannot be opened or read, with the reason.
    pub unreadable: Vec<String>,
    /// File names whose content contradicts their extension.
    pub invalid_format: Vec<String>,
    /// Inputs that would be written to the same output file.
    pub output_conflicts: Vec<String>,
    /// The output directory, when it cannot be written to.
    pub unwritable_output: Option<PathBuf>,
}

impl PreflightReport {
    /// Total number of problems.
    pub fn issue_count(&self) -> usize {
        self.missing.len()
            + self.unreadable.len()
            + self.invalid_format.len()
            + self.output_conflicts.len()
            + usize::from(self.unwritable_output.is_some())
    }

    pub fn is_clean(&self) -> bool {
        self.issue_count() == 0
    }

    /// `Ok` when clean, otherwise [`MicroBridgeError::PreflightFailed`].
    pub fn into_result(self) -> Result<(), MicroBridgeError> {
        if self.is_clean() {
            Ok(())
        } else {
            Err(MicroBridgeError::PreflightFailed {
                issue_count: self.issue_count(),
                report: self,
            })
        }
    }
}

impl fmt::Display for PreflightReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return writeln!(f, "Pre-flight checks passed.");
        }

        writeln!(f, "Pre-flight validation failed:")?;
        write_list(f, "Missing files", &self.missing)?;
        if let Some(dir) = &self.unwritable_output {
            writeln!(f)?;
            writeln!(f, "Output folder is not writable:")?;
            writeln!(f, "  {}", dir.display())?;
        }
        write_list(f, "Cannot read files", &self.unreadable)?;
        write_list(f, "Invalid file format", &self.invalid_format)?;
        write_list(f, "Output file conflicts", &self.output_conflicts)?;
        writeln!(f)?;
        writeln!(f, "Please fix these issues before starting conversion.")
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, title: &str, entries: &[String]) -> fmt::Result {
    if entries.is_empty() {
        return Ok(());
    }
    writeln!(f)?;
    writeln!(f, "{title} ({}):", entries.len())?;
    for entry in entries.iter().take(MAX_LISTED) {
        writeln!(f, "  - {entry}")?;
    }
    if entries.len() > MAX_LISTED {
        writeln!(f, "  - ... and {} more", entries.len() - MAX_LISTED)?;
    }
    Ok(())
}

/// Check `inputs` and the output locations `options` would give them.
///
/// Without an output directory, the directory of the first input is checked.
pub fn run_preflight(inputs: &[PathBuf], options: &ConvertOptions) -> PreflightReport {
    let mut report = PreflightReport::default();
    let mut outputs: HashMap<PathBuf, &Path> = HashMap::with_capacity(inputs.len());

    for input in inputs {
        let name = display_name(input);
        if !input.exists() {
            report.missing.push(name);
            continue;
        }

        let head = match read_head(input) {
            Ok(head) => head,
            Err(err) => {
                report.unreadable.push(format!("{name} ({err})"));
                continue;
            }
        };
        if let Some(problem) = format_mismatch(input, &head) {
            report.invalid_format.push(format!("{name} ({problem})"));
        }
    }

    for input in inputs {
        match outputs.entry(options.output_path_for(input)) {
            Entry::Occupied(first) => report.output_conflicts.push(format!(
                "{} and {} both write {}",
                first.get().display(),
                input.display(),
                first.key().display()
            )),
            Entry::Vacant(slot) => {
                slot.insert(input);
            }
        }
    }

    let dir = options.output_dir.clone().or_else(|| {
        inputs.first().map(|first| match first.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        })
    });
    if let Some(dir) = dir {
        if !is_writable_dir(&dir) {
            report.unwritable_output = Some(dir);
        }
    }

    report
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn read_head(path: &Path) -> std::io::Result<String> {
    let mut buf = Vec::with_capacity(SNIFF_LEN);
    File::open(path)?
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn format_mismatch(path: &Path, head: &str) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "ndpa" => {
            let start = head.trim_start_matches('\u{feff}').trim_start();
            (!start.starts_with(XML_DECLARATION)).then_some("not XML")
        }
        "csv" => head
            .contains(XML_DECLARATION)
            .then_some("appears to be XML, not CSV"),
        _ => None,
    }
}

/// Try creating a temporary file in the directory.
///
/// A directory that does not exist yet is judged by its nearest existing
/// ancestor, since the writer creates missing parents.
fn is_writable_dir(dir: &Path) -> bool {
    let existing = dir
        .ancestors()
        .map(|candidate| {
            if candidate.as_os_str().is_empty() {
                Path::new(".")
            } else {
                candidate
            }
        })
        .find(|candidate| candidate.exists());

    match existing {
        Some(candidate) => candidate.is_dir() && tempfile::tempfile_in(candidate).is_ok(),
        None => false,
    }
}
