//! Batch conversion over many input files.
//!
//! Files are converted independently: one failure never stops the others.
//! Cancellation is checked before each file starts, so the file in flight
//! always finishes.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::conversion::{convert_file, ConversionResult, ConvertOptions, LogSink, MemorySink};
use crate::error::MicroBridgeError;

/// Extensions picked up when an input path is a directory.
pub const DISCOVERED_EXTENSIONS: &[&str] = &["ndpa", "csv"];

/// Options for a batch run.
#[derive(Clone, Debug)]
pub struct BatchOptions {
    pub convert: ConvertOptions,
    /// Worker threads; `1` converts sequentially.
    pub jobs: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            convert: ConvertOptions::default(),
            jobs: 1,
        }
    }
}

/// The result for one file of a batch.
#[derive(Debug)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub result: ConversionResult,
}

/// Results of a batch run, in input order.
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// One entry per attempted file; files skipped by cancellation are absent.
    pub results: Vec<FileOutcome>,
    /// Number of files requested.
    pub total: usize,
    pub cancelled: bool,
}

impl BatchSummary {
    pub fn successful(&self) -> usize {
        self.results.iter().filter(|o| o.result.success).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.successful()
    }

    /// Turn any failure into a [`MicroBridgeError::BatchFailed`].
    pub fn into_result(self) -> Result<Self, MicroBridgeError> {
        match self.failed() {
            0 => Ok(self),
            failed => Err(MicroBridgeError::BatchFailed {
                failed,
                total: self.total,
            }),
        }
    }
}

/// Convert every input, logging progress to `sink`.
///
/// Setting `cancel` stops the batch before the next file starts.
pub fn convert_batch(
    inputs: &[PathBuf],
    options: &BatchOptions,
    sink: &dyn LogSink,
    cancel: &AtomicBool,
) -> BatchSummary {
    let total = inputs.len();

    let results = if options.jobs > 1 && total > 1 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(options.jobs)
            .build()
        {
            Ok(pool) => pool.install(|| convert_parallel(inputs, &options.convert, sink, cancel)),
            Err(err) => {
                sink.append(&format!(
                    "Warning: could not start {} worker threads ({err}); converting sequentially",
                    options.jobs
                ));
                convert_sequential(inputs, &options.convert, sink, cancel)
            }
        }
    } else {
        convert_sequential(inputs, &options.convert, sink, cancel)
    };

    let summary = BatchSummary {
        cancelled: results.len() < total,
        results,
        total,
    };

    sink.append("");
    if summary.cancelled {
        sink.append(&format!(
            "Conversion stopped: {}/{} files converted before cancellation",
            summary.successful(),
            total
        ));
    } else {
        sink.append(&format!(
            "Conversion complete: {}/{} files successful",
            summary.successful(),
            total
        ));
    }
    summary
}

fn convert_sequential(
    inputs: &[PathBuf],
    options: &ConvertOptions,
    sink: &dyn LogSink,
    cancel: &AtomicBool,
) -> Vec<FileOutcome> {
    let total = inputs.len();
    let mut results = Vec::with_capacity(total);

    for (i, input) in inputs.iter().enumerate() {
        if cancel.load(Ordering::SeqCst) {
            sink.append("Conversion cancelled by user");
            break;
        }
        sink.append(&progress_line(i, total, input));
        let result = convert_file(input, None, options, sink);
        results.push(FileOutcome {
            input: input.clone(),
            result,
        });
    }

    results
}

/// Lines of each file are buffered and flushed as one block so that
/// concurrent files do not interleave in the sink.
fn convert_parallel(
    inputs: &[PathBuf],
    options: &ConvertOptions,
    sink: &dyn LogSink,
    cancel: &AtomicBool,
) -> Vec<FileOutcome> {
    let total = inputs.len();

    let outcomes: Vec<Option<FileOutcome>> = inputs
        .par_iter()
        .enumerate()
        .map(|(i, input)| {
            if cancel.load(Ordering::SeqCst) {
                return None;
            }
            let buffer = MemorySink::new();
            buffer.append(&progress_line(i, total, input));
            let result = convert_file(input, None, options, &buffer);
            for line in buffer.take() {
                sink.append(&line);
            }
            Some(FileOutcome {
                input: input.clone(),
                result,
            })
        })
        .collect();

    if outcomes.iter().any(Option::is_none) {
        sink.append("Conversion cancelled by user");
    }
    outcomes.into_iter().flatten().collect()
}

fn progress_line(index: usize, total: usize, input: &Path) -> String {
    let name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());
    format!("[{} / {}] Processing: {}", index + 1, total, name)
}

/// Expand directories into the convertible files they contain.
///
/// Files are kept as given. Directories contribute their `.ndpa` and `.csv`
/// files, sorted by path; subdirectories are only walked when `recursive`.
pub fn discover_inputs(
    paths: &[PathBuf],
    recursive: bool,
) -> Result<Vec<PathBuf>, MicroBridgeError> {
    let mut inputs = Vec::new();

    for path in paths {
        if !path.is_dir() {
            inputs.push(path.clone());
            continue;
        }

        let max_depth = if recursive { usize::MAX } else { 1 };
        let mut found = Vec::new();
        for entry in WalkDir::new(path).max_depth(max_depth) {
            let entry = entry.map_err(|err| {
                let entry_path = err.path().unwrap_or(path).to_path_buf();
                MicroBridgeError::from_io(&entry_path, "reading", io::Error::from(err))
            })?;
            if entry.file_type().is_file() && has_discovered_extension(entry.path()) {
                found.push(entry.into_path());
            }
        }
        found.sort();
        inputs.extend(found);
    }

    Ok(inputs)
}

fn has_discovered_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            DISCOVERED_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}
