//! Writing selection reports for the download step.
//!
//! A complete run is written to the requested path. An incomplete run is
//! still written, but to `<path>.ERROR`, so the pipeline can inspect the
//! partial selection without mistaking it for a usable one.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use thiserror::Error;

use crate::selection::{SelectionOutcome, SelectionReport};

/// Suffix appended to the output path for incomplete runs.
pub const ERROR_SUFFIX: &str = ".ERROR";

/// Errors that can occur while writing a report.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Failed to serialize the report.
    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    /// The serialized report is not valid UTF-8.
    #[error("Report is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// Failed to write the report file.
    #[error("Failed to write {path}: {source}")]
    WriteFailed { path: PathBuf, source: io::Error },
}

/// Which artifact a report was written as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// The run met its coverage goals.
    Selection,
    /// The run was incomplete.
    Error,
}

/// Where a report ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenArtifact {
    pub path: PathBuf,
    pub kind: ArtifactKind,
}

/// Render a report as JSON with four-space indentation.
pub fn to_pretty_json(report: &SelectionReport) -> Result<String, OutputError> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    report.serialize(&mut serializer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Path of the error artifact for `path`.
pub fn error_artifact_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(ERROR_SUFFIX);
    PathBuf::from(name)
}

/// Write the outcome's report to `path`, or to the error artifact when the
/// run is incomplete.
///
/// With zero primary layers the error artifact keeps only the first
/// selection.
pub fn write_outcome(outcome: &SelectionOutcome, path: &Path) -> Result<WrittenArtifact, OutputError> {
    let (target, kind, report) = if outcome.is_complete() {
        (path.to_path_buf(), ArtifactKind::Selection, outcome.report.clone())
    } else {
        let mut report = outcome.report.clone();
        if outcome.coverage_count == 0 {
            report.selections.truncate(1);
        }
        (error_artifact_path(path), ArtifactKind::Error, report)
    };

    let json = to_pretty_json(&report)?;
    fs::write(&target, json).map_err(|source| OutputError::WriteFailed {
        path: target.clone(),
        source,
    })?;

    match kind {
        ArtifactKind::Selection => tracing::info!(
            path = %target.display(),
            selections = report.selections.len(),
            "Wrote selection report"
        ),
        ArtifactKind::Error => tracing::warn!(
            path = %target.display(),
            selections = report.selections.len(),
            "Coverage incomplete, wrote error report"
        ),
    }

    Ok(WrittenArtifact { path: target, kind })
}
