//! # Per-vessel edge artifacts and their aggregation
//!
//! Transit edges are never accumulated in memory across vessels. Each vessel's
//! edges are appended, as header-less CSV rows, to one scratch file named after
//! the zero-padded MMSI (`{dir}/316000001`). Since a vessel batch is processed by a
//! single worker, no two workers ever write the same file.
//!
//! [`aggregate_output`] then concatenates every artifact, in file name order, into
//! one CSV file with a header row, dropping the rows rejected by any of the
//! caller's [`EdgeFilter`]s.
use std::fs::{self, OpenOptions};

use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, warn};

use crate::{constants::Mmsi, network_graph::transit::TransitEdge, AisGraphError};

/// Row-exclusion predicate: an edge is dropped when any filter returns `true`.
pub type EdgeFilter = Box<dyn Fn(&TransitEdge) -> bool + Send + Sync>;

/// Writer of per-vessel artifacts into a scratch directory.
#[derive(Debug, Clone)]
pub struct EdgeSink {
    dir: Utf8PathBuf,
}

impl EdgeSink {
    /// Use `dir` as the scratch directory, creating it if needed.
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Result<Self, AisGraphError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(EdgeSink { dir })
    }

    #[inline]
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Path of the artifact of `mmsi`.
    pub fn artifact_path(&self, mmsi: Mmsi) -> Utf8PathBuf {
        self.dir.join(format!("{mmsi:09}"))
    }

    /// Append `edges` to the artifact of `mmsi`.
    ///
    /// Return
    /// ----------
    /// * The number of rows written.
    pub fn append(&self, mmsi: Mmsi, edges: &[TransitEdge]) -> Result<usize, AisGraphError> {
        if edges.is_empty() {
            return Ok(0);
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.artifact_path(mmsi))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        for edge in edges {
            writer.serialize(edge)?;
        }
        writer.flush()?;
        Ok(edges.len())
    }
}

/// Outcome of [`aggregate_output`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateSummary {
    pub artifacts: usize,
    pub rows_written: usize,
    pub rows_filtered: usize,
}

/// Artifacts of `tmp_dir`: files whose name is made of ASCII digits only, sorted.
fn list_artifacts(tmp_dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>, AisGraphError> {
    let mut artifacts = Vec::new();
    for entry in tmp_dir.read_dir_utf8()? {
        let entry = entry?;
        let name = entry.file_name();
        let numeric = !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit());
        if numeric && entry.file_type()?.is_file() {
            artifacts.push(entry.path().to_path_buf());
        }
    }
    artifacts.sort();
    Ok(artifacts)
}

/// Write a CSV file holding only the header row.
pub fn write_empty_output(outputfile: &Utf8Path) -> Result<(), AisGraphError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(outputfile)?;
    writer.write_record(TransitEdge::FIELDS)?;
    writer.flush()?;
    Ok(())
}

/// Concatenate every per-vessel artifact of `tmp_dir` into `outputfile`.
///
/// Arguments
/// -----------------
/// * `outputfile`: destination CSV file; its directory must exist.
/// * `tmp_dir`: scratch directory filled by [`EdgeSink::append`].
/// * `filters`: a row is dropped when **any** filter returns `true`.
/// * `remove_intermediates`: delete each artifact once it has been copied.
///
/// Return
/// ----------
/// * An [`AggregateSummary`], or
///   * [`AisGraphError::NoIntermediateArtifacts`] when `tmp_dir` holds no artifact,
///   * CSV and I/O errors.
pub fn aggregate_output(
    outputfile: &Utf8Path,
    tmp_dir: &Utf8Path,
    filters: &[EdgeFilter],
    remove_intermediates: bool,
) -> Result<AggregateSummary, AisGraphError> {
    let artifacts = list_artifacts(tmp_dir)?;
    if artifacts.is_empty() {
        return Err(AisGraphError::NoIntermediateArtifacts(tmp_dir.to_string()));
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(outputfile)?;
    writer.write_record(TransitEdge::FIELDS)?;

    let mut summary = AggregateSummary {
        artifacts: artifacts.len(),
        ..Default::default()
    };

    for artifact in &artifacts {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(artifact)?;
        let mut kept = 0usize;
        for row in reader.deserialize::<TransitEdge>() {
            let edge = row?;
            if filters.iter().any(|f| f(&edge)) {
                summary.rows_filtered += 1;
            } else {
                writer.serialize(&edge)?;
                kept += 1;
            }
        }
        if kept == 0 {
            warn!("no rows kept from {artifact}");
        }
        summary.rows_written += kept;

        if remove_intermediates {
            fs::remove_file(artifact)?;
        }
    }
    writer.flush()?;

    debug!(
        "aggregated {} artifact(s) into {outputfile}: {} row(s) written, {} filtered",
        summary.artifacts, summary.rows_written, summary.rows_filtered
    );
    Ok(summary)
}
