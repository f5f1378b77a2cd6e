//! # Vessel network graph
//!
//! Turn per-vessel batches of position reports into a table of zone-to-zone
//! [`TransitEdge`]s.
//!
//! Pipeline
//! -----------------
//! For each [`VesselBatch`], one track at a time:
//!
//! 1. **Track generation** – [`VesselBatch::to_track`].
//! 2. **Reconstruction** – [`encode`](crate::denoising_encoder::encode) into labelled pathways.
//! 3. **Segmentation** – split on time gaps and longitude jumps.
//! 4. **Interpolation** (optional) – resample on a fixed step.
//! 5. **Geofencing** – attach `in_zone` with the shared [`Domain`].
//! 6. **Extraction** – [`transit_edges`], appended to the vessel artifact.
//!
//! After all batches, [`aggregate_output`] concatenates the artifacts into one CSV.
//!
//! Concurrency
//! -----------------
//! With `workers == 1` the batches are processed sequentially. Otherwise a fixed
//! `rayon` pool of `workers` threads takes one batch per task; the [`Domain`] is
//! shared read-only and every task writes only its own vessel artifact, so results
//! are collected in completion order.
//!
//! Failure isolation
//! -----------------
//! A failing batch only aborts that vessel: its partial artifact is removed and the
//! error is reported in [`GraphReport::failures`]. The run always attempts every batch.
//!
//! ### Progress UI (feature: `progress`)
//! When compiled with the `progress` feature, [`NetworkGraph::run`] renders a live
//! `indicatif` bar with the last and average per-vessel processing time.
//!
//! See also
//! ------------
//! * [`GraphParams`] – Run configuration and its builder.
//! * [`EdgeFilter`] – Row-exclusion predicates applied at aggregation.
use std::cmp::Ordering::Greater;
use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use log::{info, warn};
use rayon::iter::{ParallelBridge, ParallelIterator};

use crate::{
    constants::{Degree, EpochSeconds, Mmsi, LONGITUDE_JUMP_TOLERANCE},
    denoising_encoder::{self, EncoderParams},
    domain::Domain,
    track::{
        segmentation::SegmentationRule, stream::TrackStream, vessel_batch::VesselBatch, Track,
    },
    AisGraphError,
};

pub mod edge_sink;
#[cfg(feature = "progress")]
pub mod progress_bar;
pub mod transit;

pub use edge_sink::{aggregate_output, AggregateSummary, EdgeFilter, EdgeSink};
pub use transit::{hourly_transit_rate, transit_edges, TransitEdge};

#[cfg(feature = "progress")]
use progress_bar::VesselProgress;

/// One week, in seconds.
const DEFAULT_MAX_TIME_GAP: EpochSeconds = 7 * 24 * 3600;

/// Configuration of a network graph run.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphParams {
    pub encoder: EncoderParams,
    /// Time gap (seconds) at which a track is split.
    pub max_time_gap: EpochSeconds,
    /// Longitude change (degrees) above which a track is split.
    pub lon_jump_tolerance: Degree,
    /// Optional interpolation step (seconds).
    pub interp_step: Option<EpochSeconds>,
    /// Number of worker threads; `1` runs sequentially.
    pub workers: usize,
    /// Directory for per-vessel artifacts; a temporary directory when `None`.
    pub scratch_dir: Option<Utf8PathBuf>,
    /// Keep the per-vessel artifacts after aggregation (only meaningful with `scratch_dir`).
    pub keep_intermediates: bool,
}

impl GraphParams {
    pub fn builder() -> GraphParamsBuilder {
        GraphParamsBuilder::new()
    }

    /// Segmentation rule derived from `max_time_gap` and `lon_jump_tolerance`.
    pub fn segmentation_rule(&self) -> SegmentationRule {
        SegmentationRule {
            max_delta: self.max_time_gap,
            lon_jump_tolerance: self.lon_jump_tolerance,
        }
    }
}

impl Default for GraphParams {
    fn default() -> Self {
        GraphParams {
            encoder: EncoderParams::default(),
            max_time_gap: DEFAULT_MAX_TIME_GAP,
            lon_jump_tolerance: LONGITUDE_JUMP_TOLERANCE,
            interp_step: None,
            workers: 1,
            scratch_dir: None,
            keep_intermediates: false,
        }
    }
}

/// Builder for [`GraphParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct GraphParamsBuilder {
    params: GraphParams,
}

impl GraphParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: GraphParams::default(),
        }
    }

    pub fn encoder(mut self, v: EncoderParams) -> Self {
        self.params.encoder = v;
        self
    }
    pub fn max_time_gap(mut self, v: EpochSeconds) -> Self {
        self.params.max_time_gap = v;
        self
    }
    pub fn lon_jump_tolerance(mut self, v: Degree) -> Self {
        self.params.lon_jump_tolerance = v;
        self
    }
    pub fn interp_step(mut self, v: Option<EpochSeconds>) -> Self {
        self.params.interp_step = v;
        self
    }
    pub fn workers(mut self, v: usize) -> Self {
        self.params.workers = v;
        self
    }
    pub fn scratch_dir(mut self, v: impl Into<Utf8PathBuf>) -> Self {
        self.params.scratch_dir = Some(v.into());
        self
    }
    pub fn keep_intermediates(mut self, v: bool) -> Self {
        self.params.keep_intermediates = v;
        self
    }

    /// Validate and produce the parameters.
    ///
    /// Validation rules
    /// -----------------
    /// * `max_time_gap > 0`.
    /// * `0 < lon_jump_tolerance <= 360`.
    /// * `interp_step > 0` when set.
    /// * `workers >= 1`.
    pub fn build(self) -> Result<GraphParams, AisGraphError> {
        let p = &self.params;
        if p.max_time_gap <= 0 {
            return Err(AisGraphError::InvalidParameter(
                "max_time_gap must be > 0".into(),
            ));
        }
        if p.lon_jump_tolerance.partial_cmp(&0.0) != Some(Greater) || p.lon_jump_tolerance > 360.0
        {
            return Err(AisGraphError::InvalidParameter(
                "lon_jump_tolerance must be in (0, 360]".into(),
            ));
        }
        if matches!(p.interp_step, Some(step) if step <= 0) {
            return Err(AisGraphError::InvalidParameter(
                "interp_step must be > 0".into(),
            ));
        }
        if p.workers == 0 {
            return Err(AisGraphError::InvalidParameter(
                "workers must be >= 1".into(),
            ));
        }
        Ok(self.params)
    }
}

impl fmt::Display for GraphParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            const PARAM_COL: usize = 40;
            writeln!(f, "Network Graph Parameters")?;
            writeln!(f, "------------------------")?;

            macro_rules! line {
                ($fmt:expr, $val:expr, $comment:expr) => {{
                    let s = format!($fmt, $val);
                    let pad = if s.len() < PARAM_COL {
                        " ".repeat(PARAM_COL - s.len())
                    } else {
                        " ".to_string()
                    };
                    writeln!(f, "  {}{}# {}", s, pad, $comment)
                }};
            }

            writeln!(f, "{:#}", self.encoder)?;
            writeln!(f, "[Segmentation]")?;
            line!(
                "max_time_gap       = {} s",
                self.max_time_gap,
                "Gap splitting a track"
            )?;
            line!(
                "lon_jump_tolerance = {:.1}°",
                self.lon_jump_tolerance,
                "Longitude jump splitting a track"
            )?;
            line!(
                "interp_step        = {}",
                self.interp_step
                    .map_or_else(|| "off".to_string(), |s| format!("{s} s")),
                "Interpolation step"
            )?;
            writeln!(f, "[Execution]")?;
            line!("workers            = {}", self.workers, "Worker threads")?;
            line!(
                "scratch_dir        = {}",
                self.scratch_dir
                    .as_ref()
                    .map_or("<temporary>", |d| d.as_str()),
                "Per-vessel artifacts"
            )?;
            line!(
                "keep_intermediates = {}",
                self.keep_intermediates,
                "Keep artifacts after aggregation"
            )
        } else {
            write!(
                f,
                "{}, max_time_gap={}s, lon_jump_tolerance={:.1}, interp_step={:?}, workers={}",
                self.encoder,
                self.max_time_gap,
                self.lon_jump_tolerance,
                self.interp_step,
                self.workers
            )
        }
    }
}

/// Position counts of the tracks that reached extraction.
///
/// Quantiles are read by nearest rank on the sorted counts, at index
/// `round(q × (N-1))`.
///
/// Display
/// -----------------
/// * `format!("{}", stats)` – `12 tracks, 340 positions (min 2, p25 4, median 8, p95 15, max 20)`
/// * `format!("{:#}", stats)` – one aligned line per statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackLengthStats {
    pub tracks: usize,
    pub positions: usize,
    pub min: usize,
    pub p25: usize,
    pub median: usize,
    pub p95: usize,
    pub max: usize,
}

/// Nearest-rank quantile `q` of the non-empty ascending slice `sorted`.
fn nearest_rank(sorted: &[usize], q: f64) -> usize {
    let last = sorted.len() - 1;
    let rank = (q * last as f64).round() as usize;
    sorted[rank.min(last)]
}

impl TrackLengthStats {
    /// Statistics of the track lengths, `None` when there is none.
    pub fn from_lengths(lengths: impl IntoIterator<Item = usize>) -> Option<Self> {
        let mut sorted: Vec<usize> = lengths.into_iter().collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_unstable();
        Some(TrackLengthStats {
            tracks: sorted.len(),
            positions: sorted.iter().sum(),
            min: sorted[0],
            p25: nearest_rank(&sorted, 0.25),
            median: nearest_rank(&sorted, 0.5),
            p95: nearest_rank(&sorted, 0.95),
            max: sorted[sorted.len() - 1],
        })
    }

    /// Mean number of positions per track.
    pub fn mean(&self) -> f64 {
        self.positions as f64 / self.tracks as f64
    }
}

impl fmt::Display for TrackLengthStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Track lengths ({} tracks)", self.tracks)?;
            for (name, value) in [
                ("min", self.min),
                ("p25", self.p25),
                ("median", self.median),
                ("p95", self.p95),
                ("max", self.max),
            ] {
                writeln!(f, "  {name:<7}{value:>8}")?;
            }
            write!(f, "  {:<7}{:>8.1}", "mean", self.mean())
        } else {
            write!(
                f,
                "{} tracks, {} positions (min {}, p25 {}, median {}, p95 {}, max {})",
                self.tracks, self.positions, self.min, self.p25, self.median, self.p95, self.max
            )
        }
    }
}

/// Outcome of a run.
#[derive(Debug, Default)]
pub struct GraphReport {
    /// Batches processed without error.
    pub vessels_processed: usize,
    /// Reconstructed, segmented tracks that reached extraction.
    pub tracks: usize,
    /// Edges written to the per-vessel artifacts.
    pub edges_written: usize,
    /// Edges whose range holds a single position (sentinel statistics).
    pub single_position_edges: usize,
    /// Vessels reconstructed into more pathways than the fragmentation limit.
    pub fragmented_vessels: usize,
    /// Failed batches with their error.
    pub failures: Vec<(Mmsi, AisGraphError)>,
    pub track_lengths: Option<TrackLengthStats>,
    /// Aggregation outcome, when aggregation ran.
    pub aggregate: Option<AggregateSummary>,
}

impl GraphReport {
    /// Number of data-quality warnings raised by the run.
    pub fn warnings(&self) -> usize {
        self.single_position_edges + self.fragmented_vessels
    }
}

impl fmt::Display for GraphReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} vessel(s) processed, {} failed, {} track(s), {} edge(s), {} warning(s)",
            self.vessels_processed,
            self.failures.len(),
            self.tracks,
            self.edges_written,
            self.warnings()
        )?;
        if f.alternate() {
            writeln!(f)?;
            write!(
                f,
                "  single-position edges: {}, fragmented vessels: {}",
                self.single_position_edges, self.fragmented_vessels
            )?;
            if let Some(stats) = &self.track_lengths {
                write!(f, "\n{stats:#}")?;
            }
            for (mmsi, err) in &self.failures {
                write!(f, "\n  mmsi={mmsi}: {err}")?;
            }
        }
        Ok(())
    }
}

/// Per-batch counters, merged into the [`GraphReport`].
#[derive(Debug, Default)]
struct VesselStats {
    edges: usize,
    single_position_edges: usize,
    fragmented: bool,
    track_lengths: Vec<usize>,
}

/// Network graph builder over one [`Domain`].
#[derive(Debug, Clone)]
pub struct NetworkGraph {
    domain: Domain,
    params: GraphParams,
}

impl NetworkGraph {
    pub fn new(domain: Domain, params: GraphParams) -> Self {
        NetworkGraph { domain, params }
    }

    #[inline]
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    #[inline]
    pub fn params(&self) -> &GraphParams {
        &self.params
    }

    /// Lazy pipeline of the geofenced tracks of one batch.
    ///
    /// Return
    /// ----------
    /// * The tracks ready for extraction, or the track generation error.
    pub fn fenced_tracks(
        &self,
        batch: &VesselBatch,
    ) -> Result<impl Iterator<Item = Track> + '_, AisGraphError> {
        let pathways = denoising_encoder::encode(&batch.to_track()?, &self.params.encoder);
        Ok(self.stages(pathways))
    }

    /// Segmentation, interpolation and geofencing of reconstructed pathways.
    fn stages(&self, pathways: Vec<Track>) -> impl Iterator<Item = Track> + '_ {
        pathways
            .into_iter()
            .split_timedelta(self.params.segmentation_rule())
            .interpolate(self.params.interp_step)
            .fence(&self.domain)
    }

    /// All transit edges of one batch, in memory.
    pub fn transits(&self, batch: &VesselBatch) -> Result<Vec<TransitEdge>, AisGraphError> {
        let mut edges = Vec::new();
        for track in self.fenced_tracks(batch)? {
            edges.extend(transit_edges(&track)?);
        }
        Ok(edges)
    }

    fn process_batch(
        &self,
        batch: &VesselBatch,
        sink: &EdgeSink,
    ) -> Result<VesselStats, AisGraphError> {
        let pathways = denoising_encoder::encode(&batch.to_track()?, &self.params.encoder);
        let mut stats = VesselStats {
            fragmented: denoising_encoder::is_fragmented(&pathways),
            ..Default::default()
        };
        for track in self.stages(pathways) {
            let edges = transit_edges(&track)?;
            stats.track_lengths.push(track.len());
            stats.single_position_edges += edges
                .iter()
                .filter(|e| e.velocity_knots_avg.is_none())
                .count();
            stats.edges += sink.append(track.mmsi(), &edges)?;
        }
        Ok(stats)
    }

    fn isolate(&self, batch: &VesselBatch, sink: &EdgeSink) -> Result<VesselStats, AisGraphError> {
        let result = self.process_batch(batch, sink);
        if result.is_err() {
            let partial = sink.artifact_path(batch.mmsi);
            if partial.exists() {
                if let Err(err) = std::fs::remove_file(&partial) {
                    warn!(
                        "mmsi={}: cannot remove partial artifact {partial}: {err}",
                        batch.mmsi
                    );
                }
            }
        }
        result
    }

    /// Process every batch into per-vessel artifacts of `sink`.
    ///
    /// Arguments
    /// -----------------
    /// * `batches`: per-vessel batches, in any order.
    /// * `sink`: artifact writer.
    ///
    /// Return
    /// ----------
    /// * A [`GraphReport`] (without aggregation), or
    ///   [`AisGraphError::WorkerPool`] if the thread pool cannot be built.
    ///   Batch errors never abort the run.
    pub fn process<I>(&self, batches: I, sink: &EdgeSink) -> Result<GraphReport, AisGraphError>
    where
        I: IntoIterator<Item = VesselBatch>,
        I::IntoIter: Send,
    {
        let batches = batches.into_iter();

        #[cfg(feature = "progress")]
        let progress = {
            let (lo, hi) = batches.size_hint();
            VesselProgress::new(hi.filter(|hi| *hi == lo))
        };

        let handle = |batch: VesselBatch| {
            let outcome = self.isolate(&batch, sink);
            #[cfg(feature = "progress")]
            progress.tick();
            (batch.mmsi, outcome)
        };

        let outcomes: Vec<(Mmsi, Result<VesselStats, AisGraphError>)> = if self.params.workers == 1
        {
            batches.map(handle).collect()
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.params.workers)
                .build()?;
            pool.install(|| batches.par_bridge().map(handle).collect())
        };

        #[cfg(feature = "progress")]
        progress.finish();

        let mut report = GraphReport::default();
        let mut lengths = Vec::new();
        for (mmsi, outcome) in outcomes {
            match outcome {
                Ok(stats) => {
                    report.vessels_processed += 1;
                    report.tracks += stats.track_lengths.len();
                    report.edges_written += stats.edges;
                    report.single_position_edges += stats.single_position_edges;
                    report.fragmented_vessels += usize::from(stats.fragmented);
                    lengths.extend(stats.track_lengths);
                }
                Err(err) => {
                    warn!("mmsi={mmsi}: batch skipped: {err}");
                    report.failures.push((mmsi, err));
                }
            }
        }
        report.track_lengths = TrackLengthStats::from_lengths(lengths);
        Ok(report)
    }

    /// Process every batch and aggregate the edges into `outputfile`.
    ///
    /// Arguments
    /// -----------------
    /// * `batches`: per-vessel batches, in any order.
    /// * `outputfile`: destination CSV; its directory must exist.
    /// * `filters`: row-exclusion predicates (a row is dropped if any returns `true`).
    ///
    /// Return
    /// ----------
    /// * The [`GraphReport`] including the aggregation summary. When no edge was
    ///   produced, `outputfile` only holds the header row.
    ///
    /// Notes
    /// ----------
    /// * Artifacts already present in a configured `scratch_dir` are aggregated too.
    pub fn run<I>(
        &self,
        batches: I,
        outputfile: &Utf8Path,
        filters: &[EdgeFilter],
    ) -> Result<GraphReport, AisGraphError>
    where
        I: IntoIterator<Item = VesselBatch>,
        I::IntoIter: Send,
    {
        let mut _tmp_guard = None;
        let dir = match &self.params.scratch_dir {
            Some(dir) => dir.clone(),
            None => {
                let tmp = tempfile::TempDir::new()?;
                let dir = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).map_err(|p| {
                    AisGraphError::Utf8PathError(format!("non UTF-8 scratch path {}", p.display()))
                })?;
                _tmp_guard = Some(tmp);
                dir
            }
        };
        let sink = EdgeSink::new(dir)?;

        let mut report = self.process(batches, &sink)?;

        if report.edges_written == 0 {
            warn!("no transit edge produced, writing an empty table to {outputfile}");
            edge_sink::write_empty_output(outputfile)?;
        } else {
            report.aggregate = Some(aggregate_output(
                outputfile,
                sink.dir(),
                filters,
                !self.params.keep_intermediates,
            )?);
        }

        info!("network graph '{}': {report}", self.domain.name());
        Ok(report)
    }
}
