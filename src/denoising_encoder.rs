//! # Trajectory reconstruction (denoising encoder)
//!
//! Raw AIS streams keyed by one MMSI frequently interleave several physical vessels
//! (shared or spoofed identifiers) and spurious positions. The encoder collapses such
//! a stream into a minimal set of internally consistent **pathways**.
//!
//! Algorithm
//! -----------------
//! 1. Cut the track into **chunks** before every position whose implied speed from the
//!    previous one exceeds `speed_threshold`, or whose distance exceeds
//!    `distance_threshold`.
//! 2. Seed the pathway set with the first chunk.
//! 3. For every following chunk, score each pathway with [`continuity_score`] between
//!    the pathway's last position and the chunk's first position. The best pathway
//!    (ties: the most recently created) receives the chunk if its score reaches
//!    `minscore`; otherwise the chunk opens a new pathway.
//! 4. Every pathway is emitted as a [`Track`] labelled with its creation index.
//!
//! The sum of pathway lengths always equals the input length, and the partition is
//! a deterministic function of the input and parameters.
//!
//! Single-position tracks skip step 1 entirely and yield one pathway.
//!
//! See also
//! ------------
//! * [`EncoderParams`] – Thresholds and their validation.
//! * [`TrackStream::encode`](crate::track::stream::TrackStream::encode) – Lazy adapter over many tracks.
use std::cmp::Ordering::{Equal, Greater};
use std::fmt;

use log::warn;

use crate::{
    constants::{EpochSeconds, Knot, Meter, MAX_PATHWAYS_WARNING},
    geodesy::{consecutive_distances, consecutive_seconds, distance, knots},
    track::Track,
    AisGraphError,
};

/// Thresholds driving the denoising encoder.
///
/// Fields
/// -----------------
/// * `distance_threshold` – Meters between consecutive positions above which a new chunk starts.
/// * `speed_threshold` – Implied speed (knots) above which a new chunk starts.
/// * `minscore` – Smallest continuity score for which a chunk joins an existing pathway,
///   in `(0, 1]`, default `1e-6`. A configured value of `0` is raised to the smallest
///   positive `f64`, which makes every chunk join its best pathway.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncoderParams {
    pub distance_threshold: Meter,
    pub speed_threshold: Knot,
    pub minscore: f64,
}

impl EncoderParams {
    pub fn builder() -> EncoderParamsBuilder {
        EncoderParamsBuilder::new()
    }
}

impl Default for EncoderParams {
    fn default() -> Self {
        EncoderParams {
            distance_threshold: 200_000.0,
            speed_threshold: 50.0,
            minscore: 1e-6,
        }
    }
}

/// Builder for [`EncoderParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct EncoderParamsBuilder {
    params: EncoderParams,
}

impl EncoderParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: EncoderParams::default(),
        }
    }

    pub fn distance_threshold(mut self, v: Meter) -> Self {
        self.params.distance_threshold = v;
        self
    }
    pub fn speed_threshold(mut self, v: Knot) -> Self {
        self.params.speed_threshold = v;
        self
    }
    pub fn minscore(mut self, v: f64) -> Self {
        self.params.minscore = v;
        self
    }

    #[inline]
    fn gt0(x: f64) -> bool {
        x.partial_cmp(&0.0) == Some(Greater)
    }

    /// Validate and produce the parameters.
    ///
    /// Validation rules
    /// -----------------
    /// * `distance_threshold > 0`, `speed_threshold > 0`.
    /// * `0 <= minscore <= 1`; `0` is raised to `f64::MIN_POSITIVE`.
    ///
    /// Returns
    /// -----------------
    /// * `Err(AisGraphError::InvalidParameter)` when a rule fails (NaN always fails).
    pub fn build(self) -> Result<EncoderParams, AisGraphError> {
        let mut p = self.params;
        if !Self::gt0(p.distance_threshold) {
            return Err(AisGraphError::InvalidParameter(
                "distance_threshold must be > 0".into(),
            ));
        }
        if !Self::gt0(p.speed_threshold) {
            return Err(AisGraphError::InvalidParameter(
                "speed_threshold must be > 0".into(),
            ));
        }
        match p.minscore.partial_cmp(&0.0) {
            Some(Equal) => p.minscore = f64::MIN_POSITIVE,
            Some(Greater) if p.minscore <= 1.0 => {}
            _ => {
                return Err(AisGraphError::InvalidParameter(
                    "minscore must be in [0, 1]".into(),
                ))
            }
        }
        Ok(p)
    }
}

impl fmt::Display for EncoderParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "[Denoising encoder]")?;
            writeln!(
                f,
                "  distance_threshold = {:.1} m",
                self.distance_threshold
            )?;
            writeln!(f, "  speed_threshold    = {:.2} kn", self.speed_threshold)?;
            write!(f, "  minscore           = {:e}", self.minscore)
        } else {
            write!(
                f,
                "distance_threshold={:.1}m, speed_threshold={:.2}kn, minscore={:e}",
                self.distance_threshold, self.speed_threshold, self.minscore
            )
        }
    }
}

/// Position and time at one end of a pathway or chunk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub lon: f64,
    pub lat: f64,
    pub time: EpochSeconds,
}

impl Anchor {
    fn at(track: &Track, index: usize) -> Self {
        Anchor {
            lon: track.lon()[index],
            lat: track.lat()[index],
            time: track.time()[index],
        }
    }

    fn last(track: &Track) -> Self {
        Anchor::at(track, track.len() - 1)
    }
}

/// Continuity score between the end of a pathway and the start of a chunk.
///
/// With `d` the great-circle distance and `v` the implied speed between both anchors
/// (elapsed time floored at one second):
///
/// ```text
/// score = (1 - min(d / distance_threshold, 1)) · (1 - min(v / speed_threshold, 1))
/// ```
///
/// raised to `f64::MIN_POSITIVE` so that the score stays in `(0, 1]`. It is `1` for a
/// seamless continuation and decreases monotonically as either quantity approaches
/// its threshold.
pub fn continuity_score(end: Anchor, start: Anchor, params: &EncoderParams) -> f64 {
    let meters = distance(end.lon, end.lat, start.lon, start.lat);
    let speed = knots(meters, (start.time - end.time).abs() as f64);

    let d = (meters / params.distance_threshold).min(1.0);
    let v = (speed / params.speed_threshold).min(1.0);
    ((1.0 - d) * (1.0 - v)).max(f64::MIN_POSITIVE)
}

/// Chunk boundaries of `track`: `0`, every index where the implied speed or
/// distance from the previous position exceeds its threshold, and `len`.
///
/// Return
/// ----------
/// * Strictly increasing indices; consecutive pairs delimit non-empty chunks.
pub fn chunk_boundaries(track: &Track, params: &EncoderParams) -> Vec<usize> {
    let n = track.len();
    let mut bounds = vec![0];
    if n > 1 {
        let meters = consecutive_distances(track, 0..n);
        let seconds = consecutive_seconds(track, 0..n);
        bounds.extend(
            meters
                .iter()
                .zip(&seconds)
                .enumerate()
                .filter(|(_, (m, s))| {
                    knots(**m, **s) > params.speed_threshold || **m > params.distance_threshold
                })
                .map(|(i, _)| i + 1),
        );
    }
    bounds.push(n);
    bounds
}

/// Index and score of the pathway that best continues into `head`.
///
/// Ties go to the most recently created pathway (highest index).
/// `pathways` must not be empty.
pub fn best_pathway(pathways: &[Track], head: Anchor, params: &EncoderParams) -> (usize, f64) {
    let mut best = 0usize;
    let mut best_score = f64::NEG_INFINITY;
    for (i, pathway) in pathways.iter().enumerate() {
        let score = continuity_score(Anchor::last(pathway), head, params);
        if score >= best_score {
            best = i;
            best_score = score;
        }
    }
    (best, best_score)
}

/// Split one vessel track into labelled pathways.
///
/// Arguments
/// -----------------
/// * `track`: one vessel track, sorted by time.
/// * `params`: encoder thresholds.
///
/// Return
/// ----------
/// * Pathways in creation order, labelled `0..n`. Their lengths sum to `track.len()`.
pub fn encode(track: &Track, params: &EncoderParams) -> Vec<Track> {
    if track.len() == 1 {
        return vec![track.clone().with_label(0)];
    }

    let bounds = chunk_boundaries(track, params);
    let mut pathways: Vec<Track> = vec![track.slice(bounds[0]..bounds[1])];
    let mut warned = false;

    for chunk in bounds[1..].windows(2) {
        let (start, end) = (chunk[0], chunk[1]);
        let head = Anchor::at(track, start);

        let (best, best_score) = best_pathway(&pathways, head, params);

        if best_score >= params.minscore {
            pathways[best].extend_from(track, start..end);
        } else {
            pathways.push(track.slice(start..end));
            if !warned && is_fragmented(&pathways) {
                warned = true;
                warn!(
                    "mmsi={}: more than {MAX_PATHWAYS_WARNING} pathways, input is heavily fragmented",
                    track.mmsi()
                );
            }
        }
    }

    pathways
        .into_iter()
        .enumerate()
        .map(|(label, p)| p.with_label(label as u32))
        .collect()
}

/// `true` when `pathways` outnumber the fragmentation warning limit.
#[inline]
pub fn is_fragmented(pathways: &[Track]) -> bool {
    pathways.len() > MAX_PATHWAYS_WARNING
}
