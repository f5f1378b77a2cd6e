//! # Track segmentation
//!
//! Splitting a [`Track`] into contiguous pieces, and row filters that do not
//! depend on the zone layer.
//!
//! ## Splitting rules
//! -----------------
//! [`split_by_time_gap`] cuts a track before every row `i` such that
//!
//! * `time[i] - time[i-1] >= max_delta` (a reporting gap), or
//! * `|lon[i] - lon[i-1]| > lon_jump_tolerance` (a longitude jump, typically an
//!   antimeridian crossing or a corrupted position).
//!
//! The pieces partition the input: concatenated in order they reproduce the
//! original track exactly.
//!
//! ## See also
//! ------------
//! * [`split_max_length`] – Cap the number of rows per piece.
//! * [`drop_low_speed`] – Remove rows where the vessel is idle.
use log::{debug, warn};

use crate::{
    constants::{Degree, EpochSeconds, Knot, LONGITUDE_JUMP_TOLERANCE},
    track::Track,
    AisGraphError,
};

/// Segmentation thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentationRule {
    /// A gap of at least this many seconds starts a new segment.
    pub max_delta: EpochSeconds,
    /// A longitude change strictly above this many degrees starts a new segment.
    pub lon_jump_tolerance: Degree,
}

impl SegmentationRule {
    pub fn new(max_delta: EpochSeconds) -> Result<Self, AisGraphError> {
        if max_delta <= 0 {
            return Err(AisGraphError::InvalidParameter(format!(
                "maximum time gap must be > 0 seconds, got {max_delta}"
            )));
        }
        Ok(SegmentationRule {
            max_delta,
            lon_jump_tolerance: LONGITUDE_JUMP_TOLERANCE,
        })
    }

    pub fn with_lon_jump_tolerance(mut self, tolerance: Degree) -> Result<Self, AisGraphError> {
        if !(tolerance > 0.0 && tolerance <= 360.0) {
            return Err(AisGraphError::InvalidParameter(format!(
                "longitude jump tolerance must be in (0, 360], got {tolerance}"
            )));
        }
        self.lon_jump_tolerance = tolerance;
        Ok(self)
    }
}

/// Split `track` on time gaps of at least `max_delta` seconds and on longitude jumps
/// above [`LONGITUDE_JUMP_TOLERANCE`].
///
/// See [`split_with_rule`] for a configurable longitude tolerance.
pub fn split_by_time_gap(track: &Track, max_delta: EpochSeconds) -> Vec<Track> {
    split_with_rule(
        track,
        SegmentationRule {
            max_delta,
            lon_jump_tolerance: LONGITUDE_JUMP_TOLERANCE,
        },
    )
}

/// Split `track` according to `rule`.
///
/// Arguments
/// -----------------
/// * `track`: input track, at least one row.
/// * `rule`: gap and longitude-jump thresholds.
///
/// Return
/// ----------
/// * Contiguous, non-empty pieces in time order. A track without any cut is
///   returned as a single piece.
pub fn split_with_rule(track: &Track, rule: SegmentationRule) -> Vec<Track> {
    let time = track.time();
    let lon = track.lon();

    let mut cuts = Vec::new();
    let mut jumps = 0usize;
    for i in 1..track.len() {
        let gap = time[i] - time[i - 1] >= rule.max_delta;
        let jump = (lon[i] - lon[i - 1]).abs() > rule.lon_jump_tolerance;
        if jump && !gap {
            jumps += 1;
        }
        if gap || jump {
            cuts.push(i);
        }
    }

    if jumps > 0 {
        warn!(
            "mmsi={}: split on {jumps} longitude jump(s) above {}°",
            track.mmsi(),
            rule.lon_jump_tolerance
        );
    }

    if cuts.is_empty() {
        return vec![track.clone()];
    }

    std::iter::once(0)
        .chain(cuts)
        .chain(std::iter::once(track.len()))
        .collect::<Vec<_>>()
        .windows(2)
        .map(|w| track.slice(w[0]..w[1]))
        .collect()
}

/// Split `track` into consecutive pieces of at most `max_len` rows.
///
/// Return
/// ----------
/// * [`AisGraphError::InvalidParameter`] when `max_len` is zero.
pub fn split_max_length(track: &Track, max_len: usize) -> Result<Vec<Track>, AisGraphError> {
    if max_len == 0 {
        return Err(AisGraphError::InvalidParameter(
            "maximum track length must be > 0".into(),
        ));
    }
    Ok((0..track.len())
        .step_by(max_len)
        .map(|start| track.slice(start..(start + max_len).min(track.len())))
        .collect())
}

/// Drop the rows whose reported speed over ground is at or below `knots`.
///
/// Return
/// ----------
/// * `None` when no row is left.
pub fn drop_low_speed(track: &Track, knots: Knot) -> Option<Track> {
    let keep: Vec<bool> = track.sog().iter().map(|sog| *sog > knots).collect();
    let kept = track.select(&keep);
    if kept.is_none() {
        debug!("mmsi={}: every report at or below {knots} knots", track.mmsi());
    }
    kept
}
