//! # Tracks: typed per-vessel position columns
//!
//! A [`Track`] holds the time-ordered positions of one vessel identifier as a set of
//! equal-length **dynamic** columns (`time`, `lon`, `lat`, `cog`, `sog`, and later
//! `in_zone`) plus **static** vessel attributes ([`VesselStatic`], the MMSI and the
//! reconstruction `label`).
//!
//! Modules
//! -----------------
//! * [`vessel_batch`](crate::track::vessel_batch) – Incoming per-vessel rows and conversion into a [`Track`].
//! * [`segmentation`](crate::track::segmentation) – Time-gap and longitude-jump splitting, length cap, low-speed filter.
//! * [`interp`](crate::track::interp) – Linear interpolation on a fixed time step.
//! * [`stream`](crate::track::stream) – Lazy, one-track-at-a-time pipeline adapters.
//!
//! Invariants
//! -----------------
//! * All dynamic columns share one length, which is never zero.
//! * `time` is non-decreasing (epoch **seconds**).
//! * The MMSI is constant within a track.
//!
//! These invariants are checked once by [`Track::new`]; every other constructor
//! derives from an existing valid track and preserves them.
use std::{ops::Range, sync::Arc};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{
    constants::{Degree, EpochSeconds, Knot, Mmsi},
    AisGraphError,
};

pub mod interp;
pub mod segmentation;
pub mod stream;
pub mod vessel_batch;

/// Zone name as stored in the `in_zone` column; shared with the owning [`Domain`](crate::domain::Domain).
pub type ZoneName = Arc<str>;

/// Static (per-vessel) attributes carried along with a track.
///
/// Every field is optional since the upstream static reports are frequently missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VesselStatic {
    pub vessel_name: Option<String>,
    pub ship_type: Option<u16>,
    pub imo: Option<u32>,
    pub dim_bow: Option<u16>,
    pub dim_stern: Option<u16>,
    pub dim_port: Option<u16>,
    pub dim_star: Option<u16>,
}

/// One vessel trajectory (or a piece of it) as typed columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    mmsi: Mmsi,
    label: Option<u32>,
    info: VesselStatic,
    time: Vec<EpochSeconds>,
    lon: Vec<Degree>,
    lat: Vec<Degree>,
    cog: Vec<Degree>,
    sog: Vec<Knot>,
    in_zone: Option<Vec<ZoneName>>,
}

impl Track {
    /// Build a track from its dynamic columns, validating the schema.
    ///
    /// Arguments
    /// -----------------
    /// * `mmsi`: vessel identifier shared by all rows.
    /// * `info`: static vessel attributes.
    /// * `time`: epoch seconds, non-decreasing.
    /// * `lon`, `lat`: position in degrees.
    /// * `cog`, `sog`: reported course (degrees) and speed over ground (knots).
    ///
    /// Return
    /// ----------
    /// * The track, or
    ///   * [`AisGraphError::EmptyTrack`] when `time` is empty,
    ///   * [`AisGraphError::ColumnLengthMismatch`] when a column length differs from `time`,
    ///   * [`AisGraphError::NonAscendingTime`] when a timestamp decreases.
    pub fn new(
        mmsi: Mmsi,
        info: VesselStatic,
        time: Vec<EpochSeconds>,
        lon: Vec<Degree>,
        lat: Vec<Degree>,
        cog: Vec<Degree>,
        sog: Vec<Knot>,
    ) -> Result<Self, AisGraphError> {
        let n = time.len();
        if n == 0 {
            return Err(AisGraphError::EmptyTrack(mmsi));
        }
        for (column, len) in [
            ("lon", lon.len()),
            ("lat", lat.len()),
            ("cog", cog.len()),
            ("sog", sog.len()),
        ] {
            if len != n {
                return Err(AisGraphError::ColumnLengthMismatch {
                    column,
                    expected: n,
                    found: len,
                });
            }
        }
        if let Some(index) = time.windows(2).position(|w| w[1] < w[0]) {
            return Err(AisGraphError::NonAscendingTime {
                mmsi,
                index: index + 1,
            });
        }

        Ok(Track {
            mmsi,
            label: None,
            info,
            time,
            lon,
            lat,
            cog,
            sog,
            in_zone: None,
        })
    }

    #[inline]
    pub fn mmsi(&self) -> Mmsi {
        self.mmsi
    }

    /// Disambiguation label set by the denoising encoder.
    #[inline]
    pub fn label(&self) -> Option<u32> {
        self.label
    }

    #[inline]
    pub fn info(&self) -> &VesselStatic {
        &self.info
    }

    /// Number of position reports.
    #[inline]
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Always `false` for a constructed track; kept for API symmetry with slices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    #[inline]
    pub fn time(&self) -> &[EpochSeconds] {
        &self.time
    }

    #[inline]
    pub fn lon(&self) -> &[Degree] {
        &self.lon
    }

    #[inline]
    pub fn lat(&self) -> &[Degree] {
        &self.lat
    }

    #[inline]
    pub fn cog(&self) -> &[Degree] {
        &self.cog
    }

    #[inline]
    pub fn sog(&self) -> &[Knot] {
        &self.sog
    }

    /// Zone membership column, present once the track has been geofenced.
    #[inline]
    pub fn in_zone(&self) -> Option<&[ZoneName]> {
        self.in_zone.as_deref()
    }

    /// Names of the dynamic columns currently present, in a fixed order.
    pub fn dynamic_columns(&self) -> SmallVec<[&'static str; 6]> {
        let mut cols: SmallVec<[&'static str; 6]> =
            SmallVec::from_slice(&["time", "lon", "lat", "cog", "sog"]);
        if self.in_zone.is_some() {
            cols.push("in_zone");
        }
        cols
    }

    /// Attach the zone membership column.
    ///
    /// Return
    /// ----------
    /// * [`AisGraphError::ColumnLengthMismatch`] if `in_zone` does not match the track length.
    pub fn set_in_zone(&mut self, in_zone: Vec<ZoneName>) -> Result<(), AisGraphError> {
        if in_zone.len() != self.len() {
            return Err(AisGraphError::ColumnLengthMismatch {
                column: "in_zone",
                expected: self.len(),
                found: in_zone.len(),
            });
        }
        self.in_zone = Some(in_zone);
        Ok(())
    }

    /// Attach a zone column computed from this track's own positions.
    pub(crate) fn attach_zones(&mut self, in_zone: Vec<ZoneName>) {
        debug_assert_eq!(in_zone.len(), self.len());
        self.in_zone = Some(in_zone);
    }

    pub(crate) fn with_label(mut self, label: u32) -> Self {
        self.label = Some(label);
        self
    }

    /// Copy of the rows in `range`, all dynamic columns sliced consistently.
    ///
    /// The caller guarantees a non-empty range within bounds.
    pub(crate) fn slice(&self, range: Range<usize>) -> Track {
        debug_assert!(range.start < range.end && range.end <= self.len());
        Track {
            mmsi: self.mmsi,
            label: self.label,
            info: self.info.clone(),
            time: self.time[range.clone()].to_vec(),
            lon: self.lon[range.clone()].to_vec(),
            lat: self.lat[range.clone()].to_vec(),
            cog: self.cog[range.clone()].to_vec(),
            sog: self.sog[range.clone()].to_vec(),
            in_zone: self.in_zone.as_ref().map(|z| z[range].to_vec()),
        }
    }

    /// Keep the rows where `keep` is `true`; `None` if no row is kept.
    pub(crate) fn select(&self, keep: &[bool]) -> Option<Track> {
        debug_assert_eq!(keep.len(), self.len());
        if !keep.iter().any(|k| *k) {
            return None;
        }

        fn pick<T: Clone>(col: &[T], keep: &[bool]) -> Vec<T> {
            col.iter()
                .zip(keep)
                .filter(|(_, k)| **k)
                .map(|(v, _)| v.clone())
                .collect()
        }

        Some(Track {
            mmsi: self.mmsi,
            label: self.label,
            info: self.info.clone(),
            time: pick(&self.time, keep),
            lon: pick(&self.lon, keep),
            lat: pick(&self.lat, keep),
            cog: pick(&self.cog, keep),
            sog: pick(&self.sog, keep),
            in_zone: self.in_zone.as_ref().map(|z| pick(z, keep)),
        })
    }

    /// Append the rows `range` of `other` to the end of this track.
    ///
    /// Used to concatenate a chunk onto a pathway; the zone column is dropped
    /// unless both sides carry it.
    pub(crate) fn extend_from(&mut self, other: &Track, range: Range<usize>) {
        self.time.extend_from_slice(&other.time[range.clone()]);
        self.lon.extend_from_slice(&other.lon[range.clone()]);
        self.lat.extend_from_slice(&other.lat[range.clone()]);
        self.cog.extend_from_slice(&other.cog[range.clone()]);
        self.sog.extend_from_slice(&other.sog[range.clone()]);
        self.in_zone = match (self.in_zone.take(), other.in_zone.as_ref()) {
            (Some(mut mine), Some(theirs)) => {
                mine.extend_from_slice(&theirs[range]);
                Some(mine)
            }
            _ => None,
        };
    }

    /// Replace the dynamic columns, keeping the static attributes and label.
    ///
    /// Used by resampling stages that produce a new time axis; the zone
    /// column is reset since it no longer matches the rows. The caller
    /// provides equal-length, non-empty columns with non-decreasing time.
    pub(crate) fn with_columns(
        &self,
        time: Vec<EpochSeconds>,
        lon: Vec<Degree>,
        lat: Vec<Degree>,
        cog: Vec<Degree>,
        sog: Vec<Knot>,
    ) -> Track {
        debug_assert!(!time.is_empty());
        debug_assert!([lon.len(), lat.len(), cog.len(), sog.len()]
            .iter()
            .all(|n| *n == time.len()));
        debug_assert!(time.windows(2).all(|w| w[0] <= w[1]));
        Track {
            mmsi: self.mmsi,
            label: self.label,
            info: self.info.clone(),
            time,
            lon,
            lat,
            cog,
            sog,
            in_zone: None,
        }
    }
}
