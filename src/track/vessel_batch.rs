//! # Per-vessel batch ingestion
//!
//! This module provides the [`VesselBatch`] type, which groups all the position
//! reports of **one vessel identifier** as delivered by the storage/query layer,
//! and the conversion of such a batch into a [`Track`].
//!
//! ## Input contract
//! -----------------
//! - One batch holds every row of one MMSI; rows never span two batches.
//! - Rows are sorted ascending by time (epoch **seconds**).
//! - Batches may arrive in any identifier order.
//!
//! ## Track generation
//! -----------------
//! [`Track::from_reports`] turns the rows into columns:
//! - Rows repeating the timestamp of the previous kept row are dropped.
//! - Static attributes are taken from the first row carrying them.
//! - Schema validation is delegated to [`Track::new`].
//!
//! ## See also
//! ------------
//! * [`Track::new`] – Column validation.
//! * [`NetworkGraph::run`](crate::network_graph::NetworkGraph::run) – Consumes batches.
use log::debug;

use crate::{
    constants::{Degree, EpochSeconds, Knot, Mmsi},
    track::{Track, VesselStatic},
    AisGraphError,
};

/// One decoded position report.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionReport {
    pub mmsi: Mmsi,
    /// Epoch seconds.
    pub time: EpochSeconds,
    /// Longitude in **degrees**, `[-180, 180]`.
    pub lon: Degree,
    /// Latitude in **degrees**, `[-90, 90]`.
    pub lat: Degree,
    /// Course over ground in degrees.
    pub cog: Degree,
    /// Speed over ground in knots.
    pub sog: Knot,
    /// Static vessel attributes merged into the row, if any.
    pub info: Option<VesselStatic>,
}

impl PositionReport {
    pub fn new(
        mmsi: Mmsi,
        time: EpochSeconds,
        lon: Degree,
        lat: Degree,
        cog: Degree,
        sog: Knot,
    ) -> Self {
        PositionReport {
            mmsi,
            time,
            lon,
            lat,
            cog,
            sog,
            info: None,
        }
    }

    pub fn with_info(mut self, info: VesselStatic) -> Self {
        self.info = Some(info);
        self
    }
}

/// All the rows of one vessel identifier.
///
/// Invariants
/// -----------------
/// * Every report carries `mmsi`.
/// * Reports are sorted ascending by `time`.
#[derive(Debug, Clone, PartialEq)]
pub struct VesselBatch {
    pub mmsi: Mmsi,
    pub reports: Vec<PositionReport>,
}

impl VesselBatch {
    pub fn new(mmsi: Mmsi, reports: Vec<PositionReport>) -> Self {
        VesselBatch { mmsi, reports }
    }

    /// Build a batch from parallel columns (degrees, knots, epoch seconds).
    ///
    /// Return
    /// ----------
    /// * [`AisGraphError::ColumnLengthMismatch`] when the columns differ in length.
    pub fn from_columns(
        mmsi: Mmsi,
        time: &[EpochSeconds],
        lon: &[Degree],
        lat: &[Degree],
        cog: &[Degree],
        sog: &[Knot],
    ) -> Result<Self, AisGraphError> {
        for (column, len) in [
            ("lon", lon.len()),
            ("lat", lat.len()),
            ("cog", cog.len()),
            ("sog", sog.len()),
        ] {
            if len != time.len() {
                return Err(AisGraphError::ColumnLengthMismatch {
                    column,
                    expected: time.len(),
                    found: len,
                });
            }
        }

        let reports = (0..time.len())
            .map(|i| PositionReport::new(mmsi, time[i], lon[i], lat[i], cog[i], sog[i]))
            .collect();
        Ok(VesselBatch { mmsi, reports })
    }

    /// Convert the batch into a validated [`Track`].
    pub fn to_track(&self) -> Result<Track, AisGraphError> {
        Track::from_reports(self.mmsi, &self.reports)
    }
}

impl Track {
    /// Build a track from the rows of one vessel.
    ///
    /// Consecutive rows sharing a timestamp are collapsed onto the first one.
    ///
    /// Return
    /// ----------
    /// * Errors of [`Track::new`], plus [`AisGraphError::InvalidParameter`] when a
    ///   row belongs to another MMSI.
    pub fn from_reports(mmsi: Mmsi, reports: &[PositionReport]) -> Result<Track, AisGraphError> {
        let n = reports.len();
        let mut time = Vec::with_capacity(n);
        let mut lon = Vec::with_capacity(n);
        let mut lat = Vec::with_capacity(n);
        let mut cog = Vec::with_capacity(n);
        let mut sog = Vec::with_capacity(n);
        let mut info: Option<VesselStatic> = None;
        let mut duplicates = 0usize;

        for report in reports {
            if report.mmsi != mmsi {
                return Err(AisGraphError::InvalidParameter(format!(
                    "report for vessel {} found in batch of vessel {mmsi}",
                    report.mmsi
                )));
            }
            if time.last() == Some(&report.time) {
                duplicates += 1;
                continue;
            }
            if info.is_none() {
                info = report.info.clone();
            }
            time.push(report.time);
            lon.push(report.lon);
            lat.push(report.lat);
            cog.push(report.cog);
            sog.push(report.sog);
        }

        if duplicates > 0 {
            debug!("mmsi={mmsi}: dropped {duplicates} rows with duplicated timestamps");
        }

        Track::new(mmsi, info.unwrap_or_default(), time, lon, lat, cog, sog)
    }
}

#[cfg(test)]
mod vessel_batch_test {
    use super::*;

    #[test]
    fn test_from_reports_deduplicates_timestamps() {
        let info = VesselStatic {
            vessel_name: Some("NORTHERN STAR".into()),
            imo: Some(9_123_456),
            ..Default::default()
        };
        let reports = vec![
            PositionReport::new(316_000_001, 100, -63.5, 44.6, 90.0, 10.0),
            PositionReport::new(316_000_001, 100, -63.6, 44.7, 90.0, 10.0)
                .with_info(info.clone()),
            PositionReport::new(316_000_001, 160, -63.4, 44.6, 90.0, 11.0),
        ];

        let track = Track::from_reports(316_000_001, &reports).unwrap();
        assert_eq!(track.len(), 2);
        assert_eq!(track.time(), &[100, 160]);
        assert_eq!(track.lon(), &[-63.5, -63.4]);
        // static info is only read from kept rows
        assert_eq!(track.info(), &VesselStatic::default());
    }

    #[test]
    fn test_from_reports_takes_first_static_info() {
        let info = VesselStatic {
            vessel_name: Some("OCEAN BREEZE".into()),
            ship_type: Some(70),
            ..Default::default()
        };
        let reports = vec![
            PositionReport::new(1, 0, 0.0, 0.0, 0.0, 0.0),
            PositionReport::new(1, 10, 0.0, 0.0, 0.0, 0.0).with_info(info.clone()),
        ];
        let track = Track::from_reports(1, &reports).unwrap();
        assert_eq!(track.info(), &info);
    }

    #[test]
    fn test_from_reports_rejects_foreign_mmsi() {
        let reports = vec![
            PositionReport::new(1, 0, 0.0, 0.0, 0.0, 0.0),
            PositionReport::new(2, 10, 0.0, 0.0, 0.0, 0.0),
        ];
        assert!(matches!(
            Track::from_reports(1, &reports),
            Err(AisGraphError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_from_columns() {
        let batch = VesselBatch::from_columns(
            5,
            &[0, 60, 120],
            &[1.0, 2.0, 3.0],
            &[4.0, 5.0, 6.0],
            &[0.0; 3],
            &[0.0; 3],
        )
        .unwrap();
        let track = batch.to_track().unwrap();
        assert_eq!(track.lat(), &[4.0, 5.0, 6.0]);

        assert!(VesselBatch::from_columns(5, &[0], &[1.0, 2.0], &[0.0], &[0.0], &[0.0]).is_err());
    }
}
