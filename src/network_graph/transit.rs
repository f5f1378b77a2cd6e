//! # Transit edges
//!
//! A [`TransitEdge`] summarizes the movement of one reconstructed, geofenced
//! track between two zone boundaries.
//!
//! Boundary rule
//! -----------------
//! Boundaries are index `0` plus every index `i` with `in_zone[i] != in_zone[i-1]`.
//! Every consecutive pair `(b0, b1)` gives one edge with `src_zone = in_zone[b0]`
//! and `rcv_zone = in_zone[b1]`, summarized over the rows `[b0, b1)`; the last pair
//! is summarized up to the end of the track. A track that never changes zone gives
//! a single edge whose receiver is unresolved
//! ([`NULL_SENTINEL`](crate::constants::NULL_SENTINEL)).
//!
//! With `in_zone = [Z1, Z0, Z1]` this yields `Z1 → Z0` over row `0` and `Z0 → Z1`
//! over rows `1..3`.
//!
//! Statistics that need two positions (speeds, minutes in zone) are `None` on
//! single-row ranges and serialized as `NULL`.
use std::ops::Range;

use hifitime::Epoch;
use itertools::Itertools;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{EpochSeconds, Knot, Meter, Mmsi},
    geodesy::{consecutive_distances, consecutive_knots, distance},
    track::{Track, ZoneName},
    AisGraphError,
};

/// One row of the network graph output.
///
/// The layout is flat so that it maps one-to-one onto a CSV record; the field
/// order is the column order of the aggregated output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitEdge {
    pub mmsi: Mmsi,
    pub label: Option<u32>,
    pub vessel_name: Option<String>,
    pub ship_type: Option<u16>,
    pub imo: Option<u32>,
    pub dim_bow: Option<u16>,
    pub dim_stern: Option<u16>,
    pub dim_port: Option<u16>,
    pub dim_star: Option<u16>,
    pub src_zone: String,
    #[serde(with = "null_sentinel")]
    pub rcv_zone: Option<String>,
    pub transit_nodes: String,
    pub first_seen_in_zone: String,
    pub last_seen_in_zone: String,
    pub year: i32,
    pub month: u8,
    pub day: u8,
    /// Straight-line distance between the first and last rows of the range.
    pub total_distance_meters: Meter,
    /// Sum of the distances between consecutive rows of the range.
    pub cumulative_distance_meters: Meter,
    #[serde(with = "null_sentinel")]
    pub velocity_knots_min: Option<Knot>,
    #[serde(with = "null_sentinel")]
    pub velocity_knots_avg: Option<Knot>,
    #[serde(with = "null_sentinel")]
    pub velocity_knots_max: Option<Knot>,
    #[serde(with = "null_sentinel")]
    pub minutes_spent_in_zone: Option<f64>,
}

impl TransitEdge {
    /// Column names, in serialization order.
    pub const FIELDS: [&'static str; 23] = [
        "mmsi",
        "label",
        "vessel_name",
        "ship_type",
        "imo",
        "dim_bow",
        "dim_stern",
        "dim_port",
        "dim_star",
        "src_zone",
        "rcv_zone",
        "transit_nodes",
        "first_seen_in_zone",
        "last_seen_in_zone",
        "year",
        "month",
        "day",
        "total_distance_meters",
        "cumulative_distance_meters",
        "velocity_knots_min",
        "velocity_knots_avg",
        "velocity_knots_max",
        "minutes_spent_in_zone",
    ];

    /// `true` when the receiving zone is unresolved.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.rcv_zone.is_none()
    }
}

/// Serde adapter writing `None` as `NULL` and `Some(v)` with `Display`.
pub mod null_sentinel {
    use std::{fmt::Display, str::FromStr};

    use serde::{de, Deserialize, Deserializer, Serializer};

    use crate::constants::NULL_SENTINEL;

    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        match value {
            Some(v) => serializer.collect_str(v),
            None => serializer.serialize_str(NULL_SENTINEL),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw == NULL_SENTINEL {
            Ok(None)
        } else {
            raw.parse().map(Some).map_err(de::Error::custom)
        }
    }
}

/// `%Y-%m-%d %H:%M UTC` rendering of an epoch, plus its calendar date.
fn utc_minute(t: EpochSeconds) -> (String, i32, u8, u8) {
    let (y, m, d, hh, mm, _, _) = Epoch::from_unix_seconds(t as f64).to_gregorian_utc();
    (format!("{y:04}-{m:02}-{d:02} {hh:02}:{mm:02} UTC"), y, m, d)
}

fn edge(
    track: &Track,
    range: Range<usize>,
    src: &ZoneName,
    rcv: Option<&ZoneName>,
) -> TransitEdge {
    let (i0, i1) = (range.start, range.end - 1);
    let (t0, t1) = (track.time()[i0], track.time()[i1]);
    let (first_seen, year, month, day) = utc_minute(t0);
    let (last_seen, ..) = utc_minute(t1);

    let speeds = consecutive_knots(track, range.clone());
    let (velocity_knots_min, velocity_knots_avg, velocity_knots_max) = if speeds.is_empty() {
        (None, None, None)
    } else {
        let (min, max) = speeds
            .iter()
            .copied()
            .minmax()
            .into_option()
            .unwrap_or((0.0, 0.0));
        let avg = speeds.iter().sum::<f64>() / speeds.len() as f64;
        (Some(min), Some(avg), Some(max))
    };
    let minutes_spent_in_zone = (range.len() > 1).then(|| (t1 - t0) as f64 / 60.0);

    let info = track.info();
    TransitEdge {
        mmsi: track.mmsi(),
        label: track.label(),
        vessel_name: info.vessel_name.clone(),
        ship_type: info.ship_type,
        imo: info.imo,
        dim_bow: info.dim_bow,
        dim_stern: info.dim_stern,
        dim_port: info.dim_port,
        dim_star: info.dim_star,
        src_zone: src.to_string(),
        rcv_zone: rcv.map(|z| z.to_string()),
        transit_nodes: match rcv {
            Some(rcv) => format!("{src}_{rcv}"),
            None => src.to_string(),
        },
        first_seen_in_zone: first_seen,
        last_seen_in_zone: last_seen,
        year,
        month,
        day,
        total_distance_meters: distance(
            track.lon()[i0],
            track.lat()[i0],
            track.lon()[i1],
            track.lat()[i1],
        ),
        cumulative_distance_meters: consecutive_distances(track, range).iter().sum(),
        velocity_knots_min,
        velocity_knots_avg,
        velocity_knots_max,
        minutes_spent_in_zone,
    }
}

/// Zone transition indices of a geofenced track (excluding index `0`).
fn transitions(in_zone: &[ZoneName]) -> impl Iterator<Item = usize> + '_ {
    (1..in_zone.len()).filter(move |&i| in_zone[i] != in_zone[i - 1])
}

/// Extract the transit edges of a geofenced track.
///
/// Arguments
/// -----------------
/// * `track`: a track carrying the `in_zone` column.
///
/// Return
/// ----------
/// * At least one edge, in time order, or [`AisGraphError::MissingZoneColumn`].
pub fn transit_edges(track: &Track) -> Result<Vec<TransitEdge>, AisGraphError> {
    let in_zone = track
        .in_zone()
        .ok_or(AisGraphError::MissingZoneColumn(track.mmsi()))?;
    let n = track.len();

    let bounds: Vec<usize> = std::iter::once(0).chain(transitions(in_zone)).collect();

    let edges: Vec<TransitEdge> = if bounds.len() == 1 {
        vec![edge(track, 0..n, &in_zone[0], None)]
    } else {
        let last = bounds.len() - 2;
        bounds
            .windows(2)
            .enumerate()
            .map(|(k, w)| {
                let end = if k == last { n } else { w[1] };
                edge(track, w[0]..end, &in_zone[w[0]], Some(&in_zone[w[1]]))
            })
            .collect()
    };

    let single = edges
        .iter()
        .filter(|e| e.velocity_knots_avg.is_none())
        .count();
    if single > 0 {
        warn!(
            "mmsi={} label={:?}: {single} transit range(s) with a single position",
            track.mmsi(),
            track.label()
        );
    }
    Ok(edges)
}

/// Number of zone transitions per hour of track duration.
///
/// The duration is floored at one second.
pub fn hourly_transit_rate(track: &Track) -> Result<f64, AisGraphError> {
    let in_zone = track
        .in_zone()
        .ok_or(AisGraphError::MissingZoneColumn(track.mmsi()))?;
    let time = track.time();
    let seconds = ((time[time.len() - 1] - time[0]) as f64).max(1.0);
    Ok(transitions(in_zone).count() as f64 / (seconds / 3600.0))
}

#[cfg(test)]
mod transit_test {
    use super::*;
    use crate::{
        domain::{Domain, Zone},
        geofence::fence,
        track::{track_test::hourly_track, VesselStatic},
    };
    use approx::assert_relative_eq;

    fn domain() -> Domain {
        Domain::new(
            "test",
            vec![
                Zone::from_coords(
                    "Z1",
                    &[-41.0, -41.0, -40.0, -40.0],
                    &[60.0, 61.0, 61.0, 60.0],
                )
                .unwrap(),
                Zone::from_coords("Z2", &[0.0, 0.0, 1.0, 1.0], &[0.0, 1.0, 1.0, 0.0]).unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_round_trip_scenario() {
        let track = fence(
            &hourly_track(1, &[(-40.5, 60.5), (10.0, 10.0), (-40.5, 60.5)]).with_label(0),
            &domain(),
        );
        let edges = transit_edges(&track).unwrap();
        assert_eq!(edges.len(), 2);

        assert_eq!(edges[0].src_zone, "Z1");
        assert_eq!(edges[0].rcv_zone.as_deref(), Some("Z0"));
        assert_eq!(edges[0].transit_nodes, "Z1_Z0");
        assert_eq!(edges[0].velocity_knots_avg, None);
        assert_eq!(edges[0].minutes_spent_in_zone, None);

        assert_eq!(edges[1].src_zone, "Z0");
        assert_eq!(edges[1].rcv_zone.as_deref(), Some("Z1"));
        assert_relative_eq!(edges[1].minutes_spent_in_zone.unwrap(), 60.0);
        assert!(edges[1].cumulative_distance_meters > 1e6);
        assert_relative_eq!(
            edges[1].total_distance_meters,
            edges[1].cumulative_distance_meters
        );
        assert_eq!(edges[1].label, Some(0));
    }

    #[test]
    fn test_no_transition_gives_open_edge() {
        let track = fence(&hourly_track(2, &[(0.2, 0.2), (0.3, 0.3)]), &domain());
        let edges = transit_edges(&track).unwrap();
        assert_eq!(edges.len(), 1);
        assert!(edges[0].is_open());
        assert_eq!(edges[0].transit_nodes, "Z2");
        assert!(edges[0].velocity_knots_min.is_some());
    }

    #[test]
    fn test_single_position_track() {
        let track = fence(&hourly_track(3, &[(5.0, 5.0)]), &domain());
        let edges = transit_edges(&track).unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].src_zone, "Z0");
        assert!(edges[0].is_open());
        assert_eq!(edges[0].velocity_knots_min, None);
        assert_eq!(edges[0].velocity_knots_max, None);
        assert_eq!(edges[0].total_distance_meters, 0.0);
    }

    #[test]
    fn test_speed_statistics() {
        let track = Track::new(
            4,
            VesselStatic::default(),
            vec![0, 3600, 5400],
            vec![0.1, 0.2, 0.3],
            vec![0.5; 3],
            vec![0.0; 3],
            vec![0.0; 3],
        )
        .unwrap();
        let edges = transit_edges(&fence(&track, &domain())).unwrap();
        let e = &edges[0];
        let (vmin, vmax) = (e.velocity_knots_min.unwrap(), e.velocity_knots_max.unwrap());
        assert_relative_eq!(vmax, 2.0 * vmin, max_relative = 1e-6);
        assert_relative_eq!(e.velocity_knots_avg.unwrap(), 1.5 * vmin, max_relative = 1e-6);
        assert_relative_eq!(e.minutes_spent_in_zone.unwrap(), 90.0);
    }

    #[test]
    fn test_timestamps() {
        let track = Track::new(
            5,
            VesselStatic::default(),
            vec![1_600_000_000, 1_600_000_600],
            vec![0.5, 0.5],
            vec![0.5, 0.5],
            vec![0.0; 2],
            vec![0.0; 2],
        )
        .unwrap();
        let e = &transit_edges(&fence(&track, &domain())).unwrap()[0];
        // 2020-09-13T12:26:40Z
        assert_eq!(e.first_seen_in_zone, "2020-09-13 12:26 UTC");
        assert_eq!(e.last_seen_in_zone, "2020-09-13 12:36 UTC");
        assert_eq!((e.year, e.month, e.day), (2020, 9, 13));
    }

    #[test]
    fn test_missing_zone_column() {
        let track = hourly_track(6, &[(0.0, 0.0)]);
        assert_eq!(
            transit_edges(&track).unwrap_err(),
            AisGraphError::MissingZoneColumn(6)
        );
        assert!(hourly_transit_rate(&track).is_err());
    }

    #[test]
    fn test_hourly_transit_rate() {
        let track = fence(
            &hourly_track(
                7,
                &[(-40.5, 60.5), (10.0, 10.0), (-40.5, 60.5), (0.5, 0.5), (0.5, 0.5)],
            ),
            &domain(),
        );
        // three transitions over four hours
        assert_relative_eq!(hourly_transit_rate(&track).unwrap(), 0.75);
    }

    #[test]
    fn test_csv_round_trip_keeps_null() {
        let track = fence(&hourly_track(8, &[(5.0, 5.0)]), &domain());
        let edge = transit_edges(&track).unwrap().remove(0);

        let mut writer = csv::Writer::from_writer(vec![]);
        writer.serialize(&edge).unwrap();
        let data = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let header = data.lines().next().unwrap();
        assert_eq!(header, TransitEdge::FIELDS.join(","));
        assert!(data.lines().nth(1).unwrap().contains("NULL"));

        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let back: TransitEdge = reader.deserialize().next().unwrap().unwrap();
        assert_eq!(back, edge);
    }
}
