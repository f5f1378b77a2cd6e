use geo::Polygon;
use thiserror::Error;

use crate::constants::Mmsi;

/// Split geometries proposed when a zone crosses the antimeridian.
///
/// Each part is already shifted back into `[-180, 180]` and can be used to
/// build separate zones for a retry.
#[derive(Debug, Clone, PartialEq)]
pub struct AntimeridianSplit {
    pub west: Option<Polygon<f64>>,
    pub east: Option<Polygon<f64>>,
    pub interior: Option<Polygon<f64>>,
}

#[derive(Error, Debug)]
pub enum AisGraphError {
    #[error("Track for vessel {0} has no position reports")]
    EmptyTrack(Mmsi),

    #[error("Column '{column}' has length {found}, expected {expected}")]
    ColumnLengthMismatch {
        column: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Timestamps of vessel {mmsi} are not ascending at index {index}")]
    NonAscendingTime { mmsi: Mmsi, index: usize },

    #[error("Invalid polygon for zone '{zone}': {reason}")]
    InvalidPolygon { zone: String, reason: String },

    #[error("Zone '{zone}' spans the antimeridian (longitudes {min_lon}..{max_lon})")]
    AntimeridianSpan {
        zone: String,
        min_lon: f64,
        max_lon: f64,
        splits: Box<AntimeridianSplit>,
    },

    #[error("Invalid domain boundary: {0}")]
    InvalidDomainBounds(String),

    #[error("Domain '{0}' needs at least one zone")]
    EmptyDomain(String),

    #[error("Duplicate zone name '{0}'")]
    DuplicateZone(String),

    #[error("Track for vessel {0} has not been geofenced (missing in_zone column)")]
    MissingZoneColumn(Mmsi),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Error while parsing zone file {path}: {reason}")]
    ZoneFileParse { path: String, reason: String },

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("UTF-8 Path error: {0}")]
    Utf8PathError(String),

    #[error("Unable to build the worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("No transit records were produced in {0}")]
    NoIntermediateArtifacts(String),
}

impl PartialEq for AisGraphError {
    fn eq(&self, other: &Self) -> bool {
        use AisGraphError::*;
        match (self, other) {
            (EmptyTrack(a), EmptyTrack(b)) => a == b,
            (
                ColumnLengthMismatch {
                    column: c1,
                    expected: e1,
                    found: f1,
                },
                ColumnLengthMismatch {
                    column: c2,
                    expected: e2,
                    found: f2,
                },
            ) => c1 == c2 && e1 == e2 && f1 == f2,
            (
                NonAscendingTime {
                    mmsi: m1,
                    index: i1,
                },
                NonAscendingTime {
                    mmsi: m2,
                    index: i2,
                },
            ) => m1 == m2 && i1 == i2,
            (InvalidPolygon { zone: a, .. }, InvalidPolygon { zone: b, .. }) => a == b,
            (AntimeridianSpan { zone: a, .. }, AntimeridianSpan { zone: b, .. }) => a == b,
            (InvalidDomainBounds(a), InvalidDomainBounds(b)) => a == b,
            (EmptyDomain(a), EmptyDomain(b)) => a == b,
            (DuplicateZone(a), DuplicateZone(b)) => a == b,
            (MissingZoneColumn(a), MissingZoneColumn(b)) => a == b,
            (InvalidParameter(a), InvalidParameter(b)) => a == b,
            (ZoneFileParse { path: a, .. }, ZoneFileParse { path: b, .. }) => a == b,
            (Utf8PathError(a), Utf8PathError(b)) => a == b,
            (NoIntermediateArtifacts(a), NoIntermediateArtifacts(b)) => a == b,

            // Wrapped library errors are not comparable: equal when same variant
            (CsvError(_), CsvError(_)) => true,
            (IoError(_), IoError(_)) => true,
            (WorkerPool(_), WorkerPool(_)) => true,

            _ => false,
        }
    }
}
