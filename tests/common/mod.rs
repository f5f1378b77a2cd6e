#![allow(dead_code)]
use aisgraph::{constants::Mmsi, Domain, VesselBatch, Zone};

/// Axis-aligned square zone with its south-west corner at `(x0, y0)`.
pub fn square_zone(name: &str, x0: f64, y0: f64, side: f64) -> Zone {
    Zone::from_coords(
        name,
        &[x0, x0, x0 + side, x0 + side],
        &[y0, y0 + side, y0 + side, y0],
    )
    .unwrap()
}

/// `Z1 = (-41, -40) × (60, 61)` and `Z2 = (0, 1) × (0, 1)`.
pub fn two_zone_domain() -> Domain {
    Domain::new(
        "north-atlantic",
        vec![
            square_zone("Z1", -41.0, 60.0, 1.0),
            square_zone("Z2", 0.0, 0.0, 1.0),
        ],
    )
    .unwrap()
}

/// One position per hour starting at 2020-09-13 12:26:40 UTC, at 10 knots due north.
pub fn hourly_batch(mmsi: Mmsi, positions: &[(f64, f64)]) -> VesselBatch {
    let n = positions.len();
    let time: Vec<i64> = (0..n as i64).map(|i| 1_600_000_000 + i * 3600).collect();
    let lon: Vec<f64> = positions.iter().map(|p| p.0).collect();
    let lat: Vec<f64> = positions.iter().map(|p| p.1).collect();
    VesselBatch::from_columns(mmsi, &time, &lon, &lat, &vec![0.0; n], &vec![10.0; n]).unwrap()
}
