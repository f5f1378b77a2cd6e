//! # Geodesy primitives
//!
//! Great-circle distance on a spherical Earth, derived quantities along a
//! [`Track`] (pairwise distances, elapsed seconds, speeds), and a bounding box
//! enclosing a circle of given radius.
//!
//! All functions use [`EARTH_RADIUS_METERS`]; longitudes and latitudes are in
//! **degrees**, distances in **meters**, speeds in **knots**.
use std::ops::Range;

use itertools::Itertools;

use crate::{
    constants::{Degree, Knot, Meter, EARTH_RADIUS_METERS, MIN_ELAPSED_SECONDS, MPS_TO_KNOTS},
    track::Track,
};

/// Axis-aligned longitude/latitude box, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub xmin: Degree,
    pub xmax: Degree,
    pub ymin: Degree,
    pub ymax: Degree,
}

impl BoundingBox {
    /// Degenerate box around a single point.
    pub fn from_point(x: Degree, y: Degree) -> Self {
        BoundingBox {
            xmin: x,
            xmax: x,
            ymin: y,
            ymax: y,
        }
    }

    /// Grow the box so that it also covers `other`.
    pub fn expand(&mut self, other: &BoundingBox) {
        self.xmin = self.xmin.min(other.xmin);
        self.xmax = self.xmax.max(other.xmax);
        self.ymin = self.ymin.min(other.ymin);
        self.ymax = self.ymax.max(other.ymax);
    }

    /// Inclusive containment test.
    #[inline]
    pub fn contains(&self, x: Degree, y: Degree) -> bool {
        self.xmin <= x && x <= self.xmax && self.ymin <= y && y <= self.ymax
    }
}

/// Great-circle (haversine) distance in meters between `(x1, y1)` and `(x2, y2)`.
///
/// Arguments
/// -----------------
/// * `x1`, `y1`: longitude and latitude of the first point (degrees).
/// * `x2`, `y2`: longitude and latitude of the second point (degrees).
///
/// Return
/// ----------
/// * Distance in meters on a sphere of radius [`EARTH_RADIUS_METERS`].
pub fn distance(x1: Degree, y1: Degree, x2: Degree, y2: Degree) -> Meter {
    let (x1r, y1r, x2r, y2r) = (
        x1.to_radians(),
        y1.to_radians(),
        x2.to_radians(),
        y2.to_radians(),
    );
    let dlon = x2r - x1r;
    let dlat = y2r - y1r;
    let a = (dlat / 2.0).sin().powi(2) + y1r.cos() * y2r.cos() * (dlon / 2.0).sin().powi(2);
    // rounding may push `a` marginally above 1 for antipodal points
    2.0 * EARTH_RADIUS_METERS * a.sqrt().min(1.0).asin()
}

/// Distances in meters between consecutive positions of `track` within `range`.
///
/// Returns `range.len() - 1` values (none for ranges shorter than 2).
pub fn consecutive_distances(track: &Track, range: Range<usize>) -> Vec<Meter> {
    let lon = &track.lon()[range.clone()];
    let lat = &track.lat()[range];
    lon.iter()
        .zip(lat)
        .tuple_windows()
        .map(|((x1, y1), (x2, y2))| distance(*x1, *y1, *x2, *y2))
        .collect()
}

/// Elapsed seconds between consecutive positions of `track` within `range`.
///
/// Values below [`MIN_ELAPSED_SECONDS`] are floored to it so that derived speeds
/// stay finite.
pub fn consecutive_seconds(track: &Track, range: Range<usize>) -> Vec<f64> {
    track.time()[range]
        .iter()
        .tuple_windows()
        .map(|(t1, t2)| ((t2 - t1) as f64).max(MIN_ELAPSED_SECONDS))
        .collect()
}

/// Speed in knots between consecutive positions of `track` within `range`.
pub fn consecutive_knots(track: &Track, range: Range<usize>) -> Vec<Knot> {
    consecutive_distances(track, range.clone())
        .into_iter()
        .zip(consecutive_seconds(track, range))
        .map(|(m, s)| m / s * MPS_TO_KNOTS)
        .collect()
}

/// Implied speed in knots to cover `meters` in `seconds` (floored at one second).
#[inline]
pub fn knots(meters: Meter, seconds: f64) -> Knot {
    meters / seconds.max(MIN_ELAPSED_SECONDS) * MPS_TO_KNOTS
}

/// Bounding box guaranteed to contain the circle of `radius` meters around `(x, y)`.
///
/// The latitude half-extent is the angular radius `d = radius / R`. The longitude
/// half-extent is scaled by `1 / cos(latitude)` through `asin(sin d / cos y)`, which
/// is the exact widest longitude of the spherical cap. A box cannot wrap, so the
/// full longitude range is returned when the cap covers a pole or crosses ±180°.
///
/// Return
/// ----------
/// * A [`BoundingBox`] within `[-180, 180] × [-90, 90]`.
pub fn radius_bbox(x: Degree, y: Degree, radius: Meter) -> BoundingBox {
    let d = (radius / EARTH_RADIUS_METERS).max(0.0);
    let d_deg = d.to_degrees();

    let ymin = (y - d_deg).max(-90.0);
    let ymax = (y + d_deg).min(90.0);

    let cos_y = y.to_radians().cos();
    let ratio = if cos_y > 0.0 { d.sin() / cos_y } else { f64::INFINITY };

    let (xmin, xmax) = if d >= std::f64::consts::FRAC_PI_2 || ratio >= 1.0 {
        (-180.0, 180.0)
    } else {
        let dlon = ratio.asin().to_degrees();
        if x - dlon < -180.0 || x + dlon > 180.0 {
            (-180.0, 180.0)
        } else {
            (x - dlon, x + dlon)
        }
    };

    BoundingBox {
        xmin,
        xmax,
        ymin,
        ymax,
    }
}
