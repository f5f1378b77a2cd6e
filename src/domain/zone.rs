//! # Zone geometry
//!
//! A [`Zone`] is a named polygon in degree space, together with the values used by
//! the containment pre-filter of [`Domain`](crate::domain::Domain):
//!
//! * `centroid` – planar centroid of the polygon (degrees),
//! * `max_radius` – upper bound of the great-circle distance from the centroid to
//!   any point of the polygon boundary (meters),
//! * `bbox` – the polygon bounding box.
//!
//! ## Radius bound
//! -----------------
//! The farthest point of a polygon from its centroid always lies on its boundary.
//! Edges are straight in degree space, not along great circles, so the boundary is
//! densified (at most [`EDGE_SAMPLE_STEP`] degrees between samples) and the bound is
//! padded with half the largest sample spacing. This keeps `distance - max_radius < 0`
//! a necessary condition for containment even for large, high-latitude zones.
use geo::{Area, BoundingRect, Centroid, Contains, Coord, LineString, Point, Polygon};

use crate::{
    constants::{Degree, Meter},
    geodesy::{distance, BoundingBox},
    track::ZoneName,
    AisGraphError,
};

/// Maximum spacing, in degrees, between two boundary samples used for `max_radius`.
pub const EDGE_SAMPLE_STEP: Degree = 0.05;

const MAX_SAMPLES_PER_EDGE: usize = 4096;

#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    name: ZoneName,
    geometry: Polygon<f64>,
    centroid: (Degree, Degree),
    max_radius: Meter,
    bbox: BoundingBox,
}

impl Zone {
    /// Build a zone from a polygon.
    ///
    /// The polygon exterior ring is used for containment; interior rings (holes)
    /// are honoured by the exact test.
    ///
    /// Return
    /// ----------
    /// * [`AisGraphError::InvalidPolygon`] when the name is empty, a coordinate is not
    ///   finite, a latitude lies outside `[-90, 90]`, or the ring has fewer than three
    ///   distinct vertices or no area.
    ///
    /// Longitudes outside `[-180, 180]` are accepted here and rejected by
    /// [`Domain::new`](crate::domain::Domain::new), which proposes split geometries.
    pub fn new(name: impl Into<String>, geometry: Polygon<f64>) -> Result<Self, AisGraphError> {
        let name: String = name.into();
        let invalid = |reason: &str| AisGraphError::InvalidPolygon {
            zone: name.clone(),
            reason: reason.to_string(),
        };

        if name.trim().is_empty() {
            return Err(invalid("zone name is empty"));
        }

        let ring = geometry.exterior();
        if ring.coords().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(invalid("non-finite coordinate"));
        }
        if ring.coords().any(|c| !(-90.0..=90.0).contains(&c.y)) {
            return Err(invalid("latitude outside [-90, 90]"));
        }

        let mut distinct: Vec<Coord<f64>> = Vec::with_capacity(ring.0.len());
        for c in ring.coords() {
            if !distinct.contains(c) {
                distinct.push(*c);
            }
        }
        if distinct.len() < 3 {
            return Err(invalid("fewer than three distinct vertices"));
        }
        if geometry.unsigned_area() <= 0.0 {
            return Err(invalid("polygon has no area"));
        }

        let centroid = geometry
            .centroid()
            .ok_or_else(|| invalid("centroid is undefined"))?;
        let rect = geometry
            .bounding_rect()
            .ok_or_else(|| invalid("bounding box is undefined"))?;

        let max_radius = boundary_radius(ring, centroid.x(), centroid.y());

        Ok(Zone {
            name: ZoneName::from(name.as_str()),
            centroid: (centroid.x(), centroid.y()),
            max_radius,
            bbox: BoundingBox {
                xmin: rect.min().x,
                xmax: rect.max().x,
                ymin: rect.min().y,
                ymax: rect.max().y,
            },
            geometry,
        })
    }

    /// Build a zone from longitude/latitude vertex arrays (degrees).
    ///
    /// The ring is closed automatically when the last vertex differs from the first.
    pub fn from_coords(
        name: impl Into<String>,
        x: &[Degree],
        y: &[Degree],
    ) -> Result<Self, AisGraphError> {
        let name: String = name.into();
        if x.len() != y.len() {
            return Err(AisGraphError::InvalidPolygon {
                zone: name,
                reason: format!("{} longitudes for {} latitudes", x.len(), y.len()),
            });
        }
        let ring: LineString<f64> = x
            .iter()
            .zip(y)
            .map(|(x, y)| Coord { x: *x, y: *y })
            .collect();
        Zone::new(name, Polygon::new(ring, vec![]))
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub(crate) fn shared_name(&self) -> &ZoneName {
        &self.name
    }

    #[inline]
    pub fn geometry(&self) -> &Polygon<f64> {
        &self.geometry
    }

    #[inline]
    pub fn centroid(&self) -> (Degree, Degree) {
        self.centroid
    }

    #[inline]
    pub fn max_radius(&self) -> Meter {
        self.max_radius
    }

    #[inline]
    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    /// Cheap necessary condition for containment: negative when the point may be inside.
    #[inline]
    pub fn centroid_margin(&self, x: Degree, y: Degree) -> Meter {
        distance(x, y, self.centroid.0, self.centroid.1) - self.max_radius
    }

    /// Exact containment test (points on the boundary are outside).
    pub fn contains(&self, x: Degree, y: Degree) -> bool {
        self.bbox.contains(x, y) && self.geometry.contains(&Point::new(x, y))
    }
}

/// Upper bound on the great-circle distance from `(cx, cy)` to the ring.
fn boundary_radius(ring: &LineString<f64>, cx: Degree, cy: Degree) -> Meter {
    let mut max_sample: Meter = 0.0;
    let mut max_spacing: Meter = 0.0;

    for line in ring.lines() {
        let (a, b) = (line.start, line.end);
        let span = (b.x - a.x).abs().max((b.y - a.y).abs());
        let n = ((span / EDGE_SAMPLE_STEP).ceil() as usize).clamp(1, MAX_SAMPLES_PER_EDGE);

        let mut prev = a;
        max_sample = max_sample.max(distance(cx, cy, a.x, a.y));
        for k in 1..=n {
            let t = k as f64 / n as f64;
            let p = Coord {
                x: a.x + (b.x - a.x) * t,
                y: a.y + (b.y - a.y) * t,
            };
            max_sample = max_sample.max(distance(cx, cy, p.x, p.y));
            max_spacing = max_spacing.max(distance(prev.x, prev.y, p.x, p.y));
            prev = p;
        }
    }

    max_sample + max_spacing / 2.0
}
