//! # Antimeridian splitting
//!
//! Zones are planar polygons in degree space and cannot wrap around the
//! ±180° meridian. A zone whose longitudes leave `[-180, 180]` is rejected and the
//! caller is handed up to three replacement polygons:
//!
//! * `west` – the part with `x < -180`, shifted by `+360°`,
//! * `east` – the part with `x > 180`, shifted by `-360°`,
//! * `interior` – the part inside `[-180, 180]`.
//!
//! Clipping is a Sutherland–Hodgman pass of the exterior ring against vertical
//! half-planes. Interior rings are not carried into the proposals.
use geo::{Area, Coord, LineString, Polygon};

use crate::{aisgraph_errors::AntimeridianSplit, constants::Degree};

#[derive(Clone, Copy)]
enum Side {
    Below(Degree),
    Above(Degree),
}

impl Side {
    fn keeps(self, x: Degree) -> bool {
        match self {
            Side::Below(c) => x <= c,
            Side::Above(c) => x >= c,
        }
    }

    fn boundary(self) -> Degree {
        match self {
            Side::Below(c) | Side::Above(c) => c,
        }
    }
}

/// Clip an open ring (no repeated closing vertex) against one vertical half-plane.
fn clip(ring: &[Coord<f64>], side: Side) -> Vec<Coord<f64>> {
    let mut out = Vec::with_capacity(ring.len() + 2);
    let Some(&last) = ring.last() else {
        return out;
    };

    let cross = |a: Coord<f64>, b: Coord<f64>| {
        let c = side.boundary();
        let t = (c - a.x) / (b.x - a.x);
        Coord {
            x: c,
            y: a.y + (b.y - a.y) * t,
        }
    };

    let mut prev = last;
    for &cur in ring {
        match (side.keeps(prev.x), side.keeps(cur.x)) {
            (true, true) => out.push(cur),
            (true, false) => out.push(cross(prev, cur)),
            (false, true) => {
                out.push(cross(prev, cur));
                out.push(cur);
            }
            (false, false) => {}
        }
        prev = cur;
    }
    out
}

fn to_polygon(ring: Vec<Coord<f64>>, shift: Degree) -> Option<Polygon<f64>> {
    if ring.len() < 3 {
        return None;
    }
    let shifted: LineString<f64> = ring
        .into_iter()
        .map(|c| Coord {
            x: c.x + shift,
            y: c.y,
        })
        .collect();
    let polygon = Polygon::new(shifted, vec![]);
    (polygon.unsigned_area() > 0.0).then_some(polygon)
}

/// Compute the split proposals for `polygon`.
pub fn split_antimeridian(polygon: &Polygon<f64>) -> AntimeridianSplit {
    let mut ring: Vec<Coord<f64>> = polygon.exterior().coords().copied().collect();
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }

    let west = clip(&ring, Side::Below(-180.0));
    let east = clip(&ring, Side::Above(180.0));
    let interior = clip(&clip(&ring, Side::Above(-180.0)), Side::Below(180.0));

    AntimeridianSplit {
        west: to_polygon(west, 360.0),
        east: to_polygon(east, -360.0),
        interior: to_polygon(interior, 0.0),
    }
}

#[cfg(test)]
mod antimeridian_test {
    use super::*;
    use geo::BoundingRect;

    fn rect(x0: f64, x1: f64, y0: f64, y1: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![(x0, y0), (x0, y1), (x1, y1), (x1, y0), (x0, y0)]),
            vec![],
        )
    }

    #[test]
    fn test_split_east_overflow() {
        let split = split_antimeridian(&rect(170.0, 190.0, -5.0, 5.0));
        assert!(split.west.is_none());

        let east = split.east.unwrap().bounding_rect().unwrap();
        assert!((east.min().x + 180.0).abs() < 1e-9);
        assert!((east.max().x + 170.0).abs() < 1e-9);

        let interior = split.interior.unwrap().bounding_rect().unwrap();
        assert!((interior.min().x - 170.0).abs() < 1e-9);
        assert!((interior.max().x - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_split_west_overflow() {
        let split = split_antimeridian(&rect(-185.0, -175.0, 10.0, 20.0));
        assert!(split.east.is_none());
        let west = split.west.unwrap().bounding_rect().unwrap();
        assert!((west.min().x - 175.0).abs() < 1e-9);
        assert!((west.max().x - 180.0).abs() < 1e-9);
        assert!(split.interior.is_some());
    }

    #[test]
    fn test_area_is_preserved() {
        let polygon = rect(175.0, 185.0, 0.0, 2.0);
        let split = split_antimeridian(&polygon);
        let total: f64 = [split.west, split.east, split.interior]
            .iter()
            .flatten()
            .map(|p| p.unsigned_area())
            .sum();
        assert!((total - polygon.unsigned_area()).abs() < 1e-9);
    }
}
