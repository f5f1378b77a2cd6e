//! # Domain: a named collection of zones
//!
//! A [`Domain`] answers the question *"which zone contains this position?"* for a
//! fixed set of non-antimeridian-spanning [`Zone`]s.
//!
//! ## Containment query
//! -----------------
//! [`Domain::point_in_polygon`] runs in two stages:
//!
//! 1. **Pre-filter** – for every zone compute `distance(point, centroid) - max_radius`
//!    and keep the zones where this margin is negative, sorted ascending.
//! 2. **Exact test** – test polygon containment in that order and return the first
//!    zone that contains the point.
//!
//! When no zone qualifies the sentinel [`ZONE_NONE`] (`"Z0"`) is returned. With
//! overlapping zones the result is therefore the containing zone whose centroid
//! margin is the most negative.
//!
//! ## Invariants
//! -----------------
//! * Zone names are unique and never equal to a sentinel.
//! * Every zone longitude lies within `[-180, 180]`.
//! * The domain bounding box satisfies `xmin < xmax`, `ymin < ymax` and lies
//!   within `[-180, 180] × [-90, 90]`.
//!
//! ## See also
//! ------------
//! * [`Zone`] – Geometry, centroid and radius of one zone.
//! * [`zone_file`] – Loading zones from text files.
//! * [`antimeridian`] – Split proposals for zones crossing ±180°.
use ahash::RandomState;
use camino::Utf8Path;
use log::debug;
use ordered_float::OrderedFloat;
use std::collections::HashMap;
use std::fmt;

use crate::{
    constants::{Degree, Meter, NULL_SENTINEL, ZONE_NONE},
    geodesy::BoundingBox,
    track::ZoneName,
    AisGraphError,
};

pub mod antimeridian;
pub mod zone;
pub mod zone_file;

use antimeridian::split_antimeridian;
pub use zone::Zone;
pub use zone_file::load_zones_dir;

#[derive(Debug, Clone)]
pub struct Domain {
    name: String,
    zones: Vec<Zone>,
    index: HashMap<ZoneName, usize, RandomState>,
    bounds: BoundingBox,
    none: ZoneName,
}

impl Domain {
    /// Build a domain from its zones.
    ///
    /// Arguments
    /// -----------------
    /// * `name`: domain name, used in logs and errors.
    /// * `zones`: at least one zone; order is kept and breaks pre-filter ties.
    ///
    /// Return
    /// ----------
    /// * The domain, or
    ///   * [`AisGraphError::EmptyDomain`] without zones,
    ///   * [`AisGraphError::DuplicateZone`] when two zones share a name,
    ///   * [`AisGraphError::InvalidParameter`] when a zone uses a reserved name,
    ///   * [`AisGraphError::AntimeridianSpan`] when a zone leaves `[-180, 180]`
    ///     (the error carries the split polygons to retry with),
    ///   * [`AisGraphError::InvalidDomainBounds`] for a degenerate bounding box.
    pub fn new(name: impl Into<String>, zones: Vec<Zone>) -> Result<Self, AisGraphError> {
        let name = name.into();
        if zones.is_empty() {
            return Err(AisGraphError::EmptyDomain(name));
        }

        let mut domain = Domain {
            bounds: zones[0].bbox(),
            name,
            zones: Vec::with_capacity(zones.len()),
            index: HashMap::with_capacity_and_hasher(zones.len(), RandomState::new()),
            none: ZoneName::from(ZONE_NONE),
        };

        for zone in zones {
            domain.add_zone(zone)?;
        }
        domain.check_bounds()?;

        debug!(
            "domain '{}': {} zone(s), bounds [{:.4}, {:.4}] × [{:.4}, {:.4}]",
            domain.name,
            domain.zones.len(),
            domain.bounds.xmin,
            domain.bounds.xmax,
            domain.bounds.ymin,
            domain.bounds.ymax
        );
        Ok(domain)
    }

    /// Build a domain from every `*.txt` zone file in `dir`.
    pub fn from_txt_dir(name: impl Into<String>, dir: &Utf8Path) -> Result<Self, AisGraphError> {
        Domain::new(name, load_zones_dir(dir)?)
    }

    fn add_zone(&mut self, zone: Zone) -> Result<(), AisGraphError> {
        if zone.name() == ZONE_NONE || zone.name() == NULL_SENTINEL {
            return Err(AisGraphError::InvalidParameter(format!(
                "zone name '{}' is reserved",
                zone.name()
            )));
        }
        if self.index.contains_key(zone.name()) {
            return Err(AisGraphError::DuplicateZone(zone.name().to_string()));
        }

        let bbox = zone.bbox();
        if bbox.xmin < -180.0 || bbox.xmax > 180.0 {
            return Err(AisGraphError::AntimeridianSpan {
                zone: zone.name().to_string(),
                min_lon: bbox.xmin,
                max_lon: bbox.xmax,
                splits: Box::new(split_antimeridian(zone.geometry())),
            });
        }

        self.bounds.expand(&bbox);
        self.index
            .insert(zone.shared_name().clone(), self.zones.len());
        self.zones.push(zone);
        Ok(())
    }

    fn check_bounds(&self) -> Result<(), AisGraphError> {
        let b = &self.bounds;
        if !(b.xmin < b.xmax && b.ymin < b.ymax) {
            return Err(AisGraphError::InvalidDomainBounds(format!(
                "empty extent [{}, {}] × [{}, {}]",
                b.xmin, b.xmax, b.ymin, b.ymax
            )));
        }
        if b.xmin < -180.0 || b.xmax > 180.0 || b.ymin < -90.0 || b.ymax > 90.0 {
            return Err(AisGraphError::InvalidDomainBounds(format!(
                "extent [{}, {}] × [{}, {}] leaves the globe",
                b.xmin, b.xmax, b.ymin, b.ymax
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Always `false` for a constructed domain.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn zone(&self, name: &str) -> Option<&Zone> {
        self.index.get(name).map(|i| &self.zones[*i])
    }

    /// Bounding box of all zones, as used to restrict the position query.
    #[inline]
    pub fn boundary(&self) -> BoundingBox {
        self.bounds
    }

    /// Zones passing the centroid pre-filter for `(x, y)`, most negative margin first.
    ///
    /// Return
    /// ----------
    /// * `(zone, margin)` pairs with `margin = distance(point, centroid) - max_radius < 0`.
    ///   Ties keep the domain order.
    pub fn nearest_zones(&self, x: Degree, y: Degree) -> Vec<(&Zone, Meter)> {
        let mut candidates: Vec<(&Zone, Meter)> = self
            .zones
            .iter()
            .map(|z| (z, z.centroid_margin(x, y)))
            .filter(|(_, margin)| *margin < 0.0)
            .collect();
        candidates.sort_by_key(|(_, margin)| OrderedFloat(*margin));
        candidates
    }

    /// Name of the zone containing `(x, y)`, or [`ZONE_NONE`].
    pub fn point_in_polygon(&self, x: Degree, y: Degree) -> &str {
        self.locate(x, y)
    }

    /// Shared name of the zone containing `(x, y)`, or the shared [`ZONE_NONE`].
    pub(crate) fn locate(&self, x: Degree, y: Degree) -> &ZoneName {
        if !self.bounds.contains(x, y) {
            return &self.none;
        }
        self.nearest_zones(x, y)
            .into_iter()
            .find(|(zone, _)| zone.contains(x, y))
            .map(|(zone, _)| zone.shared_name())
            .unwrap_or(&self.none)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Domain '{}'", self.name)?;
            for zone in &self.zones {
                let (cx, cy) = zone.centroid();
                writeln!(
                    f,
                    "  {:<16} centroid=({cx:>10.5}, {cy:>9.5})  max_radius={:>12.1} m",
                    zone.name(),
                    zone.max_radius()
                )?;
            }
            Ok(())
        } else {
            write!(f, "Domain '{}' ({} zones)", self.name, self.zones.len())
        }
    }
}

#[cfg(test)]
mod domain_test {
    use super::*;

    fn square(name: &str, x0: f64, x1: f64, y0: f64, y1: f64) -> Zone {
        Zone::from_coords(name, &[x0, x0, x1, x1, x0], &[y0, y1, y1, y0, y0]).unwrap()
    }

    #[test]
    fn test_point_in_polygon() {
        let domain = Domain::new("test", vec![square("Z1", -41.0, -40.0, 60.0, 61.0)]).unwrap();
        assert_eq!(domain.point_in_polygon(-40.5, 60.5), "Z1");
        assert_eq!(domain.point_in_polygon(10.0, 10.0), ZONE_NONE);
        // inside the domain box but outside the zone
        assert_eq!(domain.point_in_polygon(-41.0, 60.5), ZONE_NONE);
    }

    #[test]
    fn test_overlapping_zones_rank_by_margin() {
        let domain = Domain::new(
            "overlap",
            vec![
                square("large", 0.0, 10.0, 0.0, 10.0),
                square("small", 1.0, 3.0, 1.0, 3.0),
            ],
        )
        .unwrap();
        // large: ~471 km - ~786 km, small: 0 - ~157 km
        assert_eq!(domain.point_in_polygon(2.0, 2.0), "large");
        assert_eq!(domain.point_in_polygon(8.0, 8.0), "large");

        let ranked = domain.nearest_zones(2.0, 2.0);
        let names: Vec<&str> = ranked.iter().map(|(z, _)| z.name()).collect();
        assert_eq!(names, vec!["large", "small"]);
        assert!(ranked[0].1 < ranked[1].1 && ranked[1].1 < 0.0);

        // only the small zone is a candidate outside the large one
        let disjoint = Domain::new(
            "disjoint",
            vec![
                square("large", 0.0, 10.0, 0.0, 10.0),
                square("small", 20.0, 21.0, 0.0, 1.0),
            ],
        )
        .unwrap();
        assert_eq!(disjoint.point_in_polygon(20.5, 0.5), "small");
    }

    #[test]
    fn test_boundary() {
        let domain = Domain::new(
            "two",
            vec![
                square("a", -10.0, -5.0, 40.0, 45.0),
                square("b", 3.0, 4.0, 50.0, 52.0),
            ],
        )
        .unwrap();
        assert_eq!(
            domain.boundary(),
            BoundingBox {
                xmin: -10.0,
                xmax: 4.0,
                ymin: 40.0,
                ymax: 52.0
            }
        );
        assert!(domain.zone("b").is_some());
        assert!(domain.zone("c").is_none());
        assert_eq!(format!("{domain}"), "Domain 'two' (2 zones)");
        assert!(format!("{domain:#}").contains("max_radius"));
    }

    #[test]
    fn test_construction_errors() {
        assert_eq!(
            Domain::new("none", vec![]).unwrap_err(),
            AisGraphError::EmptyDomain("none".into())
        );
        assert_eq!(
            Domain::new(
                "dup",
                vec![square("a", 0.0, 1.0, 0.0, 1.0), square("a", 2.0, 3.0, 0.0, 1.0)]
            )
            .unwrap_err(),
            AisGraphError::DuplicateZone("a".into())
        );
        assert!(matches!(
            Domain::new("reserved", vec![square(ZONE_NONE, 0.0, 1.0, 0.0, 1.0)]),
            Err(AisGraphError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_antimeridian_zone_is_rejected_with_splits() {
        let err = Domain::new("pacific", vec![square("dateline", 170.0, 190.0, -5.0, 5.0)])
            .unwrap_err();
        match err {
            AisGraphError::AntimeridianSpan {
                zone,
                max_lon,
                splits,
                ..
            } => {
                assert_eq!(zone, "dateline");
                assert_eq!(max_lon, 190.0);
                assert!(splits.east.is_some());
                assert!(splits.interior.is_some());
                assert!(splits.west.is_none());

                // the proposals build a valid domain
                let retry = Domain::new(
                    "pacific",
                    vec![
                        Zone::new("dateline_east", splits.east.unwrap()).unwrap(),
                        Zone::new("dateline", splits.interior.unwrap()).unwrap(),
                    ],
                )
                .unwrap();
                assert_eq!(retry.point_in_polygon(-175.0, 0.0), "dateline_east");
                assert_eq!(retry.point_in_polygon(175.0, 0.0), "dateline");
            }
            other => panic!("unexpected error {other:?}"),
        }

        assert!(matches!(
            Domain::new("atlantic", vec![square("west", -185.0, -170.0, 0.0, 5.0)]),
            Err(AisGraphError::AntimeridianSpan { .. })
        ));
    }
}
