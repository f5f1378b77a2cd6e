//! # Geofencing
//!
//! Attach the `in_zone` column to tracks by querying a [`Domain`] for every
//! position, and optionally keep only the positions that fall inside a zone.
//!
//! Both operations are pure: the input track is never modified.
use crate::{constants::ZONE_NONE, domain::Domain, track::Track};

/// Return `track` with its `in_zone` column.
///
/// A track already carrying the column is returned unchanged, so that
/// `fence(&fence(t, d), d) == fence(t, d)`.
pub fn fence(track: &Track, domain: &Domain) -> Track {
    let mut fenced = track.clone();
    if fenced.in_zone().is_none() {
        let in_zone = track
            .lon()
            .iter()
            .zip(track.lat())
            .map(|(x, y)| domain.locate(*x, *y).clone())
            .collect();
        fenced.attach_zones(in_zone);
    }
    fenced
}

/// Fence `track` and keep only the positions inside a zone.
///
/// Return
/// ----------
/// * `None` when every position lies outside the domain zones.
pub fn zone_mask(track: &Track, domain: &Domain) -> Option<Track> {
    let fenced = fence(track, domain);
    let keep: Vec<bool> = fenced
        .in_zone()
        .unwrap_or_default()
        .iter()
        .map(|z| z.as_ref() != ZONE_NONE)
        .collect();
    fenced.select(&keep)
}
