//! # Lazy track pipelines
//!
//! [`TrackStream`] extends every `Iterator<Item = Track>` with the pipeline stages of
//! the crate. Each adapter pulls one track from its predecessor, processes it and
//! yields the result(s), so a pipeline holds roughly one vessel's data at a time.
//!
//! ```rust, no_run
//! use aisgraph::{track::stream::TrackStream, Domain, EncoderParams, SegmentationRule, Track};
//!
//! # fn demo(tracks: Vec<Track>, domain: &Domain) -> Result<(), aisgraph::AisGraphError> {
//! let rule = SegmentationRule::new(7 * 24 * 3600)?;
//! let fenced: Vec<Track> = tracks
//!     .into_iter()
//!     .encode(EncoderParams::default())
//!     .split_timedelta(rule)
//!     .fence(domain)
//!     .collect();
//! # Ok(())
//! # }
//! ```
use crate::{
    constants::EpochSeconds,
    denoising_encoder::{self, EncoderParams},
    domain::Domain,
    geofence,
    track::{interp, segmentation, segmentation::SegmentationRule, Track},
};

pub trait TrackStream: Iterator<Item = Track> + Sized {
    /// Reconstruct pathways from every track.
    fn encode(self, params: EncoderParams) -> impl Iterator<Item = Track> {
        self.flat_map(move |track| denoising_encoder::encode(&track, &params))
    }

    /// Split every track on time gaps and longitude jumps.
    fn split_timedelta(self, rule: SegmentationRule) -> impl Iterator<Item = Track> {
        self.flat_map(move |track| segmentation::split_with_rule(&track, rule))
    }

    /// Resample every track every `step` seconds; `None` (or a non-positive step)
    /// passes tracks through.
    fn interpolate(self, step: Option<EpochSeconds>) -> impl Iterator<Item = Track> {
        self.map(move |track| match step {
            Some(step) if step > 0 => interp::resample(&track, step),
            _ => track,
        })
    }

    /// Attach the `in_zone` column to every track.
    fn fence<'a>(self, domain: &'a Domain) -> impl Iterator<Item = Track> {
        self.map(move |track| geofence::fence(&track, domain))
    }

    /// Keep only in-zone positions, dropping tracks left empty.
    fn zone_mask<'a>(self, domain: &'a Domain) -> impl Iterator<Item = Track> {
        self.filter_map(move |track| geofence::zone_mask(&track, domain))
    }
}

impl<I: Iterator<Item = Track>> TrackStream for I {}
