//! # aisgraph
//!
//! Reconstruction of vessel trajectories from AIS position reports, geofencing
//! against a [`Domain`] of polygonal zones, and aggregation of zone-to-zone
//! transits into a network graph table.
//!
//! See also
//! ------------
//! * [`NetworkGraph`] – End-to-end pipeline over vessel batches.
//! * [`track::stream::TrackStream`] – Lazy per-track pipeline stages.
pub mod aisgraph_errors;
pub mod constants;
pub mod denoising_encoder;
pub mod domain;
pub mod geodesy;
pub mod geofence;
pub mod network_graph;
pub mod track;

pub use aisgraph_errors::AisGraphError;
pub use denoising_encoder::{EncoderParams, EncoderParamsBuilder};
pub use domain::{Domain, Zone};
pub use network_graph::{
    EdgeFilter, GraphParams, GraphParamsBuilder, GraphReport, NetworkGraph, TrackLengthStats,
    TransitEdge,
};
pub use track::{
    segmentation::SegmentationRule,
    vessel_batch::{PositionReport, VesselBatch},
    Track, VesselStatic, ZoneName,
};
