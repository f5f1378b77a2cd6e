//! # Constants and type definitions for aisgraph
//!
//! This module centralizes the **physical constants**, **conversion factors**, and **common type
//! definitions** used throughout the `aisgraph` library.
//!
//! ## Overview
//!
//! - Earth model used by every great-circle computation
//! - Unit conversions (m/s ↔ knots)
//! - Core type aliases used across the crate
//! - Zone sentinels used by geofencing and transit extraction
//!
//! A single Earth radius is used everywhere so that distances, speeds and the
//! zone pre-filter radii stay mutually consistent.

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// Spherical Earth radius in meters, shared by all distance computations
pub const EARTH_RADIUS_METERS: f64 = 6_367_000.0;

/// Meters per second → knots
pub const MPS_TO_KNOTS: f64 = 1.9438445;

/// Smallest elapsed time (seconds) used as a speed denominator
pub const MIN_ELAPSED_SECONDS: f64 = 1.0;

/// Consecutive longitudes further apart than this (degrees) are treated as corrupted input
pub const LONGITUDE_JUMP_TOLERANCE: f64 = 300.0;

/// Pathway count above which the denoising encoder warns about fragmented input
pub const MAX_PATHWAYS_WARNING: usize = 100;

/// Zone name assigned to positions outside every zone of a domain
pub const ZONE_NONE: &str = "Z0";

/// Receiver sentinel for transits whose destination is unresolved, also used for
/// statistics that cannot be computed on single-point ranges
pub const NULL_SENTINEL: &str = "NULL";

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Distance in meters
pub type Meter = f64;
/// Speed in knots
pub type Knot = f64;
/// Seconds since 1970-01-01T00:00:00 UTC
pub type EpochSeconds = i64;
/// Maritime Mobile Service Identity, the broadcast vessel identifier
pub type Mmsi = u32;
