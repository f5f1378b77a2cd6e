//! # Linear interpolation
//!
//! Resample a [`Track`] on a regular time axis `t0, t0 + step, …` up to and
//! including the last timestamp that does not exceed the final report.
//!
//! Longitudes and latitudes are interpolated linearly in degree space, as are
//! `cog` and `sog`. Tracks with a single row pass through unchanged. The zone
//! column is dropped: interpolation must run before geofencing.
use crate::{
    constants::{Degree, EpochSeconds},
    track::Track,
    AisGraphError,
};

/// Linear interpolation of `track` every `step` seconds.
///
/// Arguments
/// -----------------
/// * `track`: time-ordered input track.
/// * `step`: sampling interval in seconds (> 0).
///
/// Return
/// ----------
/// * The resampled track, keeping the MMSI, label and static attributes.
/// * [`AisGraphError::InvalidParameter`] for a non-positive step.
pub fn interpolate(track: &Track, step: EpochSeconds) -> Result<Track, AisGraphError> {
    if step <= 0 {
        return Err(AisGraphError::InvalidParameter(format!(
            "interpolation step must be > 0 seconds, got {step}"
        )));
    }
    Ok(resample(track, step))
}

/// Resampling core of [`interpolate`]; `step` is already known to be positive.
pub(crate) fn resample(track: &Track, step: EpochSeconds) -> Track {
    debug_assert!(step > 0);
    if track.len() <= 1 {
        return track.clone();
    }

    let time = track.time();
    let (t0, tn) = (time[0], time[track.len() - 1]);
    // widened so that neither the span nor the last grid point can overflow
    let (t0, step) = (i128::from(t0), i128::from(step));
    let steps = (i128::from(tn) - t0) / step;
    let grid: Vec<EpochSeconds> = (0..=steps)
        .map(|k| (t0 + k * step) as EpochSeconds)
        .collect();

    let resample_column = |col: &[Degree]| -> Vec<Degree> {
        let mut seg = 0usize;
        grid.iter()
            .map(|t| {
                while seg + 2 < time.len() && time[seg + 1] <= *t {
                    seg += 1;
                }
                let (ta, tb) = (time[seg], time[seg + 1]);
                if tb == ta || *t <= ta {
                    return col[seg];
                }
                if *t >= tb {
                    return col[seg + 1];
                }
                let w = (*t as f64 - ta as f64) / (tb as f64 - ta as f64);
                col[seg] + (col[seg + 1] - col[seg]) * w
            })
            .collect()
    };

    let lon = resample_column(track.lon());
    let lat = resample_column(track.lat());
    let cog = resample_column(track.cog());
    let sog = resample_column(track.sog());
    track.with_columns(grid, lon, lat, cog, sog)
}
