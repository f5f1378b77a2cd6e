//! Per-vessel progress reporting (feature `progress`).
//!
//! [`VesselProgress`] wraps an `indicatif` bar shared by the workers of a run. Each
//! finished vessel updates the bar message with the time since the previous vessel
//! and a smoothed average `avg ← α·dt + (1–α)·avg`, seeded with the first sample.
use std::sync::Mutex;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

/// Weight of the newest sample in the running average.
const SMOOTHING: f64 = 0.2;

/// Completion times of the vessels seen so far.
#[derive(Debug)]
struct VesselTiming {
    previous: Instant,
    smoothed: Option<f64>,
}

impl VesselTiming {
    fn start() -> Self {
        VesselTiming {
            previous: Instant::now(),
            smoothed: None,
        }
    }

    /// Record a finished vessel at `now`; returns `(elapsed, smoothed average)`.
    fn record(&mut self, now: Instant) -> (Duration, Duration) {
        let elapsed = now.saturating_duration_since(self.previous);
        self.previous = now;
        let secs = elapsed.as_secs_f64();
        let avg = match self.smoothed {
            Some(avg) => SMOOTHING * secs + (1.0 - SMOOTHING) * avg,
            None => secs,
        };
        self.smoothed = Some(avg);
        (elapsed, Duration::from_secs_f64(avg))
    }
}

/// Compact duration label: `"850µs"`, `"42.5ms"`, `"3.14s"`, `"2m05s"`.
fn short(d: Duration) -> String {
    let secs = d.as_secs_f64();
    match secs {
        s if s < 1e-3 => format!("{}µs", d.as_micros()),
        s if s < 1.0 => format!("{:.1}ms", s * 1e3),
        s if s < 60.0 => format!("{s:.2}s"),
        _ => format!("{}m{:02}s", d.as_secs() / 60, d.as_secs() % 60),
    }
}

/// Progress bar over vessel batches, safe to tick from several workers.
pub struct VesselProgress {
    bar: ProgressBar,
    timing: Mutex<VesselTiming>,
}

impl VesselProgress {
    /// Bar of `len` vessels, or a spinner when the batch count is unknown.
    pub fn new(len: Option<usize>) -> Self {
        let (bar, template) = match len {
            Some(n) => (
                ProgressBar::new(n.max(1) as u64),
                "{bar:40.cyan/blue} {pos}/{len} vessels ({percent:>3}%) | {per_sec} | ETA {eta_precise} | {msg}",
            ),
            None => (
                ProgressBar::new_spinner(),
                "{spinner} {pos} vessels | {per_sec} | {msg}",
            ),
        };
        bar.set_style(
            ProgressStyle::with_template(template).unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar.enable_steady_tick(Duration::from_millis(200));
        VesselProgress {
            bar,
            timing: Mutex::new(VesselTiming::start()),
        }
    }

    /// Record one processed vessel.
    pub fn tick(&self) {
        if let Ok(mut timing) = self.timing.lock() {
            let (last, avg) = timing.record(Instant::now());
            self.bar
                .set_message(format!("last: {}, avg: {}", short(last), short(avg)));
        }
        self.bar.inc(1);
    }

    pub fn finish(&self) {
        self.bar.disable_steady_tick();
        self.bar.finish_and_clear();
    }
}
