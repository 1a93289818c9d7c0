//! Time-related utilities

use std::time::{Duration, Instant};

/// Host-side stopwatch.
///
/// `measure_start` / `measure_end` bracket the timed section; `get` returns the
/// elapsed time of the last completed measurement.
#[derive(Debug, Default, Clone, Copy)]
pub struct Timer {
    start: Option<Instant>,
    elapsed: Duration,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn measure_start(&mut self) {
        self.start = Some(Instant::now());
    }

    pub fn measure_end(&mut self) {
        if let Some(start) = self.start.take() {
            self.elapsed = start.elapsed();
        }
    }

    pub fn get(&self) -> Duration {
        self.elapsed
    }
}

/// Current local time formatted as RFC 3339, used to stamp reports
pub fn timestamp_rfc3339() -> String {
    chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, false)
}
