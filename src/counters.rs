//! Counters for benchmarking the constraint phases.

use std::fmt::{Display, Formatter, Result};

/// A timer accumulating elapsed wall-clock time across resume/pause pairs.
#[derive(Copy, Clone, Debug, Default)]
pub struct Timer {
    time: f64,
    start: Option<instant::Instant>,
}

impl Timer {
    /// A stopped timer at zero.
    pub fn new() -> Self {
        Timer {
            time: 0.0,
            start: None,
        }
    }

    /// Resets the accumulated time to zero and stops the timer.
    pub fn reset(&mut self) {
        self.time = 0.0;
        self.start = None;
    }

    /// Starts (or restarts) measuring.
    pub fn resume(&mut self) {
        self.start = Some(instant::Instant::now());
    }

    /// Stops measuring and accumulates the elapsed time.
    pub fn pause(&mut self) {
        if let Some(start) = self.start.take() {
            self.time += start.elapsed().as_secs_f64();
        }
    }

    /// The accumulated time, in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }
}

impl Display for Timer {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "{}s", self.time)
    }
}

/// Counters for one correction phase.
#[derive(Copy, Clone, Debug, Default)]
pub struct StageCounters {
    /// Fixed-point iterations performed by the last call.
    pub iterations: usize,
    /// Wall-clock time spent in the last call.
    pub time: Timer,
}

impl StageCounters {
    /// Resets the iteration count and the timer.
    pub fn reset(&mut self) {
        self.iterations = 0;
        self.time.reset();
    }
}

/// Performance counters of the constraint solver.
///
/// Iteration counts are always maintained; timers are only updated when
/// `enabled` is set, to keep the disabled path free of clock reads.
#[derive(Copy, Clone, Debug)]
pub struct Counters {
    /// Whether the timers are updated.
    pub enabled: bool,
    /// Counters of the position-correction phase.
    pub position_correction: StageCounters,
    /// Counters of the velocity-correction phase.
    pub velocity_correction: StageCounters,
}

impl Counters {
    /// Creates a set of counters, with timing enabled or not.
    pub fn new(enabled: bool) -> Self {
        Counters {
            enabled,
            position_correction: StageCounters::default(),
            velocity_correction: StageCounters::default(),
        }
    }
}

impl Default for Counters {
    fn default() -> Self {
        Counters::new(false)
    }
}
