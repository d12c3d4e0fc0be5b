//! Tick clock.
use std::{
    thread,
    time::{Duration, Instant},
};

use crate::constants::NANOS_IN_SECOND;

/// Clock frequency, in hertz (per second)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(transparent))]
pub struct Hz(pub u64);

impl From<Hz> for Duration {
    fn from(freq: Hz) -> Self {
        if freq.0 == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(NANOS_IN_SECOND / freq.0)
        }
    }
}

/// Timer to synchronize a host thread with the logical tick rate of the VM.
///
/// The VM itself has no notion of wall-clock time. One step is one tick.
/// Hosts that want to run programs at a steady speed call [`Clock::wait`]
/// before each step.
///
/// When the host stops stepping for a while (paused, blocked on input),
/// the elapsed time is not caught up. It simply continues at the next cycle.
pub struct Clock {
    interval: Duration,
    last: Instant,
}

impl Clock {
    /// Creates a new clock with the current time as internal state.
    pub fn new(freq: Hz) -> Self {
        Self {
            interval: freq.into(),
            last: Instant::now(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// A clock at 0 Hz never waits.
    pub fn is_unthrottled(&self) -> bool {
        self.interval.is_zero()
    }

    /// Set the clock state back to zero.
    pub fn reset(&mut self) {
        self.last = Instant::now()
    }

    /// Block the current thread until the next clock cycle.
    pub fn wait(&mut self) {
        if self.is_unthrottled() {
            return;
        }

        loop {
            if self.last.elapsed() < self.interval {
                // Sleep does not have enough resolution, and causes
                // the clock to run at 30 FPS.
                //
                // Spinning a loop causes high CPU usage and fan madness.
                //
                // Yielding in a loop is the best alternative.
                thread::yield_now();
            } else {
                // Reset back to zero, rather than trying to catch up.
                self.reset();
                return;
            }
        }
    }
}
