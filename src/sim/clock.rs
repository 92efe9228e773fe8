//! Time sources
//!
//! The simulation never reads a clock itself: the frame loop polls a
//! [`TimeSource`] and hands the elapsed milliseconds to [`super::tick`].

use std::time::Instant;

/// Monotonic, millisecond-resolution, non-decreasing clock
pub trait TimeSource {
    fn now_ms(&mut self) -> u64;
}

/// Wall clock backed by [`Instant`]
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemClock {
    fn now_ms(&mut self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Hand-driven clock for tests and headless runs
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: u64,
}

impl ManualClock {
    pub fn advance(&mut self, ms: u64) {
        self.now += ms;
    }
}

impl TimeSource for ManualClock {
    fn now_ms(&mut self) -> u64 {
        self.now
    }
}

/// Turns clock readings into per-tick deltas
#[derive(Debug, Clone)]
pub struct FrameTimer<T: TimeSource> {
    source: T,
    last: u64,
    /// Deltas above this are clamped (debugger pauses, window drags)
    max_delta_ms: u32,
}

impl<T: TimeSource> FrameTimer<T> {
    pub fn new(mut source: T, max_delta_ms: u32) -> Self {
        let last = source.now_ms();
        Self {
            source,
            last,
            max_delta_ms,
        }
    }

    /// Milliseconds since the previous call; a clock that went backwards
    /// reads as zero
    pub fn delta_ms(&mut self) -> u32 {
        let now = self.source.now_ms();
        let delta = now.saturating_sub(self.last);
        self.last = self.last.max(now);
        delta.min(self.max_delta_ms as u64) as u32
    }

    pub fn source_mut(&mut self) -> &mut T {
        &mut self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_timer_deltas() {
        let mut timer = FrameTimer::new(ManualClock::default(), 250);
        assert_eq!(timer.delta_ms(), 0);
        timer.source_mut().advance(16);
        assert_eq!(timer.delta_ms(), 16);
        timer.source_mut().advance(1000);
        assert_eq!(timer.delta_ms(), 250);
        assert_eq!(timer.delta_ms(), 0);
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let mut clock = SystemClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }
}
