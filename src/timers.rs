use std::time::{Duration, Instant};

/// Delay and sound timers. Both count down at 60 Hz and stop at zero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Timers {
    pub delay: u8,
    pub sound: u8,
}

impl Timers {
    pub fn tick(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }

    pub fn sound_active(&self) -> bool {
        self.sound > 0
    }
}

/// Converts wall time into a count of due ticks at a fixed rate.
///
/// Tick counts are derived from the total time since the clock started, so
/// rounding never accumulates and a host that polls irregularly still sees
/// exactly `hz` ticks per second on average.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    hz: u64,
    start: Instant,
    emitted: u64,
}

impl Clock {
    pub fn new(hz: u32, now: Instant) -> Self {
        Self {
            hz: u64::from(hz),
            start: now,
            emitted: 0,
        }
    }

    pub fn hz(&self) -> u32 {
        self.hz as u32
    }

    /// Number of ticks that became due since the previous call.
    pub fn due(&mut self, now: Instant) -> u32 {
        let elapsed = now.saturating_duration_since(self.start).as_nanos();
        let total = (elapsed * u128::from(self.hz) / 1_000_000_000) as u64;
        let due = total.saturating_sub(self.emitted);
        self.emitted = total;
        u32::try_from(due).unwrap_or(u32::MAX)
    }

    /// Time left until the next tick falls due.
    pub fn until_next(&self, now: Instant) -> Duration {
        if self.hz == 0 {
            return Duration::MAX;
        }
        let next_nanos = (u128::from(self.emitted) + 1) * 1_000_000_000 / u128::from(self.hz);
        let next = self.start + Duration::from_nanos(next_nanos as u64);
        next.saturating_duration_since(now)
    }
}
