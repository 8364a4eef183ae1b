use std::time::Duration;

/// Decides when each request of a fan-out may be released, relative to the start of the fan-out.
///
/// Offsets must not decrease with the index.
pub trait DispatchSchedule: Send + Sync {
    fn release_offset(&self, index: usize) -> Duration;
}

/// Releases request `i` at `i * interval`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedIntervalSchedule {
    interval: Duration,
}

pub const DEFAULT_DESCRIBE_INTERVAL: Duration = Duration::from_millis(50);

impl FixedIntervalSchedule {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for FixedIntervalSchedule {
    fn default() -> Self {
        Self::new(DEFAULT_DESCRIBE_INTERVAL)
    }
}

impl DispatchSchedule for FixedIntervalSchedule {
    fn release_offset(&self, index: usize) -> Duration {
        self.interval
            .saturating_mul(u32::try_from(index).unwrap_or(u32::MAX))
    }
}

/// Releases every request immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unthrottled;

impl DispatchSchedule for Unthrottled {
    fn release_offset(&self, _index: usize) -> Duration {
        Duration::ZERO
    }
}
