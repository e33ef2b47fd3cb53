pub mod slot;
pub mod timer;

pub use slot::TaskSlot;
pub use timer::{CalibrationStats, HighPrecisionTimer, ManualTimer, Timer};

pub const NANOS_PER_MS: u64 = 1_000_000;

/// Milliseconds to timer nanoseconds.
pub const fn ms(millis: u64) -> u64 {
    millis * NANOS_PER_MS
}
