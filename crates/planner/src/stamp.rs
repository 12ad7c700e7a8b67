//! Trial stamps
//!
//! Wall-clock time with microsecond resolution, appended to output bases.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// Last stamp handed out in this process (microseconds since the epoch)
static LAST_STAMP_MICROS: AtomicI64 = AtomicI64::new(0);

/// Unique, strictly increasing timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrialStamp(i64);

impl TrialStamp {
    pub fn as_micros(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TrialStamp {
    /// `<seconds>.<microseconds>`, e.g. `1700000000.123456`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:06}",
            self.0.div_euclid(1_000_000),
            self.0.rem_euclid(1_000_000)
        )
    }
}

/// Next stamp: the current time, bumped past the previous stamp if the clock
/// has not moved on (or went backwards).
pub fn next_stamp() -> TrialStamp {
    let now = Utc::now().timestamp_micros();
    let mut last = LAST_STAMP_MICROS.load(Ordering::Relaxed);
    loop {
        let candidate = now.max(last + 1);
        match LAST_STAMP_MICROS.compare_exchange_weak(
            last,
            candidate,
            Ordering::SeqCst,
            Ordering::Relaxed,
        ) {
            Ok(_) => return TrialStamp(candidate),
            Err(actual) => last = actual,
        }
    }
}
