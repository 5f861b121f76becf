//! Synthetic timeline for generated transactions
//!
//! Scenarios never read the wall clock while building a graph. Every
//! timestamp is an offset in minutes from the template's base time, so the
//! same seed always yields the same timeline.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Converts minute offsets into UTC timestamps
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use scenario_forge_core_rs::SyntheticClock;
///
/// let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let mut clock = SyntheticClock::new(base);
/// clock.advance_minutes(90);
/// assert_eq!(clock.elapsed_minutes(), 90);
/// assert_eq!(clock.now(), base + chrono::Duration::minutes(90));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticClock {
    /// Timestamp of minute zero
    base: DateTime<Utc>,
    /// Minutes elapsed since `base`
    elapsed_minutes: i64,
}

impl SyntheticClock {
    /// Create a clock positioned at `base`
    pub fn new(base: DateTime<Utc>) -> Self {
        Self {
            base,
            elapsed_minutes: 0,
        }
    }

    /// Advance the clock
    ///
    /// # Panics
    /// Panics if `minutes` is negative; synthetic time only moves forward.
    pub fn advance_minutes(&mut self, minutes: i64) {
        assert!(minutes >= 0, "clock cannot move backwards");
        self.elapsed_minutes += minutes;
    }

    /// Current timestamp
    pub fn now(&self) -> DateTime<Utc> {
        self.at_offset(self.elapsed_minutes)
    }

    /// Timestamp at an arbitrary minute offset from the base
    pub fn at_offset(&self, minutes: i64) -> DateTime<Utc> {
        self.base + Duration::minutes(minutes)
    }

    pub fn elapsed_minutes(&self) -> i64 {
        self.elapsed_minutes
    }

    pub fn base(&self) -> DateTime<Utc> {
        self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    #[should_panic(expected = "clock cannot move backwards")]
    fn test_negative_advance_panics() {
        SyntheticClock::new(base()).advance_minutes(-1);
    }

    #[test]
    fn test_offsets_cross_day_boundary() {
        let clock = SyntheticClock::new(base());
        let ts = clock.at_offset(24 * 60 + 30);
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 2, 0, 30, 0).unwrap());
    }
}
