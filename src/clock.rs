//! Monotonic clock source
//!
//! Provides a wall-clock timestamp that never goes backward, used when
//! computing default query windows.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// A clock source that guarantees monotonically increasing timestamps.
///
/// Query windows are anchored at "now"; if the wall clock steps backward
/// (e.g. NTP adjustment) between two scheduled cycles, consecutive windows
/// could otherwise overlap in surprising ways.
pub struct BoundedClock {
    /// High-water mark: the largest timestamp we've ever returned (nanos)
    high_water_ns: AtomicI64,
}

impl BoundedClock {
    pub fn new() -> Self {
        Self {
            high_water_ns: AtomicI64::new(0),
        }
    }

    /// Returns a monotonically increasing nanosecond timestamp.
    ///
    /// If the wall clock has gone backward, returns the previous
    /// high-water mark + 1ns instead.
    pub fn now_nanos(&self) -> i64 {
        let wall = Utc::now().timestamp_nanos_opt().unwrap_or(0);
        loop {
            let prev = self.high_water_ns.load(Ordering::Acquire);
            let ts = wall.max(prev + 1);
            match self.high_water_ns.compare_exchange_weak(
                prev,
                ts,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return ts,
                Err(_) => continue, // CAS failed, retry
            }
        }
    }

    /// Returns `chrono::DateTime<Utc>` from the monotonic clock.
    pub fn now(&self) -> DateTime<Utc> {
        let ns = self.now_nanos();
        DateTime::from_timestamp_nanos(ns)
    }

    /// Returns whole epoch seconds from the monotonic clock.
    ///
    /// This is the resolution the monitoring API's query intervals use.
    pub fn now_epoch_seconds(&self) -> i64 {
        self.now_nanos() / 1_000_000_000
    }
}

impl Default for BoundedClock {
    fn default() -> Self {
        Self::new()
    }
}
