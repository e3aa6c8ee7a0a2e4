// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Clock sources for enqueue timestamps.
//!
//! Queue order is `createdAt` ascending, so timestamps handed out for new
//! items must never go backwards even if the wall clock does.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Trait for getting the current wall clock time.
///
/// This allows injecting a mock clock for testing.
pub trait ClockSource: Send + Sync {
    /// Returns the current time in milliseconds since Unix epoch.
    fn now_ms(&self) -> u64;
}

/// System clock implementation using `std::time::SystemTime`.
#[derive(Debug, Default)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0)
    }
}

impl<C: ClockSource> ClockSource for &C {
    fn now_ms(&self) -> u64 {
        (*self).now_ms()
    }
}

impl<C: ClockSource + ?Sized> ClockSource for std::sync::Arc<C> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// A manually driven clock. Useful for tests and replay tooling.
#[derive(Debug, Default)]
pub struct ManualClock {
    time_ms: AtomicU64,
}

impl ManualClock {
    /// Creates a clock frozen at the given time.
    pub fn new(initial_ms: u64) -> Self {
        ManualClock {
            time_ms: AtomicU64::new(initial_ms),
        }
    }

    /// Jumps to an absolute time (may move backwards).
    pub fn set(&self, ms: u64) {
        self.time_ms.store(ms, AtomicOrdering::SeqCst);
    }

    /// Moves the clock forward.
    pub fn advance(&self, ms: u64) {
        self.time_ms.fetch_add(ms, AtomicOrdering::SeqCst);
    }
}

impl ClockSource for ManualClock {
    fn now_ms(&self) -> u64 {
        self.time_ms.load(AtomicOrdering::SeqCst)
    }
}

/// Produces non-decreasing timestamps from a [`ClockSource`].
///
/// If the underlying clock goes backwards, the last issued time is repeated;
/// the store breaks such ties by insertion order.
pub struct MonotonicClock<C: ClockSource = SystemClock> {
    clock: C,
    last_ms: Mutex<u64>,
}

impl MonotonicClock<SystemClock> {
    /// Creates a monotonic clock over the system clock.
    pub fn system() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for MonotonicClock<SystemClock> {
    fn default() -> Self {
        Self::system()
    }
}

impl<C: ClockSource> MonotonicClock<C> {
    /// Creates a monotonic clock with a custom clock source.
    pub fn with_clock(clock: C) -> Self {
        MonotonicClock {
            clock,
            last_ms: Mutex::new(0),
        }
    }

    /// Raises the floor so later timestamps are at least `ms`.
    ///
    /// Used to carry the high-water mark over from timestamps already
    /// persisted by an earlier process.
    pub fn observe(&self, ms: u64) {
        let mut last = self.last_ms.lock().unwrap_or_else(|e| e.into_inner());
        if ms > *last {
            *last = ms;
        }
    }

    /// Returns the next timestamp in milliseconds.
    pub fn now_ms(&self) -> u64 {
        let physical = self.clock.now_ms();
        let mut last = self.last_ms.lock().unwrap_or_else(|e| e.into_inner());
        if physical > *last {
            *last = physical;
        }
        *last
    }

    /// Returns the next timestamp.
    pub fn now(&self) -> DateTime<Utc> {
        millis_to_datetime(self.now_ms())
    }
}

/// Converts milliseconds since the epoch into a UTC timestamp.
pub fn millis_to_datetime(ms: u64) -> DateTime<Utc> {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
