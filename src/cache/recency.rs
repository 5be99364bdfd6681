//! Recency Module
//!
//! Defines the recency stamp used to order entries for LRU eviction.

use chrono::{DateTime, TimeZone, Utc};

// == Recency ==
/// Point in time at which an entry was last touched.
///
/// Ordered by wall-clock microseconds first, then by arrival sequence, so two
/// touches within the same microsecond still compare strictly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Recency {
    /// Unix timestamp in microseconds
    at_micros: i64,
    /// Arrival order, breaks ties on identical timestamps
    seq: u64,
}

impl Recency {
    // == Constructor ==
    /// Builds a recency stamp from its raw parts.
    pub fn new(at_micros: i64, seq: u64) -> Self {
        Self { at_micros, seq }
    }

    /// Returns the Unix timestamp in microseconds.
    #[allow(dead_code)]
    pub fn at_micros(&self) -> i64 {
        self.at_micros
    }

    /// Returns the arrival sequence number.
    #[allow(dead_code)]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Returns the wall-clock time of this stamp.
    #[allow(dead_code)]
    pub fn timestamp(&self) -> DateTime<Utc> {
        Utc.timestamp_micros(self.at_micros)
            .single()
            .unwrap_or_default()
    }
}

// == Recency Clock ==
/// Issues strictly increasing recency stamps.
///
/// The wall-clock part is clamped so it never moves backwards, which keeps
/// the ordering strict even if the system clock is adjusted.
#[derive(Debug, Default)]
pub struct RecencyClock {
    last_micros: i64,
    seq: u64,
}

impl RecencyClock {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Tick ==
    /// Returns a stamp newer than every stamp issued before it.
    pub fn tick(&mut self) -> Recency {
        let now = Utc::now().timestamp_micros();
        self.last_micros = self.last_micros.max(now);
        self.seq += 1;
        Recency::new(self.last_micros, self.seq)
    }
}
