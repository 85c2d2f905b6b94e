// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sliding-window burst detection for offline throttling.

use std::collections::HashMap;
use std::time::Duration;

use mynah_core::{Readiness, SenderId};
use tokio::time::Instant;

/// Per-sender sliding-window arrival counter.
///
/// Throttling is an offline-only protection, not a general rate limiter:
/// [`BurstTracker::is_bursting`] never flags a sender while the pipeline is
/// ready, regardless of arrival rate. Timestamps come from
/// `tokio::time::Instant` so paused-clock tests can drive the window.
pub struct BurstTracker {
    windows: HashMap<SenderId, Vec<Instant>>,
    window: Duration,
    threshold: usize,
}

impl BurstTracker {
    pub fn new(window: Duration, threshold: usize) -> Self {
        Self {
            windows: HashMap::new(),
            window,
            threshold,
        }
    }

    /// Records an arrival now, prunes entries that have fallen out of the
    /// trailing window, and returns the post-prune count including this
    /// arrival. An entry exactly one window old is pruned.
    pub fn record_arrival(&mut self, identity: &SenderId) -> usize {
        let now = Instant::now();
        let times = self.windows.entry(identity.clone()).or_default();
        times.push(now);
        times.retain(|t| now.duration_since(*t) < self.window);
        times.len()
    }

    /// Whether this arrival pushes the sender over the burst threshold.
    ///
    /// Records the arrival as a side effect. Always false while ready.
    pub fn is_bursting(&mut self, identity: &SenderId, readiness: Readiness) -> bool {
        let count = self.record_arrival(identity);
        readiness == Readiness::NotReady && count > self.threshold
    }
}
