//! Throughput and ETA accounting for a campaign run.

use launch_core::types::{CampaignReport, ProgressReport, Wing};
use std::time::{Duration, Instant};

const SECS_PER_HOUR: f64 = 3600.0;

/// Counts processed contacts and produces a progress report every
/// `interval` contacts. Purely advisory; never affects control flow.
#[derive(Debug)]
pub struct ProgressTracker {
    total: usize,
    interval: usize,
    processed: usize,
    succeeded: usize,
    started: Instant,
    send_time: Duration,
    last_latency: Duration,
}

impl ProgressTracker {
    pub fn new(total: usize, interval: usize) -> Self {
        Self {
            total,
            interval,
            processed: 0,
            succeeded: 0,
            started: Instant::now(),
            send_time: Duration::ZERO,
            last_latency: Duration::ZERO,
        }
    }

    pub fn record_success(&mut self, latency: Duration) {
        self.processed += 1;
        self.succeeded += 1;
        self.send_time += latency;
        self.last_latency = latency;
    }

    pub fn record_failure(&mut self) {
        self.processed += 1;
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    /// A report when the processed count just reached a multiple of the
    /// interval. Call once after every recorded contact.
    pub fn checkpoint(&self) -> Option<ProgressReport> {
        if self.interval == 0 || self.processed == 0 || self.processed % self.interval != 0 {
            return None;
        }
        Some(self.snapshot())
    }

    pub fn snapshot(&self) -> ProgressReport {
        let avg_latency_secs = if self.succeeded == 0 {
            0.0
        } else {
            self.send_time.as_secs_f64() / self.succeeded as f64
        };
        ProgressReport {
            processed: self.processed,
            succeeded: self.succeeded,
            total: self.total,
            hours_elapsed: self.started.elapsed().as_secs_f64() / SECS_PER_HOUR,
            avg_latency_secs,
            last_latency_secs: self.last_latency.as_secs_f64(),
            hours_remaining: hours_remaining(
                self.total.saturating_sub(self.processed),
                self.last_latency,
            ),
        }
    }

    pub fn finish(self, segment: &str, wing: Wing, aborted: Option<String>) -> CampaignReport {
        CampaignReport {
            segment: segment.to_string(),
            wing,
            total: self.total,
            attempted: self.processed,
            succeeded: self.succeeded,
            failed: self.processed - self.succeeded,
            elapsed_secs: self.started.elapsed().as_secs_f64(),
            aborted,
        }
    }
}

/// Projected hours left if every remaining message takes as long as the
/// most recent one.
pub fn hours_remaining(remaining: usize, last_latency: Duration) -> f64 {
    remaining as f64 * last_latency.as_secs_f64() / SECS_PER_HOUR
}
