//! Campaign event bus: a trait for reporting campaign lifecycle and progress.
//!
//! The dispatcher accepts an `Arc<dyn EventSink>`; production runs log
//! events through `tracing`, tests capture them in memory.

use crate::types::{CampaignReport, ProgressReport};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CampaignEventType {
    CampaignStarted,
    NoContacts,
    SmsSent,
    SmsFailed,
    Progress,
    CampaignAborted,
    CampaignCompleted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignEvent {
    pub event_id: Uuid,
    pub event_type: CampaignEventType,
    pub segment: String,
    pub phone: Option<String>,
    pub detail: Option<String>,
    pub progress: Option<ProgressReport>,
    pub report: Option<CampaignReport>,
    pub timestamp: DateTime<Utc>,
}

impl CampaignEvent {
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_progress(mut self, progress: ProgressReport) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_report(mut self, report: CampaignReport) -> Self {
        self.report = Some(report);
        self
    }
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: CampaignEvent);
}

/// No-op sink for tests and callers that don't need events.
pub struct NoOpSink;

impl EventSink for NoOpSink {
    fn emit(&self, _event: CampaignEvent) {}
}

/// Writes every event as a structured log line. This is the operator's
/// view of a running campaign.
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: CampaignEvent) {
        let segment = event.segment.as_str();
        match event.event_type {
            CampaignEventType::CampaignStarted => info!(
                segment,
                detail = event.detail.as_deref().unwrap_or_default(),
                "Launch campaign starts now"
            ),
            CampaignEventType::NoContacts => warn!(
                segment,
                "No contacts have been found from your segment. Either all messages \
                 have already been sent (re-run with the same arguments) or the \
                 segment name does not exist"
            ),
            CampaignEventType::SmsSent => info!(
                segment,
                phone = event.phone.as_deref().unwrap_or_default(),
                detail = event.detail.as_deref().unwrap_or_default(),
                "Message has been sent"
            ),
            CampaignEventType::SmsFailed => warn!(
                segment,
                phone = event.phone.as_deref().unwrap_or_default(),
                reason = event.detail.as_deref().unwrap_or_default(),
                "Unable to send SMS, skipping contact"
            ),
            CampaignEventType::Progress => {
                if let Some(p) = &event.progress {
                    info!(
                        segment,
                        processed = p.processed,
                        succeeded = p.succeeded,
                        total = p.total,
                        hours_elapsed = p.hours_elapsed,
                        secs_per_message = p.last_latency_secs,
                        hours_left = p.hours_remaining,
                        "{} contacts marketed to",
                        p.processed
                    );
                }
            }
            CampaignEventType::CampaignAborted => warn!(
                segment,
                reason = event.detail.as_deref().unwrap_or_default(),
                "Exiting gracefully"
            ),
            CampaignEventType::CampaignCompleted => {
                if let Some(r) = &event.report {
                    info!(
                        segment,
                        succeeded = r.succeeded,
                        total = r.total,
                        failed = r.failed,
                        "{} contacts engaged successfully",
                        r.succeeded
                    );
                }
            }
        }
    }
}

/// In-memory sink that captures events for testing.
#[derive(Default)]
pub struct CaptureSink {
    events: Mutex<Vec<CampaignEvent>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<CampaignEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn count_type(&self, event_type: CampaignEventType) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| e.event_type == event_type)
            .count()
    }
}

impl EventSink for CaptureSink {
    fn emit(&self, event: CampaignEvent) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).push(event);
    }
}

/// Convenience builder for a `CampaignEvent` with no payload attached.
pub fn make_event(
    event_type: CampaignEventType,
    segment: impl Into<String>,
    phone: Option<String>,
) -> CampaignEvent {
    CampaignEvent {
        event_id: Uuid::new_v4(),
        event_type,
        segment: segment.into(),
        phone,
        detail: None,
        progress: None,
        report: None,
        timestamp: Utc::now(),
    }
}

pub fn noop_sink() -> Arc<dyn EventSink> {
    Arc::new(NoOpSink)
}

pub fn capture_sink() -> Arc<CaptureSink> {
    Arc::new(CaptureSink::new())
}
