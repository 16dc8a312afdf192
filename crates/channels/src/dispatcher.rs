//! Campaign dispatcher. Sends one personalized SMS per segment contact.
//!
//! Contacts are processed strictly one after another: build the tracking
//! link, shorten it, render the template, send. A rejected send skips the
//! contact; an upstream outage fails the run; anything else ends the run
//! early and is recorded in the report.

use crate::http::build_client;
use crate::progress::ProgressTracker;
use crate::segments::{EdiSegmentSource, SegmentSource};
use crate::shortener::{FirebaseShortener, LinkShortener};
use crate::sms::{EngagementSmsGateway, SmsGateway};
use crate::tracking::build_tracking_link;
use launch_core::event_bus::{make_event, noop_sink, CampaignEventType, EventSink};
use launch_core::types::{
    CampaignReport, Contact, ContactOutcome, MessageTemplate, SenderId, SmsPayload, Wing,
};
use launch_core::{LaunchConfig, LaunchError, LaunchResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// One campaign launch: which segment, which wing, which message.
#[derive(Debug, Clone)]
pub struct CampaignRequest {
    pub segment: String,
    pub wing: Wing,
    pub template: MessageTemplate,
}

impl CampaignRequest {
    pub fn new(segment: impl Into<String>, wing: Wing, tracking_url: &str) -> Self {
        Self {
            segment: segment.into(),
            wing,
            template: MessageTemplate::for_wing(wing, tracking_url),
        }
    }
}

pub struct CampaignDispatcher {
    segments: Arc<dyn SegmentSource>,
    shortener: Arc<dyn LinkShortener>,
    gateway: Arc<dyn SmsGateway>,
    event_sink: Arc<dyn EventSink>,
    sender: SenderId,
    progress_interval: usize,
    stop: Arc<AtomicBool>,
}

impl CampaignDispatcher {
    pub fn new(
        segments: Arc<dyn SegmentSource>,
        shortener: Arc<dyn LinkShortener>,
        gateway: Arc<dyn SmsGateway>,
    ) -> Self {
        Self {
            segments,
            shortener,
            gateway,
            event_sink: noop_sink(),
            sender: SenderId::BeWell,
            progress_interval: 100,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Wire the HTTP-backed collaborators from configuration.
    pub fn from_config(config: &LaunchConfig) -> LaunchResult<Self> {
        let http = build_client(config)?;
        Ok(Self::new(
            Arc::new(EdiSegmentSource::new(http.clone(), config)),
            Arc::new(FirebaseShortener::new(http.clone(), config)),
            Arc::new(EngagementSmsGateway::new(http, config)),
        )
        .with_progress_interval(config.progress_interval))
    }

    /// Attach an event sink for progress and lifecycle events.
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = sink;
        self
    }

    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Setting the returned flag stops the run before the next contact.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    pub async fn run(&self, request: &CampaignRequest) -> LaunchResult<CampaignReport> {
        let segment = request.segment.as_str();
        let contacts = self.segments.fetch(segment, request.wing).await?;

        if contacts.is_empty() {
            self.event_sink
                .emit(make_event(CampaignEventType::NoContacts, segment, None));
            return Ok(CampaignReport::empty(segment, request.wing));
        }

        let total = contacts.len();
        self.event_sink.emit(
            make_event(CampaignEventType::CampaignStarted, segment, None)
                .with_detail(format!("{total} contacts found for {}", request.wing)),
        );

        let mut tracker = ProgressTracker::new(total, self.progress_interval);
        let mut aborted = None;

        for contact in &contacts {
            if self.stop.load(Ordering::Relaxed) {
                aborted = Some("interrupted".to_string());
                break;
            }

            match self.process_contact(contact, request).await {
                Ok(ContactOutcome::Sent { phone, latency }) => {
                    tracker.record_success(latency);
                    metrics::counter!("campaign.sms_sent").increment(1);
                    metrics::histogram!("campaign.sms_latency_ms")
                        .record(latency.as_millis() as f64);
                    self.event_sink.emit(
                        make_event(CampaignEventType::SmsSent, segment, Some(phone)).with_detail(
                            format!(
                                "message {} of {total} in {:.3}s",
                                tracker.processed(),
                                latency.as_secs_f64()
                            ),
                        ),
                    );
                }
                Ok(ContactOutcome::Failed { phone, reason }) => {
                    tracker.record_failure();
                    metrics::counter!("campaign.sms_failed").increment(1);
                    self.event_sink.emit(
                        make_event(CampaignEventType::SmsFailed, segment, Some(phone))
                            .with_detail(reason),
                    );
                }
                Err(e @ LaunchError::UpstreamUnavailable { .. }) => return Err(e),
                Err(e) => {
                    aborted = Some(e.to_string());
                    break;
                }
            }

            if let Some(progress) = tracker.checkpoint() {
                self.event_sink.emit(
                    make_event(CampaignEventType::Progress, segment, None).with_progress(progress),
                );
            }
        }

        let report = tracker.finish(segment, request.wing, aborted);
        if let Some(reason) = &report.aborted {
            warn!(segment, reason = %reason, "Campaign stopped early");
            self.event_sink.emit(
                make_event(CampaignEventType::CampaignAborted, segment, None)
                    .with_detail(reason.clone()),
            );
        }
        self.event_sink.emit(
            make_event(CampaignEventType::CampaignCompleted, segment, None)
                .with_report(report.clone()),
        );
        Ok(report)
    }

    async fn process_contact(
        &self,
        contact: &Contact,
        request: &CampaignRequest,
    ) -> LaunchResult<ContactOutcome> {
        if contact.phone.trim().is_empty() {
            return Err(LaunchError::Unexpected(format!(
                "contact {} has no phone number",
                contact.email
            )));
        }
        // The redirect can only attribute a visit through this identifier.
        if contact.email.trim().is_empty() {
            return Err(LaunchError::Unexpected(format!(
                "contact {} has no email",
                contact.phone
            )));
        }

        let message = self.build_message(contact, &request.template).await?;
        let payload = SmsPayload::new(&contact.phone, message, self.sender, Some(&request.segment));

        let started = Instant::now();
        match self.gateway.send(&payload).await {
            Ok(()) => Ok(ContactOutcome::Sent {
                phone: contact.phone.clone(),
                latency: started.elapsed(),
            }),
            Err(e) if e.is_recoverable() => {
                debug!(phone = %contact.phone, error = %e, "Send rejected, moving on");
                Ok(ContactOutcome::Failed {
                    phone: contact.phone.clone(),
                    reason: e.to_string(),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Render the template for one contact with a freshly shortened link.
    pub async fn build_message(
        &self,
        contact: &Contact,
        template: &MessageTemplate,
    ) -> LaunchResult<String> {
        let long_link = build_tracking_link(&template.tracking_url, &contact.email)?;
        let short_link = self.shortener.shorten(&long_link).await?;
        Ok(template.render(contact.payer_name(), &short_link))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::identifier_from_link;
    use async_trait::async_trait;
    use launch_core::event_bus::capture_sink;
    use std::sync::Mutex;

    struct FixedSegment(Vec<Contact>);

    #[async_trait]
    impl SegmentSource for FixedSegment {
        async fn fetch(&self, _segment: &str, _wing: Wing) -> LaunchResult<Vec<Contact>> {
            Ok(self.0.clone())
        }
    }

    struct DownSegment;

    #[async_trait]
    impl SegmentSource for DownSegment {
        async fn fetch(&self, _segment: &str, _wing: Wing) -> LaunchResult<Vec<Contact>> {
            Err(LaunchError::upstream("segment data", "HTTP 503"))
        }
    }

    /// Records every long link and hands back a numbered short link.
    #[derive(Default)]
    struct RecordingShortener {
        links: Mutex<Vec<String>>,
        fail_on: Option<usize>,
    }

    #[async_trait]
    impl LinkShortener for RecordingShortener {
        async fn shorten(&self, long_link: &str) -> LaunchResult<String> {
            let mut links = self.links.lock().unwrap();
            links.push(long_link.to_string());
            if self.fail_on == Some(links.len()) {
                return Err(LaunchError::upstream("link shortener", "HTTP 429"));
            }
            Ok(format!("https://bwl.page.link/{}", links.len()))
        }
    }

    /// Records payloads; rejects the phones in `reject`.
    #[derive(Default)]
    struct RecordingGateway {
        sent: Mutex<Vec<SmsPayload>>,
        reject: Vec<String>,
    }

    #[async_trait]
    impl SmsGateway for RecordingGateway {
        async fn send(&self, payload: &SmsPayload) -> LaunchResult<()> {
            self.sent.lock().unwrap().push(payload.clone());
            if self.reject.contains(&payload.to[0]) {
                return Err(LaunchError::SendFailed {
                    phone: payload.to[0].clone(),
                    reason: "HTTP 500".into(),
                });
            }
            Ok(())
        }
    }

    fn contact(n: usize) -> Contact {
        Contact {
            phone: format!("+2547000{n:05}"),
            firstname: Some(format!("Member{n}")),
            lastname: None,
            payor: Some("APA".into()),
            email: format!("member{n}@users.bewell.co.ke"),
        }
    }

    fn request() -> CampaignRequest {
        CampaignRequest::new("APA", Wing::A, "https://bewell.example/b")
    }

    fn dispatcher(
        contacts: Vec<Contact>,
        shortener: Arc<RecordingShortener>,
        gateway: Arc<RecordingGateway>,
    ) -> CampaignDispatcher {
        CampaignDispatcher::new(Arc::new(FixedSegment(contacts)), shortener, gateway)
    }

    #[tokio::test]
    async fn test_one_send_per_contact_in_order() {
        let contacts: Vec<Contact> = (1..=5).map(contact).collect();
        let gateway = Arc::new(RecordingGateway::default());
        let shortener = Arc::new(RecordingShortener::default());
        let report = dispatcher(contacts.clone(), shortener.clone(), gateway.clone())
            .run(&request())
            .await
            .unwrap();

        let sent = gateway.sent.lock().unwrap();
        let phones: Vec<&str> = sent.iter().map(|p| p.to[0].as_str()).collect();
        let expected: Vec<&str> = contacts.iter().map(|c| c.phone.as_str()).collect();
        assert_eq!(phones, expected);
        assert_eq!(shortener.links.lock().unwrap().len(), 5);
        assert_eq!(report.total, 5);
        assert_eq!(report.succeeded, 5);
        assert!(report.all_engaged());
    }

    #[tokio::test]
    async fn test_payload_for_wing_a_contact() {
        let jane = Contact {
            phone: "+254712345678".into(),
            firstname: Some("Jane".into()),
            lastname: None,
            payor: Some("APA".into()),
            email: "jane@users.bewell.co.ke".into(),
        };
        let gateway = Arc::new(RecordingGateway::default());
        let shortener = Arc::new(RecordingShortener::default());
        dispatcher(vec![jane], shortener.clone(), gateway.clone())
            .run(&request())
            .await
            .unwrap();

        let sent = gateway.sent.lock().unwrap();
        assert_eq!(sent[0].to, vec!["+254712345678".to_string()]);
        assert_eq!(sent[0].sender, SenderId::BeWell);
        assert_eq!(sent[0].segment.as_deref(), Some("APA"));
        assert!(sent[0].message.contains("link your APA medical cover"));
        assert!(sent[0].message.contains("Download Now https://bwl.page.link/1."));

        let long_link = &shortener.links.lock().unwrap()[0];
        assert_eq!(
            identifier_from_link(long_link).unwrap(),
            "jane@users.bewell.co.ke"
        );
    }

    #[tokio::test]
    async fn test_empty_segment_sends_nothing() {
        let gateway = Arc::new(RecordingGateway::default());
        let sink = capture_sink();
        let report = dispatcher(vec![], Arc::default(), gateway.clone())
            .with_event_sink(sink.clone())
            .run(&request())
            .await
            .unwrap();

        assert!(gateway.sent.lock().unwrap().is_empty());
        assert_eq!(report.total, 0);
        assert_eq!(sink.count_type(CampaignEventType::NoContacts), 1);
    }

    #[tokio::test]
    async fn test_rejected_send_is_skipped() {
        let contacts: Vec<Contact> = (1..=3).map(contact).collect();
        let gateway = Arc::new(RecordingGateway {
            reject: vec![contacts[1].phone.clone()],
            ..Default::default()
        });
        let sink = capture_sink();
        let report = dispatcher(contacts, Arc::default(), gateway.clone())
            .with_event_sink(sink.clone())
            .run(&request())
            .await
            .unwrap();

        assert_eq!(gateway.sent.lock().unwrap().len(), 3);
        assert_eq!(report.attempted, 3);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        assert!(report.aborted.is_none());
        assert_eq!(sink.count_type(CampaignEventType::SmsFailed), 1);
        assert_eq!(sink.count_type(CampaignEventType::SmsSent), 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_fails_run() {
        let gateway = Arc::new(RecordingGateway::default());
        let err = CampaignDispatcher::new(
            Arc::new(DownSegment),
            Arc::new(RecordingShortener::default()),
            gateway.clone(),
        )
        .run(&request())
        .await
        .unwrap_err();

        assert!(matches!(err, LaunchError::UpstreamUnavailable { .. }));
        assert!(gateway.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_shortener_failure_fails_run() {
        let contacts: Vec<Contact> = (1..=4).map(contact).collect();
        let gateway = Arc::new(RecordingGateway::default());
        let shortener = Arc::new(RecordingShortener {
            fail_on: Some(3),
            ..Default::default()
        });
        let err = dispatcher(contacts, shortener, gateway.clone())
            .run(&request())
            .await
            .unwrap_err();

        assert!(matches!(err, LaunchError::UpstreamUnavailable { service: "link shortener", .. }));
        assert_eq!(gateway.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_contact_without_phone_ends_run_early() {
        let mut contacts: Vec<Contact> = (1..=3).map(contact).collect();
        contacts[1].phone.clear();
        let gateway = Arc::new(RecordingGateway::default());
        let sink = capture_sink();
        let report = dispatcher(contacts, Arc::default(), gateway.clone())
            .with_event_sink(sink.clone())
            .run(&request())
            .await
            .unwrap();

        assert_eq!(gateway.sent.lock().unwrap().len(), 1);
        assert_eq!(report.succeeded, 1);
        assert!(report.aborted.unwrap().contains("no phone number"));
        assert_eq!(sink.count_type(CampaignEventType::CampaignAborted), 1);
    }

    #[tokio::test]
    async fn test_contact_without_email_ends_run_early() {
        let mut contacts: Vec<Contact> = (1..=3).map(contact).collect();
        contacts[1] = serde_json::from_str(r#"{"phone": "+254700000002", "payor": "APA"}"#).unwrap();
        let gateway = Arc::new(RecordingGateway::default());
        let shortener = Arc::new(RecordingShortener::default());
        let report = dispatcher(contacts, shortener.clone(), gateway.clone())
            .run(&request())
            .await
            .unwrap();

        let sent = gateway.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to[0], "+254700000001");
        assert_eq!(shortener.links.lock().unwrap().len(), 1);
        assert_eq!(report.succeeded, 1);
        assert!(report.aborted.unwrap().contains("+254700000002 has no email"));
    }

    #[tokio::test]
    async fn test_rejection_detail_names_the_phone() {
        let contacts: Vec<Contact> = (1..=2).map(contact).collect();
        let gateway = Arc::new(RecordingGateway {
            reject: vec![contacts[0].phone.clone()],
            ..Default::default()
        });
        let sink = capture_sink();
        dispatcher(contacts.clone(), Arc::default(), gateway)
            .with_event_sink(sink.clone())
            .run(&request())
            .await
            .unwrap();

        let failed: Vec<_> = sink
            .events()
            .into_iter()
            .filter(|e| e.event_type == CampaignEventType::SmsFailed)
            .collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].phone.as_deref(), Some(contacts[0].phone.as_str()));
        assert!(failed[0].detail.as_deref().unwrap().contains("HTTP 500"));
    }

    #[tokio::test]
    async fn test_stop_flag_halts_before_next_contact() {
        let contacts: Vec<Contact> = (1..=3).map(contact).collect();
        let gateway = Arc::new(RecordingGateway::default());
        let dispatcher = dispatcher(contacts, Arc::default(), gateway.clone());
        dispatcher.stop_handle().store(true, Ordering::Relaxed);
        let report = dispatcher.run(&request()).await.unwrap();

        assert!(gateway.sent.lock().unwrap().is_empty());
        assert_eq!(report.total, 3);
        assert_eq!(report.aborted.as_deref(), Some("interrupted"));
    }

    #[tokio::test]
    async fn test_progress_every_interval() {
        let contacts: Vec<Contact> = (1..=250).map(contact).collect();
        let sink = capture_sink();
        dispatcher(contacts, Arc::default(), Arc::default())
            .with_event_sink(sink.clone())
            .run(&request())
            .await
            .unwrap();

        let processed: Vec<usize> = sink
            .events()
            .iter()
            .filter_map(|e| e.progress.as_ref().map(|p| p.processed))
            .collect();
        assert_eq!(processed, vec![100, 200]);
    }
}
