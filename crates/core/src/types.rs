use crate::error::{LaunchError, LaunchResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

// ─── Contacts ───────────────────────────────────────────────────────────────

/// A segment member as returned by the segmentation data service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub phone: String,
    #[serde(default, alias = "first_name")]
    pub firstname: Option<String>,
    #[serde(default, alias = "last_name")]
    pub lastname: Option<String>,
    #[serde(default)]
    pub payor: Option<String>,
    /// Used as the tracking identifier in campaign links.
    #[serde(default)]
    pub email: String,
}

impl Contact {
    /// Name for the first template slot: the payer, else the first name.
    pub fn payer_name(&self) -> &str {
        self.payor
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .or(self.firstname.as_deref())
            .unwrap_or_default()
    }
}

// ─── Wings & senders ────────────────────────────────────────────────────────

/// A/B sub-split of a segment; each wing gets its own message variant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Wing {
    #[serde(rename = "WING A")]
    A,
    #[serde(rename = "WING B")]
    B,
}

impl Wing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Wing::A => "WING A",
            Wing::B => "WING B",
        }
    }
}

impl FromStr for Wing {
    type Err = LaunchError;

    /// Accepts any string containing the wing name, ignoring case, so
    /// `"Wing A"` and `"WING A - July"` both select wing A.
    fn from_str(raw: &str) -> LaunchResult<Self> {
        let upper = raw.to_uppercase();
        if upper.contains(Wing::A.as_str()) {
            Ok(Wing::A)
        } else if upper.contains(Wing::B.as_str()) {
            Ok(Wing::B)
        } else {
            Err(LaunchError::InvalidWing(raw.to_string()))
        }
    }
}

impl fmt::Display for Wing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SenderId {
    #[serde(rename = "BEWELL")]
    BeWell,
    #[serde(rename = "SLADE360")]
    Slade360,
}

impl SenderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SenderId::BeWell => "BEWELL",
            SenderId::Slade360 => "SLADE360",
        }
    }
}

// ─── Message templates ──────────────────────────────────────────────────────

const WING_A_MESSAGE: &str = "Did you know you can now link your {} medical cover \
on the Be.Well App and view your benefits? \
To get started, Download Now {}. \
For more information, call 0790 360 360. \
To opt-out dial *384*600# Be.Well by Slade360";

const WING_B_MESSAGE: &str = "Did you know you can now link your {} medical cover on \
the Be.Well App and view your benefits? To get started, \
Download Now {}. \
For more information, call 0790 360 360. \
To opt-out dial *384*600# Be.Well by Slade360";

/// SMS text with two positional `{}` slots (payer name, link) plus the
/// landing page the link should point at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTemplate {
    pub body: String,
    pub tracking_url: String,
}

impl MessageTemplate {
    pub fn for_wing(wing: Wing, tracking_url: impl Into<String>) -> Self {
        let body = match wing {
            Wing::A => WING_A_MESSAGE,
            Wing::B => WING_B_MESSAGE,
        };
        Self {
            body: body.to_string(),
            tracking_url: tracking_url.into(),
        }
    }

    /// Fill the slots in order. Slot text is inserted verbatim, so a name
    /// containing `{}` never swallows the link.
    pub fn render(&self, payer_name: &str, link: &str) -> String {
        let mut slots = [payer_name, link].into_iter();
        let mut parts = self.body.split("{}");
        let mut out = String::with_capacity(self.body.len() + payer_name.len() + link.len());
        if let Some(head) = parts.next() {
            out.push_str(head);
        }
        for part in parts {
            out.push_str(slots.next().unwrap_or_default());
            out.push_str(part);
        }
        out
    }
}

// ─── Sends & reports ────────────────────────────────────────────────────────

/// Request body for the marketing SMS endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsPayload {
    pub to: Vec<String>,
    pub message: String,
    pub sender: SenderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment: Option<String>,
}

impl SmsPayload {
    pub fn new(phone: &str, message: String, sender: SenderId, segment: Option<&str>) -> Self {
        Self {
            to: vec![phone.to_string()],
            message,
            sender,
            segment: segment.map(str::to_string),
        }
    }
}

/// What happened to one contact.
#[derive(Debug, Clone, PartialEq)]
pub enum ContactOutcome {
    Sent { phone: String, latency: Duration },
    Failed { phone: String, reason: String },
}

/// Periodic throughput / ETA observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub processed: usize,
    pub succeeded: usize,
    pub total: usize,
    pub hours_elapsed: f64,
    pub avg_latency_secs: f64,
    pub last_latency_secs: f64,
    pub hours_remaining: f64,
}

/// Final outcome of a campaign run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignReport {
    pub segment: String,
    pub wing: Wing,
    /// Contacts discovered in the segment.
    pub total: usize,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub elapsed_secs: f64,
    /// Set when the run stopped before reaching the last contact.
    pub aborted: Option<String>,
}

impl CampaignReport {
    pub fn empty(segment: &str, wing: Wing) -> Self {
        Self {
            segment: segment.to_string(),
            wing,
            total: 0,
            attempted: 0,
            succeeded: 0,
            failed: 0,
            elapsed_secs: 0.0,
            aborted: None,
        }
    }

    pub fn all_engaged(&self) -> bool {
        self.aborted.is_none() && self.succeeded == self.total
    }
}
