//! Prospect diff. Drops members who already use the app or who have
//! already been sent a campaign message.

use crate::io::{read_csv, read_json_lines, write_csv};
use crate::prospects::{SladerRecord, SLADER_FIELDS};
use launch_core::phone::normalize_phone_number;
use launch_core::LaunchResult;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

/// Normalized phone numbers that must not be messaged.
#[derive(Debug, Default, Clone)]
pub struct Blacklist {
    phones: HashSet<String>,
}

impl Blacklist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend<I, S>(&mut self, phones: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.phones
            .extend(phones.into_iter().map(|p| normalize_phone_number(p.as_ref())));
    }

    pub fn contains(&self, phone: &str) -> bool {
        self.phones.contains(&normalize_phone_number(phone))
    }

    pub fn len(&self) -> usize {
        self.phones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phones.is_empty()
    }
}

/// Warehouse rows keep the document as a JSON string in `data`; plain
/// exports are the document itself.
fn document(row: &Value) -> Value {
    match row.get("data") {
        Some(Value::String(raw)) => serde_json::from_str(raw).unwrap_or(Value::Null),
        Some(inner @ Value::Object(_)) => inner.clone(),
        _ => row.clone(),
    }
}

/// Phones of people who already have an app profile.
pub fn app_user_phones(profiles: &[Value]) -> Vec<String> {
    profiles
        .iter()
        .filter_map(|row| {
            document(row)
                .get("primaryPhone")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .collect()
}

fn message_sent(doc: &Value) -> bool {
    match doc.get("message_sent") {
        Some(Value::String(s)) => s.eq_ignore_ascii_case("TRUE"),
        Some(Value::Bool(b)) => *b,
        _ => false,
    }
}

/// Phone of one marketing record: `phone`, else `properties.Phone`.
pub fn marketed_phone(doc: &Value) -> Option<String> {
    doc.get("phone")
        .or_else(|| doc.get("properties").and_then(|p| p.get("Phone")))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Phones of contacts that have already been sent a message. Records
/// without a phone are logged and skipped.
pub fn marketed_phones(records: &[Value]) -> Vec<String> {
    let mut phones = Vec::new();
    for doc in records.iter().map(document).filter(message_sent) {
        match marketed_phone(&doc) {
            Some(phone) => phones.push(phone),
            None => warn!("Marketing record is missing a phone number"),
        }
    }
    phones
}

/// Keep only prospects whose phone is not blacklisted. Builds a new list
/// rather than removing from the input while walking it.
pub fn filter_prospects(prospects: Vec<SladerRecord>, blacklist: &Blacklist) -> Vec<SladerRecord> {
    prospects
        .into_iter()
        .filter(|p| !blacklist.contains(&p.phone_contact))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffSummary {
    pub prospects: usize,
    pub blacklisted: usize,
    pub kept: usize,
}

/// Run the whole diff from exported files and write the prospects that
/// are still worth messaging to `out`.
pub fn write_diffed_prospects(
    prospects_csv: &Path,
    app_users: &Path,
    marketed: &Path,
    out: &Path,
) -> LaunchResult<DiffSummary> {
    let mut blacklist = Blacklist::new();
    let users = app_user_phones(&read_json_lines(app_users)?);
    info!(count = users.len(), "App users found");
    blacklist.extend(users);
    let messaged = marketed_phones(&read_json_lines(marketed)?);
    info!(count = messaged.len(), "Contacts with sent messages found");
    blacklist.extend(messaged);
    info!(count = blacklist.len(), "Blacklisted phone numbers");

    let prospects: Vec<SladerRecord> = read_csv::<SladerRecord>(prospects_csv)?
        .into_iter()
        .map(|mut p| {
            p.phone_contact = normalize_phone_number(&p.phone_contact);
            p
        })
        .collect();
    let total = prospects.len();
    let kept = filter_prospects(prospects, &blacklist);
    info!(prospects = total, kept = kept.len(), "Diffed prospects (new people to target)");

    write_csv(out, &SLADER_FIELDS, &kept)?;
    Ok(DiffSummary {
        prospects: total,
        blacklisted: blacklist.len(),
        kept: kept.len(),
    })
}
