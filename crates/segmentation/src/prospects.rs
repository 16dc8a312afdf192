//! Prospect rows: the raw member export and the CRM contact it becomes.

use launch_core::phone::normalize_phone_number;
use serde::{Deserialize, Serialize};

/// Column order of the raw member export (and of the diff output).
pub const SLADER_FIELDS: [&str; 7] = [
    "phone_contact",
    "active_card_types",
    "payer_slade_code",
    "beneficiary_code",
    "payer_name",
    "first_name",
    "last_name",
];

/// CRM custom properties, in the column order the import expects.
pub const CRM_PROPERTIES: [&str; 14] = [
    "be_well_enrolled",
    "opt_out",
    "be_well_aware",
    "be_well_persona",
    "has_wellness_card",
    "has_cover",
    "payor",
    "first_channel_of_contact",
    "initial_segment",
    "has_virtual_card",
    "email",
    "phone_number",
    "firstname",
    "lastname",
];

const EMAIL_DOMAIN: &str = "users.bewell.co.ke";
const PERSONA: &str = "SLADER";
const FIRST_CHANNEL: &str = "SMS";

/// One insured member from the payer export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SladerRecord {
    pub phone_contact: String,
    #[serde(default)]
    pub active_card_types: String,
    #[serde(default)]
    pub payer_slade_code: String,
    #[serde(default)]
    pub beneficiary_code: String,
    pub payer_name: String,
    pub first_name: String,
    pub last_name: String,
}

impl SladerRecord {
    pub fn has_virtual_card(&self) -> bool {
        self.active_card_types.contains("VIRTUAL")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flag {
    #[serde(rename = "YES")]
    Yes,
    #[serde(rename = "NO")]
    No,
}

impl From<bool> for Flag {
    fn from(value: bool) -> Self {
        if value {
            Flag::Yes
        } else {
            Flag::No
        }
    }
}

/// CRM contact row. Field order matches [`CRM_PROPERTIES`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrmProspect {
    pub be_well_enrolled: Flag,
    pub opt_out: Flag,
    pub be_well_aware: Flag,
    pub be_well_persona: String,
    pub has_wellness_card: Flag,
    pub has_cover: Flag,
    pub payor: String,
    pub first_channel_of_contact: String,
    pub initial_segment: String,
    pub has_virtual_card: Flag,
    pub email: String,
    pub phone_number: String,
    pub firstname: String,
    pub lastname: String,
}

impl CrmProspect {
    /// Infer the CRM properties of a fresh, never-contacted member. The
    /// email is synthesized from the phone number so every member has one.
    pub fn from_slader(record: &SladerRecord, segment: &str) -> Self {
        let phone_number = normalize_phone_number(&record.phone_contact);
        Self {
            be_well_enrolled: Flag::No,
            opt_out: Flag::No,
            be_well_aware: Flag::No,
            be_well_persona: PERSONA.to_string(),
            has_wellness_card: Flag::Yes,
            has_cover: Flag::Yes,
            payor: record.payer_name.clone(),
            first_channel_of_contact: FIRST_CHANNEL.to_string(),
            initial_segment: segment.to_string(),
            has_virtual_card: record.has_virtual_card().into(),
            email: format!("{phone_number}@{EMAIL_DOMAIN}"),
            phone_number,
            firstname: record.first_name.clone(),
            lastname: record.last_name.clone(),
        }
    }
}
