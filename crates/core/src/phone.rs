//! Kenyan phone number normalization.

const COUNTRY_CODE: &str = "254";

/// Normalize a phone number to `+254...` form.
///
/// `0712345678` becomes `+254712345678`, `254712345678` gains a leading
/// `+`, and anything else is returned unchanged.
pub fn normalize_phone_number(phone: &str) -> String {
    let phone = phone.trim();
    if let Some(rest) = phone.strip_prefix('0') {
        format!("+{COUNTRY_CODE}{rest}")
    } else if phone.starts_with(COUNTRY_CODE) {
        format!("+{phone}")
    } else {
        phone.to_string()
    }
}
