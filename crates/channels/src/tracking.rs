//! Tracking links. The contact identifier travels base64-encoded in the
//! `email` query parameter so the redirect page can recover it.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use launch_core::{LaunchError, LaunchResult};
use url::Url;

pub const IDENTIFIER_PARAM: &str = "email";

pub fn encode_identifier(identifier: &str) -> String {
    STANDARD.encode(identifier.as_bytes())
}

/// Decode an identifier. A `+` that arrived unescaped in a query string
/// has already become a space by now, so spaces are read back as `+`.
pub fn decode_identifier(encoded: &str) -> LaunchResult<String> {
    let bytes = STANDARD
        .decode(encoded.trim().replace(' ', "+"))
        .map_err(|e| LaunchError::TrackingLink(format!("identifier is not base64: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| LaunchError::TrackingLink(format!("identifier is not UTF-8: {e}")))
}

/// Append the encoded identifier to `tracking_url`, keeping any query
/// parameters already present.
pub fn build_tracking_link(tracking_url: &str, identifier: &str) -> LaunchResult<String> {
    let mut url = Url::parse(tracking_url)
        .map_err(|e| LaunchError::TrackingLink(format!("{tracking_url}: {e}")))?;
    url.query_pairs_mut()
        .append_pair(IDENTIFIER_PARAM, &encode_identifier(identifier));
    Ok(url.into())
}

/// Recover the identifier embedded by [`build_tracking_link`].
pub fn identifier_from_link(link: &str) -> LaunchResult<String> {
    let url = Url::parse(link).map_err(|e| LaunchError::TrackingLink(format!("{link}: {e}")))?;
    let encoded = url
        .query_pairs()
        .find(|(key, _)| key == IDENTIFIER_PARAM)
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| LaunchError::TrackingLink(format!("{link}: no {IDENTIFIER_PARAM} parameter")))?;
    decode_identifier(&encoded)
}
