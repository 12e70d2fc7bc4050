//! Unverified bearer token claims.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde_json::{Map, Value};

pub const NAME_ID: &str = "nameid";
pub const NAME_ID_LONG: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier";

const URL_SAFE_ANY_PADDING: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

pub fn decode_payload(token: &str) -> Option<Map<String, Value>> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_ANY_PADDING.decode(payload).ok()?;
    match serde_json::from_slice(&bytes).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

pub fn claim(token: &str, name: &str) -> Option<String> {
    decode_payload(token)?.get(name)?.as_str().map(str::to_string)
}

/// User id carried by the token, trying the short then the long claim name.
pub fn user_id(token: &str) -> String {
    claim(token, NAME_ID)
        .filter(|s| !s.is_empty())
        .or_else(|| claim(token, NAME_ID_LONG))
        .unwrap_or_default()
}
