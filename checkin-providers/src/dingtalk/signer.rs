//! Request signing for DingTalk robots.
//!
//! The robot expects `timestamp` (milliseconds) and `sign` query parameters,
//! where `sign` is the base64 HMAC-SHA256 of `"{timestamp}\n{secret}"` keyed
//! with the secret.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ring::hmac;
use url::Url;

/// Returns the base64 signature for `timestamp_ms`.
pub fn sign(secret: &str, timestamp_ms: i64) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes());
    let string_to_sign = format!("{timestamp_ms}\n{secret}");
    let tag = hmac::sign(&key, string_to_sign.as_bytes());
    STANDARD.encode(tag.as_ref())
}

/// Appends `timestamp` and `sign` to the webhook URL.
///
/// Existing query parameters (the robot's access token) are kept; the
/// signature is form-encoded.
pub fn signed_url(webhook_url: &str, secret: &str, timestamp_ms: i64) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(webhook_url)?;
    url.query_pairs_mut()
        .append_pair("timestamp", &timestamp_ms.to_string())
        .append_pair("sign", &sign(secret, timestamp_ms));
    Ok(url)
}
