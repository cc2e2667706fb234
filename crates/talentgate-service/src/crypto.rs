//! Webhook signature verification.
//!
//! The payment provider signs each delivery with HMAC-SHA256 over
//! `"{timestamp}.{body}"` and sends the result in an `x-payment-signature`
//! header of the form `t=<unix-seconds>,v1=<hex>`. Multiple `v1` values may
//! appear during secret rotation; any match accepts the delivery.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Signature verification failures.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    /// The header is missing the timestamp or any `v1` signature.
    #[error("malformed signature header")]
    Malformed,

    /// The timestamp is outside the accepted tolerance window.
    #[error("signature timestamp outside tolerance")]
    Expired,

    /// No provided signature matched the computed one.
    #[error("signature mismatch")]
    Mismatch,
}

/// Compute HMAC-SHA256 and return the hex-encoded result.
///
/// # Panics
///
/// Never panics in practice: HMAC-SHA256 accepts keys of any size per
/// RFC 2104, so `new_from_slice` only fails if the implementation is broken.
#[must_use]
pub fn hmac_sha256_hex(secret: &str, message: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC-SHA256 accepts any key size");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time string comparison to prevent timing attacks.
#[must_use]
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

/// Build the signature header value for a payload, as the provider would.
///
/// Used by tests and by tooling that replays captured deliveries.
#[must_use]
pub fn sign_payload(secret: &str, body: &str, timestamp: i64) -> String {
    let signature = hmac_sha256_hex(secret, &format!("{timestamp}.{body}"));
    format!("t={timestamp},v1={signature}")
}

/// Verify a webhook delivery against its signature header.
///
/// `tolerance_seconds` bounds how far the signed timestamp may drift from
/// `now` in either direction, limiting replay of captured deliveries.
///
/// # Errors
///
/// Returns a [`SignatureError`] describing why verification failed.
pub fn verify_signature(
    secret: &str,
    body: &str,
    header: &str,
    tolerance_seconds: i64,
    now: i64,
) -> Result<(), SignatureError> {
    let mut timestamp: Option<i64> = None;
    let mut signatures: Vec<&str> = Vec::new();

    for part in header.split(',') {
        let mut kv = part.splitn(2, '=');
        match (kv.next(), kv.next()) {
            (Some("t"), Some(ts)) => timestamp = ts.trim().parse().ok(),
            (Some("v1"), Some(sig)) => signatures.push(sig.trim()),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::Malformed)?;
    if signatures.is_empty() {
        return Err(SignatureError::Malformed);
    }

    if (now - timestamp).abs() > tolerance_seconds {
        return Err(SignatureError::Expired);
    }

    let expected = hmac_sha256_hex(secret, &format!("{timestamp}.{body}"));
    if signatures.iter().any(|sig| constant_time_eq(&expected, sig)) {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}
