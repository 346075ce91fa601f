//! Webhook signature verification.
//!
//! The gateway sends `stripe-signature: t=<unix seconds>,v1=<hex>[,v1=<hex>...]`
//! where each `v1` is HMAC-SHA256 over `"{t}.{raw body}"` keyed with the
//! endpoint secret. The body must be verified byte-for-byte before parsing.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "stripe-signature";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing signature header")]
    Missing,

    #[error("malformed signature header")]
    Malformed,

    #[error("timestamp outside tolerance")]
    Expired,

    #[error("signature mismatch")]
    Mismatch,
}

/// Verify `header` against `payload` at time `now` (unix seconds).
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> Result<(), SignatureError> {
    let mut timestamp: Option<&str> = None;
    let mut candidates: Vec<Vec<u8>> = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = Some(value),
            "v1" => {
                // Undecodable entries can never match; skip rather than fail.
                if let Ok(bytes) = hex::decode(value) {
                    candidates.push(bytes);
                }
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::Malformed)?;
    let issued_at: i64 = timestamp.parse().map_err(|_| SignatureError::Malformed)?;
    if candidates.is_empty() {
        return Err(SignatureError::Malformed);
    }
    if tolerance_secs > 0 && (now - issued_at).abs() > tolerance_secs {
        return Err(SignatureError::Expired);
    }

    let mac = signed_mac(secret, timestamp, payload)?;
    let matched = candidates
        .iter()
        .any(|candidate| mac.clone().verify_slice(candidate).is_ok());

    if matched {
        tracing::debug!("webhook signature verified");
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}

/// Build a header value the way the gateway does; used by tests and local tooling.
pub fn sign_payload(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let timestamp = timestamp.to_string();
    let signature = signed_mac(secret, &timestamp, payload)
        .map(|mac| hex::encode(mac.finalize().into_bytes()))
        .unwrap_or_default();
    format!("t={timestamp},v1={signature}")
}

fn signed_mac(secret: &str, timestamp: &str, payload: &[u8]) -> Result<HmacSha256, SignatureError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::Malformed)?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}
