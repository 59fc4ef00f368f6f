//! HMAC-SHA256 signatures as used by the payment gateway.
//!
//! Signatures are lowercase hex. Verification decodes the candidate and
//! compares MACs in constant time.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

// HMAC accepts keys of any length, so construction only fails in theory.
fn mac(secret: &str, message: &[u8]) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(message);
    Some(mac)
}

/// Hex HMAC-SHA256 of `message` under `secret`.
#[must_use]
pub fn sign(secret: &str, message: &[u8]) -> String {
    mac(secret, message)
        .map(|m| hex::encode(m.finalize().into_bytes()))
        .unwrap_or_default()
}

/// Whether `signature` is the hex HMAC-SHA256 of `message` under `secret`.
#[must_use]
pub fn verify(secret: &str, message: &[u8], signature: &str) -> bool {
    let Ok(candidate) = hex::decode(signature.trim()) else {
        return false;
    };
    mac(secret, message).is_some_and(|m| m.verify_slice(&candidate).is_ok())
}

/// The message signed for a client-side payment confirmation.
#[must_use]
pub fn payment_message(order_id: &str, payment_id: &str) -> String {
    format!("{order_id}|{payment_id}")
}
