//! HMAC-SHA256 request signing for the DingTalk robot API.
//!
//! DingTalk expects every push to carry a `timestamp` and `sign` query
//! parameter, where the signature is computed over `"{timestamp}\n{secret}"`
//! keyed by the secret itself and base64-encoded. The signature has to be
//! percent-encoded before it is embedded in the query string; that happens
//! when the push URL is assembled, not here.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute the DingTalk robot signature for a millisecond timestamp and a
/// shared secret. Deterministic, no side effects.
pub fn make_sign(timestamp_ms: i64, secret: &str) -> String {
    let payload = format!("{timestamp_ms}\n{secret}");

    #[allow(clippy::expect_used)]
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("hmac accepts keys of any length");
    mac.update(payload.as_bytes());

    base64::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_is_deterministic() {
        let a = make_sign(1_700_000_000_000, "testsecret");
        let b = make_sign(1_700_000_000_000, "testsecret");
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn sign_depends_on_timestamp_and_secret() {
        let base = make_sign(1_700_000_000_000, "testsecret");
        assert_ne!(base, make_sign(1_700_000_000_001, "testsecret"));
        assert_ne!(base, make_sign(1_700_000_000_000, "othersecret"));
    }

    #[test]
    fn sign_is_valid_base64() {
        let sign = make_sign(1_700_000_000_000, "testsecret");
        let raw = base64::decode(&sign).unwrap();
        // an HMAC-SHA256 digest is always 32 bytes
        assert_eq!(raw.len(), 32);
    }
}
