//! Chatwoot webhook signature verification.
//!
//! Chatwoot signs the JSON request body with HMAC-SHA256 using the shared
//! webhook secret and sends the hex digest in `x-chatwoot-signature`.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the hex-encoded signature.
pub const SIGNATURE_HEADER: &str = "x-chatwoot-signature";

/// Length in bytes of an HMAC-SHA256 digest.
const DIGEST_LEN: usize = 32;

/// Reasons a webhook signature is not accepted.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignatureError {
    /// A secret is configured but the request carries no signature.
    #[error("no signature provided")]
    Missing,

    /// The signature does not match the body.
    #[error("invalid signature")]
    Invalid,

    /// The signature could not be evaluated at all.
    #[error("signature verification failed: {0}")]
    Verification(String),
}

/// Verify a Chatwoot webhook signature.
///
/// # Arguments
///
/// * `secret` - Shared webhook secret; `None` disables verification
/// * `signature` - Raw bytes of the `x-chatwoot-signature` header, if present
/// * `body` - Raw request body bytes
///
/// # Returns
///
/// `Ok(())` when the request is accepted. The header is only decoded once a
/// secret is configured. A signature that is not readable hex or has the wrong
/// length yields [`SignatureError::Verification`], which callers report as a
/// server-side failure rather than a rejection.
pub fn verify_chatwoot_signature(
    secret: Option<&str>,
    signature: Option<&[u8]>,
    body: &[u8],
) -> Result<(), SignatureError> {
    let Some(secret) = secret else {
        warn!("webhook_secret_not_configured");
        return Ok(());
    };

    let Some(signature) = signature else {
        warn!("chatwoot_signature_missing");
        return Err(SignatureError::Missing);
    };

    let signature = std::str::from_utf8(signature).map_err(|e| {
        warn!(error = %e, "chatwoot_signature_unreadable");
        SignatureError::Verification(format!("unreadable signature header: {}", e))
    })?;

    let provided = hex::decode(signature.trim()).map_err(|e| {
        warn!(error = %e, "chatwoot_signature_malformed");
        SignatureError::Verification(format!("signature is not hex: {}", e))
    })?;

    if provided.len() != DIGEST_LEN {
        warn!(
            expected_length = DIGEST_LEN,
            actual_length = provided.len(),
            "chatwoot_signature_wrong_length"
        );
        return Err(SignatureError::Verification(format!(
            "signature is {} bytes, expected {}",
            provided.len(),
            DIGEST_LEN
        )));
    }

    let mut mac = keyed_mac(secret)?;
    mac.update(body);

    // Constant-time comparison to prevent timing attacks
    mac.verify_slice(&provided).map_err(|_| {
        warn!(body_length = body.len(), "chatwoot_signature_mismatch");
        SignatureError::Invalid
    })
}

/// Compute the hex signature Chatwoot would send for `body`.
///
/// Used to sign fixtures and replay webhooks against a running relay.
pub fn sign(secret: &str, body: &[u8]) -> Result<String, SignatureError> {
    let mut mac = keyed_mac(secret)?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn keyed_mac(secret: &str) -> Result<HmacSha256, SignatureError> {
    HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| SignatureError::Verification(format!("invalid secret: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-webhook-secret";
    const BODY: &[u8] = br#"{"event":"message_created","data":{"message_type":"outgoing"}}"#;

    fn flip_first_hex_char(signature: &str) -> String {
        let mut chars: Vec<char> = signature.chars().collect();
        chars[0] = if chars[0] == '0' { '1' } else { '0' };
        chars.into_iter().collect()
    }

    #[test]
    fn test_no_secret_skips_verification() {
        assert_eq!(verify_chatwoot_signature(None, None, BODY), Ok(()));
        assert_eq!(verify_chatwoot_signature(None, Some(b"garbage".as_slice()), BODY), Ok(()));
    }

    #[test]
    fn test_missing_signature() {
        assert_eq!(
            verify_chatwoot_signature(Some(SECRET), None, BODY),
            Err(SignatureError::Missing)
        );
    }

    #[test]
    fn test_valid_signature() {
        let signature = sign(SECRET, BODY).unwrap();
        assert_eq!(
            verify_chatwoot_signature(Some(SECRET), Some(signature.as_bytes()), BODY),
            Ok(())
        );
    }

    #[test]
    fn test_uppercase_hex_signature() {
        let signature = sign(SECRET, BODY).unwrap().to_uppercase();
        assert_eq!(
            verify_chatwoot_signature(Some(SECRET), Some(signature.as_bytes()), BODY),
            Ok(())
        );
    }

    #[test]
    fn test_flipped_character_rejected() {
        let signature = flip_first_hex_char(&sign(SECRET, BODY).unwrap());
        assert_eq!(
            verify_chatwoot_signature(Some(SECRET), Some(signature.as_bytes()), BODY),
            Err(SignatureError::Invalid)
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let signature = sign("other-secret", BODY).unwrap();
        assert_eq!(
            verify_chatwoot_signature(Some(SECRET), Some(signature.as_bytes()), BODY),
            Err(SignatureError::Invalid)
        );
    }

    #[test]
    fn test_tampered_body_rejected() {
        let signature = sign(SECRET, BODY).unwrap();
        assert_eq!(
            verify_chatwoot_signature(Some(SECRET), Some(signature.as_bytes()), b"{}"),
            Err(SignatureError::Invalid)
        );
    }

    #[test]
    fn test_malformed_signature_is_verification_error() {
        assert!(matches!(
            verify_chatwoot_signature(Some(SECRET), Some(b"not-hex".as_slice()), BODY),
            Err(SignatureError::Verification(_))
        ));
        assert!(matches!(
            verify_chatwoot_signature(Some(SECRET), Some(b"abcd".as_slice()), BODY),
            Err(SignatureError::Verification(_))
        ));
    }

    #[test]
    fn test_non_utf8_signature() {
        let header: &[u8] = b"sig\xe9";
        assert_eq!(verify_chatwoot_signature(None, Some(header), BODY), Ok(()));
        assert!(matches!(
            verify_chatwoot_signature(Some(SECRET), Some(header), BODY),
            Err(SignatureError::Verification(_))
        ));
    }

    #[test]
    fn test_sign_is_hex_sha256() {
        let signature = sign(SECRET, BODY).unwrap();
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
