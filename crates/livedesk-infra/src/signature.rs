//! HMAC-SHA256 signature codec for the automation channel.
//!
//! Signatures travel in the `x-make-signature` header as
//! `sha256=<lowercase hex>` computed over the exact raw body bytes.
//! Verification is constant-time (via the hmac crate's `verify_slice`) to
//! prevent timing side-channels on signature validation.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use livedesk_types::error::SignatureError;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the signature on both directions of the channel.
pub const SIGNATURE_HEADER: &str = "x-make-signature";

/// Required prefix of the header value.
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Compute the signature header value for a payload.
pub fn sign(secret: &[u8], body: &[u8]) -> Result<String, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| SignatureError::InvalidKey(e.to_string()))?;
    mac.update(body);
    let digest = mac.finalize().into_bytes();
    Ok(format!("{SIGNATURE_PREFIX}{}", hex_encode(&digest)))
}

/// Verify a signature header against a raw request body.
///
/// The header must carry the `sha256=` prefix; a missing prefix or
/// non-hex payload rejects as malformed, a wrong digest as a mismatch.
pub fn verify(secret: &[u8], body: &[u8], header: &str) -> Result<(), SignatureError> {
    let hex_sig = header
        .strip_prefix(SIGNATURE_PREFIX)
        .ok_or(SignatureError::MalformedHeader)?;
    let expected = hex_decode(hex_sig).map_err(|_| SignatureError::MalformedHeader)?;

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| SignatureError::InvalidKey(e.to_string()))?;
    mac.update(body);
    mac.verify_slice(&expected)
        .map_err(|_| SignatureError::Mismatch)
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn hex_decode(hex: &str) -> Result<Vec<u8>, ()> {
    if hex.len() % 2 != 0 {
        return Err(());
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_then_verify_roundtrip() {
        let secret = b"s3cret";
        let body = br#"{"sessionId":"abc","text":"hi"}"#;

        let header = sign(secret, body).unwrap();
        assert!(header.starts_with("sha256="));
        assert!(verify(secret, body, &header).is_ok());
    }

    #[test]
    fn test_verify_rejects_tampered_signature() {
        let secret = b"s3cret";
        let body = b"payload";
        let header = sign(secret, body).unwrap();

        // Flip one hex character
        let mut tampered = header.clone().into_bytes();
        let last = tampered.last_mut().unwrap();
        *last = if *last == b'0' { b'1' } else { b'0' };
        let tampered = String::from_utf8(tampered).unwrap();

        assert!(matches!(
            verify(secret, body, &tampered),
            Err(SignatureError::Mismatch)
        ));
    }

    #[test]
    fn test_verify_rejects_tampered_body() {
        let secret = b"s3cret";
        let header = sign(secret, b"payload").unwrap();
        assert!(matches!(
            verify(secret, b"qayload", &header),
            Err(SignatureError::Mismatch)
        ));
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let header = sign(b"s3cret", b"payload").unwrap();
        assert!(verify(b"other", b"payload", &header).is_err());
    }

    #[test]
    fn test_verify_rejects_missing_prefix() {
        let secret = b"s3cret";
        let header = sign(secret, b"payload").unwrap();
        let bare = header.strip_prefix("sha256=").unwrap();
        assert!(matches!(
            verify(secret, b"payload", bare),
            Err(SignatureError::MalformedHeader)
        ));
    }

    #[test]
    fn test_verify_rejects_non_hex_payload() {
        assert!(matches!(
            verify(b"s3cret", b"payload", "sha256=not-hex"),
            Err(SignatureError::MalformedHeader)
        ));
        assert!(matches!(
            verify(b"s3cret", b"payload", "sha256=abc"),
            Err(SignatureError::MalformedHeader)
        ));
    }

    #[test]
    fn test_empty_body_signs_and_verifies() {
        let header = sign(b"s3cret", b"").unwrap();
        assert!(verify(b"s3cret", b"", &header).is_ok());
    }

    // RFC 4231 test vector 1 (known HMAC-SHA256 result)
    #[test]
    fn test_hmac_sha256_rfc4231_vector1() {
        let key = vec![0x0b_u8; 20];
        let data = b"Hi There";
        let expected = "sha256=b0344c61d8db38535ca8afceaf0bf12b881dc200c9833da726e9376c2e32cff7";

        assert_eq!(sign(&key, data).unwrap(), expected);
        assert!(verify(&key, data, expected).is_ok());
    }

    // RFC 4231 test vector 2
    #[test]
    fn test_hmac_sha256_rfc4231_vector2() {
        let key = b"Jefe";
        let data = b"what do ya want for nothing?";
        let expected = "sha256=5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843";

        assert_eq!(sign(key, data).unwrap(), expected);
        assert!(verify(key, data, expected).is_ok());
    }

    #[test]
    fn test_hex_encode_decode_roundtrip() {
        let data = b"Hello, World!";
        let hex = hex_encode(data);
        let decoded = hex_decode(&hex).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_hex_decode_invalid() {
        assert!(hex_decode("0").is_err());
        assert!(hex_decode("zz").is_err());
    }
}
