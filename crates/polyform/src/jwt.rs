//! JWT decoding and HS256 signing/verification
//!
//! Tokens are `base64url(header).base64url(payload).base64url(signature)`.
//! Decoding accepts both padded and unpadded base64url (RFC 4648 §5); output
//! is always unpadded, as the JWS spec requires. Verification covers HS256
//! only; the signature comparison goes through the `hmac` crate's tag
//! comparison, which is constant-time.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::convert::{self, Format};
use crate::error::{Error, ErrorKind, Result};
use crate::value::{Object, Value};

type HmacSha256 = Hmac<Sha256>;

/// base64url, no padding on encode, padding indifferent on decode
const B64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A decoded (not necessarily verified) token
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedToken {
    pub header: Value,
    pub payload: Value,
    pub signature: Vec<u8>,
}

impl DecodedToken {
    /// `alg` claim of the header, if present
    pub fn algorithm(&self) -> Option<&str> {
        self.header
            .as_object()
            .and_then(|h| h.get("alg"))
            .and_then(Value::as_string)
    }
}

/// Decode a token's three segments without verifying the signature
pub fn decode(token: &str) -> Result<DecodedToken> {
    let parts: Vec<&str> = token.trim().split('.').collect();
    let [header_b64, payload_b64, signature_b64] = parts.as_slice() else {
        return Err(Error::spanless(
            ErrorKind::MalformedToken,
            "token must have three dot-separated segments",
        ));
    };

    let header = decode_json_segment(header_b64, "header")?;
    let payload = decode_json_segment(payload_b64, "payload")?;
    let signature = decode_segment(signature_b64, "signature")?;

    Ok(DecodedToken {
        header,
        payload,
        signature,
    })
}

/// Verify a token's HS256 signature against a shared secret.
///
/// Returns `Ok(false)` for a well-formed token whose signature does not
/// match. Fails only when the token is malformed or declares an algorithm
/// other than HS256.
pub fn verify(token: &str, secret: &[u8]) -> Result<bool> {
    let token = token.trim();
    let decoded = decode(token)?;

    match decoded.algorithm() {
        Some("HS256") => {}
        Some(alg) => {
            return Err(Error::spanless(
                ErrorKind::UnsupportedAlgorithm {
                    alg: alg.to_string(),
                },
                format!("cannot verify algorithm {alg}"),
            ));
        }
        None => {
            return Err(Error::spanless(
                ErrorKind::MalformedToken,
                "header has no alg claim",
            ));
        }
    }

    let signing_input = match token.rsplit_once('.') {
        Some((head, _)) => head,
        None => return Ok(false),
    };

    let mut mac = new_mac(secret)?;
    mac.update(signing_input.as_bytes());
    Ok(mac.verify_slice(&decoded.signature).is_ok())
}

/// Build and sign a token from header and payload values
pub fn encode(header: &Value, payload: &Value, secret: &[u8]) -> Result<String> {
    let header_b64 = B64.encode(convert::serialize(header, Format::Json)?);
    let payload_b64 = B64.encode(convert::serialize(payload, Format::Json)?);
    let signing_input = format!("{header_b64}.{payload_b64}");

    let mut mac = new_mac(secret)?;
    mac.update(signing_input.as_bytes());
    let signature = B64.encode(mac.finalize().into_bytes());

    Ok(format!("{signing_input}.{signature}"))
}

/// Sign a payload with the standard `{"alg":"HS256","typ":"JWT"}` header
pub fn sign_hs256(payload: &Value, secret: &[u8]) -> Result<String> {
    let mut header = Object::with_capacity(2);
    header.insert("alg", "HS256");
    header.insert("typ", "JWT");
    encode(&Value::Object(header), payload, secret)
}

fn new_mac(secret: &[u8]) -> Result<HmacSha256> {
    HmacSha256::new_from_slice(secret)
        .map_err(|_| Error::spanless(ErrorKind::MalformedToken, "invalid hmac key"))
}

fn decode_segment(segment: &str, what: &str) -> Result<Vec<u8>> {
    B64.decode(segment).map_err(|e| {
        Error::spanless(
            ErrorKind::MalformedToken,
            format!("{what} is not valid base64url: {e}"),
        )
    })
}

fn decode_json_segment(segment: &str, what: &str) -> Result<Value> {
    let bytes = decode_segment(segment, what)?;
    let text = String::from_utf8(bytes).map_err(|_| {
        Error::spanless(ErrorKind::MalformedToken, format!("{what} is not utf-8"))
    })?;
    convert::parse(&text, Format::Json).map_err(|e| {
        Error::spanless(
            ErrorKind::MalformedToken,
            format!("{what} is not valid json: {}", e.message()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // The jwt.io example token, signed with "your-256-bit-secret".
    const SAMPLE: &str = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.\
                          eyJzdWIiOiIxMjM0NTY3ODkwIiwibmFtZSI6IkpvaG4gRG9lIiwiaWF0IjoxNTE2MjM5MDIyfQ.\
                          SflKxwRJSMeKKF2QT4fwpMeJf36POk6yJV_adQssw5c";

    fn sample_token() -> String {
        SAMPLE.split_whitespace().collect()
    }

    #[test]
    fn test_decode_sample() -> Result<()> {
        let decoded = decode(&sample_token())?;
        assert_eq!(decoded.algorithm(), Some("HS256"));
        assert_eq!(
            decoded
                .payload
                .as_object()
                .and_then(|p| p.get("name"))
                .and_then(Value::as_string),
            Some("John Doe")
        );
        assert_eq!(decoded.signature.len(), 32);
        Ok(())
    }

    #[test]
    fn test_verify_sample() -> Result<()> {
        assert!(verify(&sample_token(), b"your-256-bit-secret")?);
        assert!(!verify(&sample_token(), b"wrong-secret")?);
        Ok(())
    }

    #[test]
    fn test_sign_then_verify() -> Result<()> {
        let mut payload = Object::new();
        payload.insert("sub", "u1");
        payload.insert("admin", true);
        let payload = Value::Object(payload);

        let token = sign_hs256(&payload, b"secret")?;
        assert!(verify(&token, b"secret")?);
        assert!(!verify(&token, b"other")?);

        let decoded = decode(&token)?;
        assert_eq!(decoded.payload, payload);
        Ok(())
    }

    #[test]
    fn test_tampered_payload_fails_verification() -> Result<()> {
        let mut payload = Object::new();
        payload.insert("sub", "u1");
        let token = sign_hs256(&Value::Object(payload), b"secret")?;

        let mut forged = Object::new();
        forged.insert("sub", "u2");
        let forged_b64 = B64.encode(convert::serialize(
            &Value::Object(forged),
            Format::Json,
        )?);

        let parts: Vec<&str> = token.split('.').collect();
        let tampered = format!("{}.{}.{}", parts[0], forged_b64, parts[2]);
        assert!(!verify(&tampered, b"secret")?);
        Ok(())
    }

    #[test]
    fn test_padded_segments_accepted() -> Result<()> {
        // Same token, but with padding restored on every segment.
        let token = sample_token();
        let padded: Vec<String> = token
            .split('.')
            .map(|part| {
                let mut part = part.to_string();
                while part.len() % 4 != 0 {
                    part.push('=');
                }
                part
            })
            .collect();
        let padded = padded.join(".");

        let decoded = decode(&padded)?;
        assert_eq!(decoded.algorithm(), Some("HS256"));
        Ok(())
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        for token in ["", "a.b", "a.b.c.d", "!!!.x.y"] {
            let err = decode(token).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::MalformedToken, "token: {token}");
        }
    }

    #[test]
    fn test_unsupported_algorithm_rejected() -> Result<()> {
        let mut header = Object::new();
        header.insert("alg", "RS256");
        let mut payload = Object::new();
        payload.insert("sub", "u1");
        let token = encode(&Value::Object(header), &Value::Object(payload), b"secret")?;

        let err = verify(&token, b"secret").unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::UnsupportedAlgorithm { alg } if alg == "RS256"
        ));
        Ok(())
    }
}
