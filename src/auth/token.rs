//! Expiry claim extraction from the bearer credential.
//!
//! The backend issues a compact signed token whose second dot-delimited
//! segment is base64url-encoded JSON carrying a Unix-seconds `exp` claim.
//! The signature is the backend's concern; the client only reads the
//! expiry so it can invalidate the session locally. Any decoding failure
//! is treated as "already expired" by the caller (fail closed).

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum TokenError {
    #[error("Token is not a three-segment compact string")]
    BadFormat,

    #[error("Token payload is not valid base64url")]
    BadEncoding,

    #[error("Token payload is not valid JSON or lacks an exp claim")]
    BadClaims,
}

#[derive(Debug, Deserialize)]
struct Claims {
    exp: i64,
}

/// Decode the `exp` claim of `token` and return it in milliseconds
/// since the Unix epoch.
pub fn expiry_millis(token: &str) -> Result<i64, TokenError> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => return Err(TokenError::BadFormat),
    };

    let decoded = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| TokenError::BadEncoding)?;

    let claims: Claims = serde_json::from_slice(&decoded).map_err(|_| TokenError::BadClaims)?;

    Ok(claims.exp * 1000)
}

#[cfg(test)]
pub(crate) fn make_token(exp_secs: i64) -> String {
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"tester","exp":{}}}"#, exp_secs));
    format!("eyJhbGciOiJIUzI1NiJ9.{}.c2ln", payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_exp_claim_to_millis() {
        let token = make_token(1_700_000_000);
        assert_eq!(expiry_millis(&token), Ok(1_700_000_000_000));
    }

    #[test]
    fn rejects_wrong_segment_count() {
        assert_eq!(expiry_millis("justonesegment"), Err(TokenError::BadFormat));
        assert_eq!(expiry_millis("two.segments"), Err(TokenError::BadFormat));
        assert_eq!(expiry_millis("a.b.c.d"), Err(TokenError::BadFormat));
        assert_eq!(expiry_millis(""), Err(TokenError::BadFormat));
    }

    #[test]
    fn rejects_bad_base64() {
        assert_eq!(
            expiry_millis("head.!!!not-base64!!!.sig"),
            Err(TokenError::BadEncoding)
        );
    }

    #[test]
    fn rejects_missing_exp_claim() {
        let payload = URL_SAFE_NO_PAD.encode(r#"{"sub":"tester"}"#);
        let token = format!("head.{}.sig", payload);
        assert_eq!(expiry_millis(&token), Err(TokenError::BadClaims));
    }

    #[test]
    fn rejects_non_json_payload() {
        let payload = URL_SAFE_NO_PAD.encode("not json at all");
        let token = format!("head.{}.sig", payload);
        assert_eq!(expiry_millis(&token), Err(TokenError::BadClaims));
    }
}
