//! # Token Claims
//!
//! Reads identity claims from a JWT access token payload.
//!
//! Only the payload segment is decoded. The signature is not verified: the token came
//! straight from the credential provider and is only inspected to learn who we are.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClaimsError {
    #[error("failed to acquire access token: {0}")]
    TokenUnavailable(#[source] azure_core::Error),

    #[error("access token is not a JWT (expected header.payload.signature)")]
    MalformedToken,

    #[error("access token payload is not valid base64url: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),

    #[error("access token payload is not valid JSON: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error("access token has no '{0}' claim")]
    MissingClaim(&'static str),
}

/// Claims of interest from an Entra ID access token
///
/// Every field is optional; blank values are treated as absent by the accessors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    oid: Option<String>,
    #[serde(default)]
    preferred_username: Option<String>,
    #[serde(default)]
    upn: Option<String>,
    #[serde(default)]
    unique_name: Option<String>,
    #[serde(default)]
    tid: Option<String>,
    #[serde(default)]
    appid: Option<String>,
    #[serde(default)]
    exp: Option<i64>,
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl TokenClaims {
    /// Principal object id (`oid`)
    #[must_use]
    pub fn object_id(&self) -> Option<&str> {
        present(self.oid.as_ref())
    }

    /// Best available sign-in name: `preferred_username`, then `upn`, then `unique_name`
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        present(self.preferred_username.as_ref())
            .or_else(|| present(self.upn.as_ref()))
            .or_else(|| present(self.unique_name.as_ref()))
    }

    #[must_use]
    pub fn tenant_id(&self) -> Option<&str> {
        present(self.tid.as_ref())
    }

    /// Application id, present for service principals and managed identities
    #[must_use]
    pub fn app_id(&self) -> Option<&str> {
        present(self.appid.as_ref())
    }

    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

/// Decode the claims of a JWT without verifying it
///
/// # Errors
/// Returns [`ClaimsError::MalformedToken`] when the token has fewer than two segments,
/// and encoding or JSON errors when the payload cannot be read.
pub fn decode_claims(token: &str) -> Result<TokenClaims, ClaimsError> {
    let mut segments = token.trim().split('.');
    let (Some(_header), Some(payload)) = (segments.next(), segments.next()) else {
        return Err(ClaimsError::MalformedToken);
    };
    if payload.is_empty() {
        return Err(ClaimsError::MalformedToken);
    }

    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt(payload: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{header}.{body}.sig")
    }

    #[test]
    fn test_decode_claims_reads_object_id_and_email() {
        let token = jwt(&serde_json::json!({
            "oid": " 11111111-2222-3333-4444-555555555555 ",
            "preferred_username": "dev@contoso.com",
            "upn": "other@contoso.com",
            "tid": "tenant",
            "exp": 1_700_000_000
        }));

        let claims = decode_claims(&token).expect("token should decode");
        assert_eq!(
            claims.object_id(),
            Some("11111111-2222-3333-4444-555555555555")
        );
        assert_eq!(claims.email(), Some("dev@contoso.com"));
        assert_eq!(claims.tenant_id(), Some("tenant"));
        assert_eq!(
            claims.expires_at().map(|t| t.timestamp()),
            Some(1_700_000_000)
        );
    }

    #[test]
    fn test_email_falls_back_through_upn_then_unique_name() {
        let token = jwt(&serde_json::json!({"preferred_username": " ", "upn": "upn@contoso.com"}));
        assert_eq!(
            decode_claims(&token).expect("decode").email(),
            Some("upn@contoso.com")
        );

        let token = jwt(&serde_json::json!({"unique_name": "live.com#me@outlook.com"}));
        assert_eq!(
            decode_claims(&token).expect("decode").email(),
            Some("live.com#me@outlook.com")
        );

        let token = jwt(&serde_json::json!({"appid": "app"}));
        let claims = decode_claims(&token).expect("decode");
        assert_eq!(claims.email(), None);
        assert_eq!(claims.app_id(), Some("app"));
    }

    #[test]
    fn test_padded_payload_is_tolerated() {
        let header = URL_SAFE_NO_PAD.encode(b"{}");
        let body = base64::engine::general_purpose::URL_SAFE.encode(br#"{"oid":"x"}"#);
        let claims = decode_claims(&format!("{header}.{body}.s")).expect("decode");
        assert_eq!(claims.object_id(), Some("x"));
    }

    #[test]
    fn test_single_segment_token_is_malformed() {
        assert!(matches!(
            decode_claims("opaque-token"),
            Err(ClaimsError::MalformedToken)
        ));
        assert!(matches!(decode_claims("a."), Err(ClaimsError::MalformedToken)));
    }

    #[test]
    fn test_non_json_payload_is_reported() {
        let body = URL_SAFE_NO_PAD.encode(b"not json");
        assert!(matches!(
            decode_claims(&format!("h.{body}.s")),
            Err(ClaimsError::InvalidPayload(_))
        ));
        assert!(matches!(
            decode_claims("h.!!!.s"),
            Err(ClaimsError::InvalidEncoding(_))
        ));
    }
}
