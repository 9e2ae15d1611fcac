//! Signed, time-bounded bearer tokens (HS256 JWT).
//!
//! The token carries only the subject's username. Role and every other user
//! attribute are re-read from the credential store on each request.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username of the authenticated user.
    pub sub: String,

    /// Issued-at, Unix seconds.
    pub iat: i64,

    /// Expiry, Unix seconds.
    pub exp: i64,

    /// Random per-token id. Nothing checks it yet; it is the handle a
    /// deny-list would key on.
    pub jti: String,
}

/// Why a token was refused. Callers outside the auth layer only ever see
/// "unauthorized"; the kind is kept for logs and metrics.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature does not verify")]
    BadSignature,

    #[error("token has expired")]
    Expired,

    #[error("failed to encode token: {0}")]
    Encoding(String),
}

impl TokenError {
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Malformed => "malformed",
            Self::BadSignature => "bad_signature",
            Self::Expired => "expired",
            Self::Encoding(_) => "encoding",
        }
    }
}

#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &"HS256")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// `secret` is fixed for the lifetime of the codec.
    #[must_use]
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // expiry is checked against an explicit clock in `decode_at`
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn encode(
        &self,
        subject: &str,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Mints a token issued now with the configured TTL.
    pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
        self.encode(subject, Utc::now(), self.ttl)
    }

    /// Returns the subject of a valid, unexpired token.
    pub fn decode(&self, token: &str) -> Result<String, TokenError> {
        self.decode_at(token, Utc::now())
    }

    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        self.claims_at(token, now).map(|claims| claims.sub)
    }

    pub fn claims_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            }
        })?;

        if now.timestamp() >= data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn issued_at() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn codec(secret: &str) -> TokenCodec {
        TokenCodec::new(secret, Duration::minutes(30))
    }

    #[test]
    fn test_round_trip_subject() {
        let codec = codec("k1");
        let token = codec
            .encode("admin", issued_at(), Duration::minutes(30))
            .unwrap();

        let now = issued_at() + Duration::minutes(5);
        assert_eq!(codec.decode_at(&token, now).unwrap(), "admin");
    }

    #[test]
    fn test_expiry_boundary() {
        let codec = codec("k1");
        let ttl = Duration::minutes(30);
        let token = codec.encode("admin", issued_at(), ttl).unwrap();

        let just_before = issued_at() + ttl - Duration::seconds(1);
        let just_after = issued_at() + ttl + Duration::seconds(1);

        assert!(codec.decode_at(&token, just_before).is_ok());
        assert_eq!(
            codec.decode_at(&token, just_after),
            Err(TokenError::Expired)
        );
        assert_eq!(
            codec.decode_at(&token, issued_at() + ttl),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_wrong_secret_is_bad_signature() {
        let token = codec("k1")
            .encode("admin", issued_at(), Duration::minutes(30))
            .unwrap();

        let result = codec("k2").decode_at(&token, issued_at());
        assert_eq!(result, Err(TokenError::BadSignature));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let codec = codec("k1");
        assert_eq!(
            codec.decode_at("not.a.jwt", issued_at()),
            Err(TokenError::Malformed)
        );
        assert_eq!(codec.decode_at("", issued_at()), Err(TokenError::Malformed));
    }

    #[test]
    fn test_tampered_payload_fails() {
        let codec = codec("k1");
        let token = codec
            .encode("staff1", issued_at(), Duration::minutes(30))
            .unwrap();
        let forged = codec
            .encode("admin", issued_at(), Duration::minutes(30))
            .unwrap();

        // splice the admin payload onto the staff signature
        let parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        let spliced = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

        assert_eq!(
            codec.decode_at(&spliced, issued_at()),
            Err(TokenError::BadSignature)
        );
    }

    #[test]
    fn test_each_token_has_distinct_id() {
        let codec = codec("k1");
        let a = codec.encode("admin", issued_at(), Duration::minutes(1)).unwrap();
        let b = codec.encode("admin", issued_at(), Duration::minutes(1)).unwrap();

        assert_ne!(a, b);
        let ca = codec.claims_at(&a, issued_at()).unwrap();
        let cb = codec.claims_at(&b, issued_at()).unwrap();
        assert_ne!(ca.jti, cb.jti);
        assert_eq!(ca.exp - ca.iat, 60);
    }

    #[test]
    fn test_issue_uses_configured_ttl() {
        let codec = TokenCodec::new("k1", Duration::minutes(30));
        let token = codec.issue("admin").unwrap();
        assert_eq!(codec.decode(&token).unwrap(), "admin");

        let later = Utc::now() + Duration::minutes(31);
        assert_eq!(codec.decode_at(&token, later), Err(TokenError::Expired));
    }
}
