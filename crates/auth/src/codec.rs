//! Credential codec: issues and verifies bearer credentials.
//!
//! Credentials are HS256-signed JWTs carrying [`CredentialClaims`]. Key material
//! is loaded once when the codec is built and is read-only afterwards, so a
//! codec can be shared across request tasks behind an `Arc` without locking.
//! Verification performs no I/O.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::claims::{CredentialClaims, TimeWindowError, validate_time_window};
use crate::roles::Role;

/// Decoded result of a successfully verified credential.
///
/// Built fresh per request; role claims are kept as raw strings so the caller
/// decides how to map them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub principal: String,
    pub roles: Vec<String>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Why a credential failed verification.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum VerificationFailure {
    #[error("credential has expired")]
    Expired,

    #[error("credential signature is invalid")]
    BadSignature,

    #[error("credential is malformed")]
    Malformed,
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("signing secret must not be empty")]
    EmptySecret,

    #[error("principal must not be empty")]
    EmptyPrincipal,

    #[error("failed to encode credential: {0}")]
    Encode(#[from] jsonwebtoken::errors::Error),
}

/// Issue/verify contract consumed by the authorization gate and the login flow.
///
/// `verify` must accept exactly what `issue` produces (until it expires).
pub trait CredentialCodec: Send + Sync {
    fn issue(&self, principal: &str, roles: &[Role]) -> Result<String, CodecError>;

    fn verify(&self, credential: &str) -> Result<Subject, VerificationFailure>;
}

/// HS256 JWT codec with a fixed issuer and token lifetime.
#[derive(Clone)]
pub struct Hs256Codec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    ttl: Duration,
    leeway: u64,
}

impl core::fmt::Debug for Hs256Codec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256Codec")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .field("leeway", &self.leeway)
            .finish_non_exhaustive()
    }
}

impl Hs256Codec {
    pub fn new(secret: &[u8], issuer: impl Into<String>, ttl: Duration) -> Result<Self, CodecError> {
        if secret.is_empty() {
            return Err(CodecError::EmptySecret);
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            issuer: issuer.into(),
            ttl,
            leeway: 0,
        })
    }

    /// Allowed clock skew, in seconds, when checking `iat`/`exp`.
    pub fn with_leeway(mut self, leeway: u64) -> Self {
        self.leeway = leeway;
        self
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Issue a credential as if it had been minted at `issued_at`.
    pub fn issue_at(
        &self,
        principal: &str,
        roles: &[Role],
        issued_at: DateTime<Utc>,
    ) -> Result<String, CodecError> {
        if principal.trim().is_empty() {
            return Err(CodecError::EmptyPrincipal);
        }
        let claims = CredentialClaims {
            sub: principal.to_string(),
            roles: roles.iter().map(|r| r.claim().to_string()).collect(),
            iss: self.issuer.clone(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };
        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding,
        )?)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.leeway = self.leeway;
        validation
    }
}

impl CredentialCodec for Hs256Codec {
    fn issue(&self, principal: &str, roles: &[Role]) -> Result<String, CodecError> {
        self.issue_at(principal, roles, Utc::now())
    }

    fn verify(&self, credential: &str) -> Result<Subject, VerificationFailure> {
        let data = jsonwebtoken::decode::<CredentialClaims>(credential, &self.decoding, &self.validation())
            .map_err(|e| classify(e.kind()))?;
        let claims = data.claims;

        validate_time_window(&claims, Utc::now().timestamp(), self.leeway).map_err(|e| match e {
            TimeWindowError::Expired => VerificationFailure::Expired,
            TimeWindowError::NotYetValid | TimeWindowError::InvalidTimeWindow => {
                VerificationFailure::Malformed
            }
        })?;

        let issued_at = DateTime::<Utc>::from_timestamp(claims.iat, 0).ok_or(VerificationFailure::Malformed)?;
        let expires_at = DateTime::<Utc>::from_timestamp(claims.exp, 0).ok_or(VerificationFailure::Malformed)?;

        Ok(Subject {
            principal: claims.sub,
            roles: claims.roles,
            issued_at,
            expires_at,
        })
    }
}

fn classify(kind: &ErrorKind) -> VerificationFailure {
    match kind {
        ErrorKind::ExpiredSignature => VerificationFailure::Expired,
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => VerificationFailure::BadSignature,
        _ => VerificationFailure::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec(secret: &str) -> Hs256Codec {
        Hs256Codec::new(secret.as_bytes(), "innkeep", Duration::minutes(30)).unwrap()
    }

    #[test]
    fn verify_accepts_what_issue_produces() {
        let codec = codec("test-secret");
        let token = codec.issue("alice", &[Role::User, Role::Manager]).unwrap();

        let subject = codec.verify(&token).unwrap();
        assert_eq!(subject.principal, "alice");
        assert_eq!(subject.roles, vec!["user".to_string(), "manager".to_string()]);
        assert!(subject.expires_at > subject.issued_at);
    }

    #[test]
    fn foreign_key_is_a_bad_signature() {
        let token = codec("other-secret").issue("alice", &[Role::Admin]).unwrap();
        assert_eq!(
            codec("test-secret").verify(&token),
            Err(VerificationFailure::BadSignature)
        );
    }

    #[test]
    fn tampered_payload_is_a_bad_signature() {
        let codec = codec("test-secret");
        let token = codec.issue("alice", &[Role::User]).unwrap();
        let forged = codec.issue("mallory", &[Role::Admin]).unwrap();
        let forged_payload = forged.split('.').nth(1).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = forged_payload;

        assert_eq!(
            codec.verify(&parts.join(".")),
            Err(VerificationFailure::BadSignature)
        );
    }

    #[test]
    fn old_credential_is_expired() {
        let codec = codec("test-secret");
        let token = codec
            .issue_at("alice", &[Role::User], Utc::now() - Duration::hours(2))
            .unwrap();
        assert_eq!(codec.verify(&token), Err(VerificationFailure::Expired));
    }

    #[test]
    fn leeway_tolerates_recent_expiry() {
        let codec = codec("test-secret").with_leeway(120);
        let token = codec
            .issue_at("alice", &[Role::User], Utc::now() - Duration::minutes(31))
            .unwrap();
        assert!(codec.verify(&token).is_ok());
    }

    #[test]
    fn future_credential_is_malformed() {
        let codec = codec("test-secret");
        let token = codec
            .issue_at("alice", &[Role::User], Utc::now() + Duration::hours(1))
            .unwrap();
        assert_eq!(codec.verify(&token), Err(VerificationFailure::Malformed));
    }

    #[test]
    fn garbage_is_malformed() {
        let codec = codec("test-secret");
        for raw in ["", "not-a-jwt", "a.b.c", "...."] {
            assert_eq!(codec.verify(raw), Err(VerificationFailure::Malformed), "{raw:?}");
        }
    }

    #[test]
    fn wrong_issuer_is_malformed() {
        let foreign = Hs256Codec::new(b"test-secret", "someone-else", Duration::minutes(5)).unwrap();
        let token = foreign.issue("alice", &[Role::User]).unwrap();
        assert_eq!(
            codec("test-secret").verify(&token),
            Err(VerificationFailure::Malformed)
        );
    }

    #[test]
    fn rejects_empty_secret_and_principal() {
        assert!(matches!(
            Hs256Codec::new(b"", "innkeep", Duration::minutes(5)),
            Err(CodecError::EmptySecret)
        ));
        assert!(matches!(
            codec("test-secret").issue("  ", &[Role::User]),
            Err(CodecError::EmptyPrincipal)
        ));
    }

    #[test]
    fn debug_output_omits_key_material() {
        let rendered = format!("{:?}", codec("super-secret-value"));
        assert!(!rendered.contains("super-secret-value"));
    }
}
