use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims carried inside an Innkeep bearer credential.
///
/// Timestamps are unix seconds, as required by the JWT registered claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialClaims {
    /// Subject / principal identifier (the username).
    pub sub: String,

    /// Role claims in lower-case claim form (`"user"`, `"admin"`, ...).
    pub roles: Vec<String>,

    /// Issuer; must match the verifying codec's issuer.
    pub iss: String,

    /// Issued-at timestamp.
    pub iat: i64,

    /// Expiration timestamp.
    pub exp: i64,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindowError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate the claim time window against `now`.
///
/// `leeway` widens both edges to tolerate clock skew between issuer and verifier.
pub fn validate_time_window(
    claims: &CredentialClaims,
    now: i64,
    leeway: u64,
) -> Result<(), TimeWindowError> {
    let leeway = i64::try_from(leeway).unwrap_or(i64::MAX);
    if claims.exp <= claims.iat {
        return Err(TimeWindowError::InvalidTimeWindow);
    }
    if now.saturating_add(leeway) < claims.iat {
        return Err(TimeWindowError::NotYetValid);
    }
    if now.saturating_sub(leeway) >= claims.exp {
        return Err(TimeWindowError::Expired);
    }
    Ok(())
}
