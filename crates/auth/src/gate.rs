//! Authorization gate: the per-request allow/deny decision.
//!
//! The gate is a pure function of the request, the frozen policy registry, the
//! role table and the codec's key material. It holds no per-request state, so
//! one instance is shared by every request task.
//!
//! Decision order:
//! 1. bypass allow-list or an `ANYONE` route → allowed, credentials untouched;
//! 2. `Authorization: Bearer <token>` must be present and well formed;
//! 3. the token must verify;
//! 4. every role claim must be a known role;
//! 5. the caller's roles must intersect the route's permitted roles.

use std::collections::HashSet;
use std::sync::Arc;

use http::{HeaderMap, Request, header};
use thiserror::Error;

use crate::codec::{CredentialCodec, VerificationFailure};
use crate::policy::{RoutePolicyRegistry, split_path};
use crate::principal::Identity;
use crate::roles::{Role, RoleSet, RoleTable, UnknownRole};

/// The gate's decision, as consumed by the error translator.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AuthorizationOutcome {
    Allowed,
    RejectedUnauthenticated,
    RejectedUnauthorized,
    RejectedMalformedCredential,
}

impl AuthorizationOutcome {
    pub fn is_allowed(self) -> bool {
        self == AuthorizationOutcome::Allowed
    }
}

/// What an allowed request was granted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Bypass path or `ANYONE` route; no credential was inspected.
    Public,
    Authenticated(Identity),
}

/// The caller tried to authenticate but the credential is unusable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MalformedCredential {
    #[error("authorization header is missing")]
    MissingHeader,

    #[error("authorization header is not of the form 'Bearer <token>'")]
    InvalidHeader,

    #[error("credential rejected: {0}")]
    Verification(#[from] VerificationFailure),

    #[error("credential claims {0}")]
    UnknownRole(#[from] UnknownRole),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("malformed credential: {0}")]
    Malformed(#[from] MalformedCredential),

    #[error("credential does not identify a principal")]
    Unauthenticated,

    #[error("principal holds {held}, route requires one of {required}")]
    Unauthorized { required: RoleSet, held: RoleSet },

    /// The request reached the gate for a route with no declared policy.
    /// Treated as a denial.
    #[error("no policy registered for this route")]
    UnregisteredRoute,

    /// The path is served, but not for this method. Still a denial here;
    /// the router is expected to answer it with 405.
    #[error("no policy registered for this method on a served path")]
    MethodNotAllowed,
}

impl GateError {
    pub fn outcome(&self) -> AuthorizationOutcome {
        match self {
            GateError::Malformed(_) => AuthorizationOutcome::RejectedMalformedCredential,
            GateError::Unauthenticated => AuthorizationOutcome::RejectedUnauthenticated,
            GateError::Unauthorized { .. }
            | GateError::UnregisteredRoute
            | GateError::MethodNotAllowed => {
                AuthorizationOutcome::RejectedUnauthorized
            }
        }
    }
}

impl From<VerificationFailure> for GateError {
    fn from(value: VerificationFailure) -> Self {
        GateError::Malformed(MalformedCredential::Verification(value))
    }
}

impl From<UnknownRole> for GateError {
    fn from(value: UnknownRole) -> Self {
        GateError::Malformed(MalformedCredential::UnknownRole(value))
    }
}

/// Explicit allow-list of paths that never require identity.
///
/// Matching is by literal path (a trailing slash is ignored), never by
/// pattern, so the list can only widen by editing it.
#[derive(Debug, Clone, Default)]
pub struct BypassPaths {
    paths: HashSet<String>,
}

impl BypassPaths {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            paths: paths.into_iter().map(|p| normalize(p.as_ref())).collect(),
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(&normalize(path))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }
}

fn normalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 1);
    for seg in split_path(path) {
        out.push('/');
        out.push_str(seg);
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

pub struct AuthorizationGate {
    registry: Arc<RoutePolicyRegistry>,
    codec: Arc<dyn CredentialCodec>,
    roles: RoleTable,
    bypass: BypassPaths,
}

impl core::fmt::Debug for AuthorizationGate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthorizationGate")
            .field("routes", &self.registry.len())
            .field("bypass", &self.bypass)
            .finish_non_exhaustive()
    }
}

impl AuthorizationGate {
    pub fn new(
        registry: Arc<RoutePolicyRegistry>,
        codec: Arc<dyn CredentialCodec>,
        bypass: BypassPaths,
    ) -> Self {
        Self {
            registry,
            codec,
            roles: RoleTable::standard(),
            bypass,
        }
    }

    pub fn registry(&self) -> &RoutePolicyRegistry {
        &self.registry
    }

    /// Decide whether `req` may reach its handler.
    pub fn authorize<B>(&self, req: &Request<B>) -> AuthorizationOutcome {
        match self.check(req) {
            Ok(_) => AuthorizationOutcome::Allowed,
            Err(e) => e.outcome(),
        }
    }

    /// Same decision as [`authorize`](Self::authorize), keeping the resolved
    /// identity on success and the detailed reason on failure.
    pub fn check<B>(&self, req: &Request<B>) -> Result<Access, GateError> {
        let path = req.uri().path();
        if self.bypass.contains(path) {
            return Ok(Access::Public);
        }

        let Some(permitted) = self.registry.resolve(req.method(), path) else {
            if self.registry.serves_path(path) {
                return Err(GateError::MethodNotAllowed);
            }
            tracing::error!(method = %req.method(), path, "no route policy registered");
            return Err(GateError::UnregisteredRoute);
        };
        if permitted.contains(Role::Anyone) {
            return Ok(Access::Public);
        }

        let token = bearer_token(req.headers())?;
        let subject = self.codec.verify(token)?;

        let held = subject
            .roles
            .iter()
            .map(|claim| self.roles.resolve(claim))
            .collect::<Result<RoleSet, _>>()?;

        if subject.principal.trim().is_empty() {
            return Err(GateError::Unauthenticated);
        }

        if held.intersects(permitted) {
            Ok(Access::Authenticated(Identity::new(subject.principal, held)))
        } else {
            Err(GateError::Unauthorized {
                required: permitted.clone(),
                held,
            })
        }
    }
}

/// Extract `<token>` from `Authorization: <scheme> <token>`.
///
/// The value must split on whitespace into exactly two parts and the scheme
/// must be `Bearer` (case-insensitive).
fn bearer_token(headers: &HeaderMap) -> Result<&str, MalformedCredential> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(MalformedCredential::MissingHeader)?
        .to_str()
        .map_err(|_| MalformedCredential::InvalidHeader)?;

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(MalformedCredential::InvalidHeader),
    }
}
