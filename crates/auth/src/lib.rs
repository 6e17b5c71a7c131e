//! `innkeep-auth` — request authorization for the Innkeep API.
//!
//! Roles, the bearer credential codec, the route policy registry and the
//! authorization gate that combines them. The gate works on `http::Request`
//! values and knows nothing about the web framework serving them.

pub mod claims;
pub mod codec;
pub mod gate;
pub mod policy;
pub mod principal;
pub mod roles;
pub mod user;

pub use claims::{CredentialClaims, TimeWindowError, validate_time_window};
pub use codec::{CodecError, CredentialCodec, Hs256Codec, Subject, VerificationFailure};
pub use gate::{
    Access, AuthorizationGate, AuthorizationOutcome, BypassPaths, GateError, MalformedCredential,
};
pub use policy::{PolicyError, RoutePattern, RoutePolicy, RoutePolicyRegistry, RoutePolicyRegistryBuilder};
pub use principal::Identity;
pub use roles::{Role, RoleSet, RoleTable, UnknownRole};
pub use user::{DirectoryError, UserAccount, UserDirectory, UserId};
