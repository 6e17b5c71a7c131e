use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use innkeep_auth::Identity;

use crate::app::errors::ApiError;

/// The authenticated caller of a request.
///
/// Present only on routes whose policy does not permit `ANYONE`; the
/// authorization middleware inserts the [`Identity`] before the handler runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub Identity);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(Caller)
            .ok_or(ApiError::NotAuthorized)
    }
}
