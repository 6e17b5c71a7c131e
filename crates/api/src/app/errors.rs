//! Translation of every failure into the `{"status", "message"}` JSON body.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use innkeep_auth::{CodecError, DirectoryError, GateError};
use innkeep_core::DomainError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("You are not authorized to perform this action")]
    NotAuthorized,

    #[error("Wrong username or password")]
    BadCredentials,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    status: u16,
    message: &'a str,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidToken | ApiError::NotAuthorized | ApiError::BadCredentials => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn invalid_id() -> Self {
        ApiError::Validation("Not a valid id".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        let body = ErrorBody {
            status: status.as_u16(),
            message: &message,
        };
        (status, axum::Json(body)).into_response()
    }
}

impl From<GateError> for ApiError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::Malformed(_) => ApiError::InvalidToken,
            GateError::Unauthenticated
            | GateError::Unauthorized { .. }
            | GateError::UnregisteredRoute
            | GateError::MethodNotAllowed => ApiError::NotAuthorized,
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::Conflict(msg) => ApiError::Validation(msg),
            DomainError::InvalidId(_) => ApiError::invalid_id(),
            DomainError::NotFound(_) => ApiError::NotFound(err.to_string()),
        }
    }
}

impl From<DirectoryError> for ApiError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::BadCredentials => ApiError::BadCredentials,
            DirectoryError::AlreadyExists(_) => ApiError::Conflict(err.to_string()),
            DirectoryError::InvalidUsername | DirectoryError::InvalidPassword => {
                ApiError::Validation(err.to_string())
            }
        }
    }
}

impl From<CodecError> for ApiError {
    fn from(err: CodecError) -> Self {
        tracing::error!(error = %err, "failed to issue credential");
        ApiError::Internal
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use innkeep_auth::{MalformedCredential, RoleSet, VerificationFailure};
    use innkeep_auth::Role;

    use super::*;

    async fn body_of(err: ApiError) -> (StatusCode, serde_json::Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn malformed_credentials_render_invalid_token() {
        let err = ApiError::from(GateError::Malformed(MalformedCredential::Verification(
            VerificationFailure::BadSignature,
        )));
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body,
            serde_json::json!({"status": 401, "message": "Invalid token"})
        );
    }

    #[tokio::test]
    async fn role_mismatch_renders_not_authorized() {
        let err = ApiError::from(GateError::Unauthorized {
            required: RoleSet::from([Role::Admin]),
            held: RoleSet::from([Role::User]),
        });
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "You are not authorized to perform this action");
    }

    #[test]
    fn unauthenticated_and_unregistered_share_the_denial_message() {
        assert_eq!(ApiError::from(GateError::Unauthenticated), ApiError::NotAuthorized);
        assert_eq!(ApiError::from(GateError::UnregisteredRoute), ApiError::NotAuthorized);
    }

    #[tokio::test]
    async fn domain_errors_keep_their_message() {
        let (status, body) = body_of(DomainError::validation("Hotel name must be set").into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Hotel name must be set");
        assert_eq!(body["status"], 400);

        let (status, body) = body_of(DomainError::not_found("Hotel").into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Hotel not found");
    }

    #[test]
    fn directory_errors_map_to_http_semantics() {
        assert_eq!(ApiError::from(DirectoryError::BadCredentials), ApiError::BadCredentials);
        assert_eq!(
            ApiError::from(DirectoryError::AlreadyExists("ada".into())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(DirectoryError::InvalidPassword).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
