use std::sync::Arc;

use axum::{Extension, Json, extract::rejection::JsonRejection, http::Method, http::StatusCode};

use innkeep_auth::{Role, UserAccount};

use crate::app::dto::{CredentialsRequest, TokenResponse};
use crate::app::errors::ApiError;
use crate::app::routes::{LOGIN_PATH, REGISTER_PATH, RouteTable, RouteTableError};
use crate::app::services::AppServices;

pub fn routes(table: RouteTable) -> Result<RouteTable, RouteTableError> {
    table
        .route(Method::POST, LOGIN_PATH, [Role::Anyone], login)?
        .route(Method::POST, REGISTER_PATH, [Role::Anyone], register)
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(body) = payload?;
    let account = services.users.authenticate(&body.username, &body.password)?;
    let response = issue_token(&services, account)?;

    tracing::info!(username = %response.username, "user logged in");
    Ok(Json(response))
}

/// Self-service sign-up. New accounts only ever hold `USER`.
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    let Json(body) = payload?;
    let account = services
        .users
        .register(&body.username, &body.password, [Role::User])?;

    Ok((StatusCode::CREATED, Json(issue_token(&services, account)?)))
}

fn issue_token(services: &AppServices, account: UserAccount) -> Result<TokenResponse, ApiError> {
    let roles: Vec<Role> = account.roles.iter().collect();
    let token = services.codec.issue(&account.username, &roles)?;
    Ok(TokenResponse {
        username: account.username,
        token,
    })
}
