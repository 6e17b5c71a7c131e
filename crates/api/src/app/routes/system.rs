use std::sync::Arc;

use axum::{Extension, Json, http::Method, http::StatusCode};

use innkeep_auth::Role;

use crate::app::dto::{IdentityResponse, RouteResponse};
use crate::app::routes::{ROUTES_PATH, RouteTable, RouteTableError};
use crate::app::services::AppServices;
use crate::context::Caller;

pub fn routes(table: RouteTable) -> Result<RouteTable, RouteTableError> {
    table
        .route(Method::GET, "/health", [Role::Anyone], health)?
        .route(Method::GET, ROUTES_PATH, [Role::Anyone], list_routes)?
        .route(
            Method::GET,
            "/api/v1/whoami",
            [Role::User, Role::Manager, Role::Admin],
            whoami,
        )
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Every registered route with the roles it admits.
pub async fn list_routes(
    Extension(services): Extension<Arc<AppServices>>,
) -> Json<Vec<RouteResponse>> {
    Json(services.registry.policies().map(RouteResponse::from).collect())
}

pub async fn whoami(Caller(identity): Caller) -> Json<IdentityResponse> {
    Json(IdentityResponse::from(&identity))
}
