//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: hotel store and the shared `AppServices`
//! - `routes/`: the route table and handlers (one file per resource)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: the single outward error type

use std::any::Any;
use std::sync::Arc;

use axum::{Extension, Router, response::IntoResponse, response::Response};
use thiserror::Error;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;

use innkeep_auth::{AuthorizationGate, CodecError, DirectoryError, Hs256Codec, Role, UserDirectory};
use innkeep_core::DomainError;

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid route table: {0}")]
    Routes(#[from] routes::RouteTableError),

    #[error("cannot build credential codec: {0}")]
    Codec(#[from] CodecError),

    #[error("cannot create bootstrap admin: {0}")]
    Bootstrap(#[from] DirectoryError),

    #[error("cannot load demo data: {0}")]
    Seed(#[from] DomainError),
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &ApiConfig) -> Result<Router, AppError> {
    let codec = Hs256Codec::new(
        config.jwt_secret.as_bytes(),
        config.token_issuer.clone(),
        config.token_ttl,
    )?
    .with_leeway(config.token_leeway_secs);

    let (router, registry) = routes::route_table()?.finish();
    let registry = Arc::new(registry);
    let codec = Arc::new(codec);

    let users = UserDirectory::new();
    if let Some(admin) = &config.bootstrap_admin {
        users.register(&admin.username, &admin.password, [Role::Admin])?;
    }

    let hotels = services::HotelStore::new();
    if config.seed_demo_data {
        hotels.seed_demo().await?;
        tracing::info!("demo hotels loaded");
    }

    let gate = Arc::new(AuthorizationGate::new(
        registry.clone(),
        codec.clone(),
        routes::bypass_paths(),
    ));
    tracing::debug!(?gate, "authorization gate ready");

    let services = Arc::new(services::AppServices {
        hotels,
        users,
        codec,
        registry,
    });

    Ok(router
        .route_layer(axum::middleware::from_fn_with_state(
            middleware::GateState { gate },
            middleware::authorization_middleware,
        ))
        .layer(Extension(services))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    middleware::RequestCounter::default(),
                    middleware::request_log_middleware,
                ))
                .layer(CatchPanicLayer::custom(panic_response)),
        ))
}

fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("handler panicked");
    errors::ApiError::Internal.into_response()
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use tower::ServiceExt;

    use super::*;

    async fn app() -> Router {
        build_app(&ApiConfig::default()).await.unwrap()
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn public_routes_need_no_credential() {
        let req = Request::get("/api/v1/hotels").body(Body::empty()).unwrap();
        let (status, body) = send(app().await, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn protected_route_without_header_is_invalid_token() {
        let req = Request::get("/api/v1/hotels/1").body(Body::empty()).unwrap();
        let (status, body) = send(app().await, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, serde_json::json!({"status": 401, "message": "Invalid token"}));
    }

    #[tokio::test]
    async fn wrong_scheme_is_invalid_token() {
        let req = Request::get("/api/v1/whoami")
            .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app().await, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid token");
    }

    #[tokio::test]
    async fn routes_listing_is_reachable_without_identity() {
        let req = Request::get("/api/v1/routes").body(Body::empty()).unwrap();
        let (status, body) = send(app().await, req).await;
        assert_eq!(status, StatusCode::OK);
        let routes = body.as_array().unwrap();
        assert!(routes.iter().any(|r| r["path"] == "/api/v1/hotels/{id}"
            && r["method"] == "DELETE"
            && r["roles"] == serde_json::json!(["MANAGER", "ADMIN"])));
    }

    #[tokio::test]
    async fn wrong_method_on_served_path_is_method_not_allowed() {
        for (method, path) in [
            (Method::PATCH, "/api/v1/hotels/1"),
            (Method::DELETE, "/api/v1/hotels"),
        ] {
            let req = Request::builder()
                .method(method.clone())
                .uri(path)
                .body(Body::empty())
                .unwrap();
            let res = app().await.oneshot(req).await.unwrap();
            assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED, "{method} {path}");
        }
    }

    #[tokio::test]
    async fn unmatched_paths_are_not_found() {
        let req = Request::get("/api/v1/bookings").body(Body::empty()).unwrap();
        let (status, _) = send(app().await, req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn empty_secret_is_a_startup_error() {
        let config = ApiConfig {
            jwt_secret: String::new(),
            ..ApiConfig::default()
        };
        assert!(matches!(build_app(&config).await, Err(AppError::Codec(_))));
    }
}
