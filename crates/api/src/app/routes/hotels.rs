use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, rejection::JsonRejection},
    http::{Method, StatusCode},
};

use innkeep_auth::Role;
use innkeep_core::{HotelDraft, HotelId};

use crate::app::dto::{HotelRequest, HotelResponse};
use crate::app::errors::ApiError;
use crate::app::routes::common::parse_id;
use crate::app::routes::{RouteTable, RouteTableError};
use crate::app::services::AppServices;

const STAFF: [Role; 2] = [Role::Admin, Role::Manager];

pub fn routes(table: RouteTable) -> Result<RouteTable, RouteTableError> {
    table
        .route(Method::GET, "/api/v1/hotels", [Role::Anyone], list_hotels)?
        .route(Method::POST, "/api/v1/hotels", STAFF, create_hotel)?
        .route(
            Method::GET,
            "/api/v1/hotels/{id}",
            [Role::User, Role::Admin, Role::Manager],
            get_hotel,
        )?
        .route(Method::PUT, "/api/v1/hotels/{id}", STAFF, update_hotel)?
        .route(Method::DELETE, "/api/v1/hotels/{id}", STAFF, delete_hotel)
}

pub async fn list_hotels(
    Extension(services): Extension<Arc<AppServices>>,
) -> Json<Vec<HotelResponse>> {
    let hotels = services.hotels.list_hotels().await;
    Json(hotels.iter().map(HotelResponse::from).collect())
}

pub async fn get_hotel(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<HotelResponse>, ApiError> {
    let id: HotelId = parse_id(&id)?;
    let hotel = services.hotels.hotel(id).await?;
    Ok(Json(HotelResponse::from(&hotel)))
}

pub async fn create_hotel(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<HotelRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<HotelResponse>), ApiError> {
    let Json(body) = payload?;
    let spec = HotelDraft::from(body).validate()?;
    let hotel = services.hotels.create_hotel(spec).await?;
    Ok((StatusCode::CREATED, Json(HotelResponse::from(&hotel))))
}

pub async fn update_hotel(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    payload: Result<Json<HotelRequest>, JsonRejection>,
) -> Result<Json<HotelResponse>, ApiError> {
    let id: HotelId = parse_id(&id)?;
    let Json(body) = payload?;
    let spec = HotelDraft::from(body).validate()?;
    let hotel = services.hotels.update_hotel(id, spec).await?;
    Ok(Json(HotelResponse::from(&hotel)))
}

pub async fn delete_hotel(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: HotelId = parse_id(&id)?;
    services.hotels.delete_hotel(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
