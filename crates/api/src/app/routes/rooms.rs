use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{
        Path, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{Method, StatusCode},
};

use innkeep_auth::Role;
use innkeep_core::{HotelId, PriceRange, RoomDraft, RoomId};

use crate::app::dto::{HotelResponse, RoomQuery, RoomRequest, RoomResponse};
use crate::app::errors::ApiError;
use crate::app::routes::common::parse_id;
use crate::app::routes::{RouteTable, RouteTableError};
use crate::app::services::AppServices;

const STAFF: [Role; 2] = [Role::Admin, Role::Manager];

pub fn routes(table: RouteTable) -> Result<RouteTable, RouteTableError> {
    table
        .route(Method::GET, "/api/v1/rooms", [Role::Anyone], list_rooms)?
        .route(Method::POST, "/api/v1/rooms/hotel/{id}", STAFF, add_room)?
        .route(Method::GET, "/api/v1/rooms/{id}", STAFF, get_room)?
        .route(Method::PUT, "/api/v1/rooms/{id}", STAFF, update_room)?
        .route(Method::DELETE, "/api/v1/rooms/{id}", STAFF, delete_room)
}

/// `?range=3000` lists rooms up to 3000, `?range=3000-4000` an inclusive band.
pub async fn list_rooms(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<RoomQuery>, QueryRejection>,
) -> Result<Json<Vec<RoomResponse>>, ApiError> {
    let Query(query) = query?;
    let range = query
        .range
        .as_deref()
        .map(str::parse::<PriceRange>)
        .transpose()?;

    let rooms = services.hotels.list_rooms(range).await;
    Ok(Json(rooms.iter().map(RoomResponse::from).collect()))
}

pub async fn add_room(
    Extension(services): Extension<Arc<AppServices>>,
    Path(hotel_id): Path<String>,
    payload: Result<Json<RoomRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<HotelResponse>), ApiError> {
    let hotel_id: HotelId = parse_id(&hotel_id)?;
    let Json(body) = payload?;
    let spec = RoomDraft::from(body).validate()?;
    let hotel = services.hotels.add_room(hotel_id, spec).await?;
    Ok((StatusCode::CREATED, Json(HotelResponse::from(&hotel))))
}

pub async fn get_room(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<RoomResponse>, ApiError> {
    let id: RoomId = parse_id(&id)?;
    let room = services.hotels.room(id).await?;
    Ok(Json(RoomResponse::from(&room)))
}

pub async fn update_room(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    payload: Result<Json<RoomRequest>, JsonRejection>,
) -> Result<Json<RoomResponse>, ApiError> {
    let id: RoomId = parse_id(&id)?;
    let Json(body) = payload?;
    let spec = RoomDraft::from(body).validate()?;
    let room = services.hotels.update_room(id, spec).await?;
    Ok(Json(RoomResponse::from(&room)))
}

pub async fn delete_room(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: RoomId = parse_id(&id)?;
    services.hotels.delete_room(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
