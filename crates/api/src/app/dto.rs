use serde::{Deserialize, Serialize};

use innkeep_auth::{Identity, Role, RoutePolicy};
use innkeep_core::{Hotel, HotelDraft, HotelType, Room, RoomDraft, RoomType};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// Hotel body for create and update. Missing fields surface as validation
/// errors from [`HotelDraft::validate`], not as JSON errors.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelRequest {
    pub hotel_name: Option<String>,
    pub hotel_address: Option<String>,
    pub hotel_type: Option<HotelType>,
    #[serde(default)]
    pub rooms: Vec<RoomRequest>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRequest {
    pub room_number: Option<i64>,
    pub room_price: Option<u32>,
    pub room_type: Option<RoomType>,
    pub room_size: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RoomQuery {
    /// `"<max>"` or `"<min>-<max>"`.
    pub range: Option<String>,
}

impl From<HotelRequest> for HotelDraft {
    fn from(req: HotelRequest) -> Self {
        HotelDraft {
            name: req.hotel_name,
            address: req.hotel_address,
            hotel_type: req.hotel_type,
            rooms: req.rooms.into_iter().map(RoomDraft::from).collect(),
        }
    }
}

impl From<RoomRequest> for RoomDraft {
    fn from(req: RoomRequest) -> Self {
        RoomDraft {
            number: req.room_number,
            price: req.room_price,
            room_type: req.room_type,
            size: req.room_size,
        }
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub username: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelResponse {
    pub id: u32,
    pub hotel_name: String,
    pub hotel_address: String,
    pub hotel_type: HotelType,
    pub rooms: Vec<RoomResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomResponse {
    pub id: u32,
    pub hotel_id: u32,
    pub room_number: u32,
    pub room_price: u32,
    pub room_type: RoomType,
    pub room_size: f64,
}

#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub method: String,
    pub path: String,
    pub roles: Vec<Role>,
}

#[derive(Debug, Serialize)]
pub struct IdentityResponse {
    pub username: String,
    pub roles: Vec<Role>,
}

impl From<&Hotel> for HotelResponse {
    fn from(hotel: &Hotel) -> Self {
        Self {
            id: hotel.id.get(),
            hotel_name: hotel.name.clone(),
            hotel_address: hotel.address.clone(),
            hotel_type: hotel.hotel_type,
            rooms: hotel.rooms.iter().map(RoomResponse::from).collect(),
        }
    }
}

impl From<&Room> for RoomResponse {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.get(),
            hotel_id: room.hotel_id.get(),
            room_number: room.number,
            room_price: room.price,
            room_type: room.room_type,
            room_size: room.size,
        }
    }
}

impl From<&RoutePolicy> for RouteResponse {
    fn from(policy: &RoutePolicy) -> Self {
        Self {
            method: policy.method.to_string(),
            path: policy.pattern.as_str().to_string(),
            roles: policy.roles.iter().collect(),
        }
    }
}

impl From<&Identity> for IdentityResponse {
    fn from(identity: &Identity) -> Self {
        Self {
            username: identity.principal().to_string(),
            roles: identity.roles().iter().collect(),
        }
    }
}
