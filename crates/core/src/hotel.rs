//! Hotels: the aggregate that owns rooms.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::HotelId;
use crate::room::{Room, RoomDraft, RoomSpec};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HotelType {
    Luxury,
    Standard,
    Budget,
}

/// A hotel and the rooms it owns.
///
/// # Invariants
/// - Room numbers are unique within a hotel.
/// - Every room's `hotel_id` equals the hotel's `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct Hotel {
    pub id: HotelId,
    pub name: String,
    pub address: String,
    pub hotel_type: HotelType,
    pub rooms: Vec<Room>,
}

impl Hotel {
    pub fn new(id: HotelId, spec: &HotelSpec) -> Self {
        Self {
            id,
            name: spec.name.clone(),
            address: spec.address.clone(),
            hotel_type: spec.hotel_type,
            rooms: Vec::new(),
        }
    }

    /// Update name, address and type. Rooms are managed separately.
    pub fn apply(&mut self, spec: &HotelSpec) {
        self.name = spec.name.clone();
        self.address = spec.address.clone();
        self.hotel_type = spec.hotel_type;
    }

    pub fn has_room_number(&self, number: u32) -> bool {
        self.rooms.iter().any(|r| r.number == number)
    }
}

/// Unvalidated hotel input, as received from a client.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HotelDraft {
    pub name: Option<String>,
    pub address: Option<String>,
    pub hotel_type: Option<HotelType>,
    pub rooms: Vec<RoomDraft>,
}

/// Validated hotel attributes plus the rooms to create with it.
#[derive(Debug, Clone, PartialEq)]
pub struct HotelSpec {
    pub name: String,
    pub address: String,
    pub hotel_type: HotelType,
    pub rooms: Vec<RoomSpec>,
}

impl HotelDraft {
    pub fn validate(self) -> DomainResult<HotelSpec> {
        let address = non_blank(self.address)
            .ok_or_else(|| DomainError::validation("Hotel address must be set"))?;
        let name =
            non_blank(self.name).ok_or_else(|| DomainError::validation("Hotel name must be set"))?;
        let hotel_type = self
            .hotel_type
            .ok_or_else(|| DomainError::validation("Hotel type must be set"))?;

        let rooms = self
            .rooms
            .into_iter()
            .map(RoomDraft::validate)
            .collect::<DomainResult<Vec<_>>>()?;

        let mut seen = HashSet::new();
        if let Some(dup) = rooms.iter().find(|r| !seen.insert(r.number)) {
            return Err(DomainError::conflict(format!(
                "room number {} appears more than once",
                dup.number
            )));
        }

        Ok(HotelSpec {
            name,
            address,
            hotel_type,
            rooms,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
