//! Rooms and the price-range filter used when listing them.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::{HotelId, RoomId};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoomType {
    Single,
    Double,
    Suite,
}

/// A room that belongs to exactly one hotel.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub id: RoomId,
    pub hotel_id: HotelId,
    pub number: u32,
    /// Nightly price in whole currency units.
    pub price: u32,
    pub room_type: RoomType,
    /// Floor area in square metres.
    pub size: f64,
}

impl Room {
    pub fn new(id: RoomId, hotel_id: HotelId, spec: RoomSpec) -> Self {
        Self {
            id,
            hotel_id,
            number: spec.number,
            price: spec.price,
            room_type: spec.room_type,
            size: spec.size,
        }
    }

    /// Overwrite the mutable attributes, keeping identity and hotel ownership.
    pub fn apply(&mut self, spec: RoomSpec) {
        self.number = spec.number;
        self.price = spec.price;
        self.room_type = spec.room_type;
        self.size = spec.size;
    }
}

/// Unvalidated room input, as received from a client.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomDraft {
    pub number: Option<i64>,
    pub price: Option<u32>,
    pub room_type: Option<RoomType>,
    pub size: Option<f64>,
}

/// Validated room attributes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomSpec {
    pub number: u32,
    pub price: u32,
    pub room_type: RoomType,
    pub size: f64,
}

impl RoomDraft {
    pub fn validate(self) -> DomainResult<RoomSpec> {
        let number = self
            .number
            .filter(|n| *n > 0)
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| DomainError::validation("Not a valid room number"))?;
        let room_type = self
            .room_type
            .ok_or_else(|| DomainError::validation("Not a valid room type"))?;
        let price = self
            .price
            .ok_or_else(|| DomainError::validation("Not a valid price"))?;
        let size = self.size.unwrap_or(0.0);
        if !size.is_finite() || size < 0.0 {
            return Err(DomainError::validation("Not a valid room size"));
        }

        Ok(RoomSpec {
            number,
            price,
            room_type,
            size,
        })
    }
}

/// Inclusive price filter.
///
/// Parsed from `"<max>"` (everything up to `max`) or `"<min>-<max>"`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PriceRange {
    min: u32,
    max: u32,
}

impl PriceRange {
    pub fn new(min: u32, max: u32) -> DomainResult<Self> {
        if min > max {
            return Err(DomainError::validation(format!(
                "Not a valid price range: {min} is greater than {max}"
            )));
        }
        Ok(Self { min, max })
    }

    pub fn up_to(max: u32) -> Self {
        Self { min: 0, max }
    }

    pub fn contains(&self, price: u32) -> bool {
        (self.min..=self.max).contains(&price)
    }
}

impl FromStr for PriceRange {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bound = |v: &str| {
            v.trim()
                .parse::<u32>()
                .map_err(|_| DomainError::validation(format!("Not a valid price range: {s}")))
        };

        match s.split_once('-') {
            Some((min, max)) => Self::new(bound(min)?, bound(max)?),
            None => Ok(Self::up_to(bound(s)?)),
        }
    }
}
