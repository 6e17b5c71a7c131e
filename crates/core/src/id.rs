//! Strongly-typed identifiers used across the domain.
//!
//! Identifiers are positive integers handed out by the store in insertion
//! order, so clients can address resources with short numeric path segments.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a hotel.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HotelId(u32);

/// Identifier of a room.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(u32);

macro_rules! impl_numeric_id {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Wrap a raw identifier. Zero is never a valid identifier.
            pub fn new(raw: u32) -> Result<Self, DomainError> {
                if raw == 0 {
                    return Err(DomainError::invalid_id(concat!($name, " must be positive")));
                }
                Ok(Self(raw))
            }

            pub fn get(self) -> u32 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s
                    .parse::<u32>()
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Self::new(raw)
            }
        }
    };
}

impl_numeric_id!(HotelId, "HotelId");
impl_numeric_id!(RoomId, "RoomId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positive_ids() {
        let id: HotelId = "42".parse().unwrap();
        assert_eq!(id.get(), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn rejects_zero_negative_and_garbage() {
        assert!(matches!("0".parse::<RoomId>(), Err(DomainError::InvalidId(_))));
        assert!("-3".parse::<RoomId>().is_err());
        assert!("abc".parse::<HotelId>().is_err());
        assert!("".parse::<HotelId>().is_err());
    }
}
