//! `innkeep-core` — hotel/room domain building blocks.
//!
//! This crate contains **pure domain** types and validation (no HTTP, no
//! storage, no authorization).

pub mod error;
pub mod hotel;
pub mod id;
pub mod room;

pub use error::{DomainError, DomainResult};
pub use hotel::{Hotel, HotelDraft, HotelSpec, HotelType};
pub use id::{HotelId, RoomId};
pub use room::{PriceRange, Room, RoomDraft, RoomSpec, RoomType};
