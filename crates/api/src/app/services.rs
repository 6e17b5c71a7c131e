//! Application services shared by all handlers.
//!
//! - `HotelStore`: in-memory hotels and rooms behind an async `RwLock`
//! - `AppServices`: everything a handler can reach through `Extension`

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use innkeep_auth::{CredentialCodec, RoutePolicyRegistry, UserDirectory};
use innkeep_core::{
    DomainError, DomainResult, Hotel, HotelId, HotelSpec, HotelType, PriceRange, Room, RoomId,
    RoomSpec, RoomType,
};

pub struct AppServices {
    pub hotels: HotelStore,
    pub users: UserDirectory,
    pub codec: Arc<dyn CredentialCodec>,
    pub registry: Arc<RoutePolicyRegistry>,
}

const ROOM_NUMBER_IN_USE: &str = "Room number already in use by hotel";

#[derive(Debug, Default)]
struct Inventory {
    hotels: BTreeMap<HotelId, Hotel>,
    last_hotel_id: u32,
    last_room_id: u32,
}

impl Inventory {
    fn next_hotel_id(&mut self) -> DomainResult<HotelId> {
        self.last_hotel_id += 1;
        HotelId::new(self.last_hotel_id)
    }

    fn next_room_id(&mut self) -> DomainResult<RoomId> {
        self.last_room_id += 1;
        RoomId::new(self.last_room_id)
    }

    fn hotel_mut(&mut self, id: HotelId) -> DomainResult<&mut Hotel> {
        self.hotels
            .get_mut(&id)
            .ok_or(DomainError::not_found("Hotel"))
    }

    fn locate_room(&self, id: RoomId) -> DomainResult<(HotelId, usize)> {
        self.hotels
            .values()
            .find_map(|h| {
                h.rooms
                    .iter()
                    .position(|r| r.id == id)
                    .map(|idx| (h.id, idx))
            })
            .ok_or(DomainError::not_found("Room"))
    }

    fn push_room(&mut self, hotel_id: HotelId, spec: RoomSpec) -> DomainResult<Room> {
        let room_id = self.next_room_id()?;
        let hotel = self.hotel_mut(hotel_id)?;
        if hotel.has_room_number(spec.number) {
            return Err(DomainError::conflict(ROOM_NUMBER_IN_USE));
        }
        let room = Room::new(room_id, hotel_id, spec);
        hotel.rooms.push(room.clone());
        Ok(room)
    }
}

/// Hotels and their rooms.
///
/// Ids are handed out sequentially starting at 1 and are never reused.
#[derive(Debug, Default)]
pub struct HotelStore {
    inner: RwLock<Inventory>,
}

impl HotelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn list_hotels(&self) -> Vec<Hotel> {
        self.inner.read().await.hotels.values().cloned().collect()
    }

    pub async fn hotel(&self, id: HotelId) -> DomainResult<Hotel> {
        self.inner
            .read()
            .await
            .hotels
            .get(&id)
            .cloned()
            .ok_or(DomainError::not_found("Hotel"))
    }

    /// Create a hotel together with any rooms in `spec`.
    pub async fn create_hotel(&self, spec: HotelSpec) -> DomainResult<Hotel> {
        let mut inv = self.inner.write().await;
        let id = inv.next_hotel_id()?;
        inv.hotels.insert(id, Hotel::new(id, &spec));
        for room in spec.rooms {
            if let Err(err) = inv.push_room(id, room) {
                inv.hotels.remove(&id);
                return Err(err);
            }
        }
        let hotel = inv.hotel_mut(id)?.clone();

        tracing::info!(hotel_id = %hotel.id, rooms = hotel.rooms.len(), "hotel created");
        Ok(hotel)
    }

    /// Replace name, address and type. Existing rooms are kept.
    pub async fn update_hotel(&self, id: HotelId, spec: HotelSpec) -> DomainResult<Hotel> {
        let mut inv = self.inner.write().await;
        let hotel = inv.hotel_mut(id)?;
        hotel.apply(&spec);
        Ok(hotel.clone())
    }

    /// Remove a hotel and every room it owns.
    pub async fn delete_hotel(&self, id: HotelId) -> DomainResult<Hotel> {
        let removed = self
            .inner
            .write()
            .await
            .hotels
            .remove(&id)
            .ok_or(DomainError::not_found("Hotel"))?;
        tracing::info!(hotel_id = %id, rooms = removed.rooms.len(), "hotel deleted");
        Ok(removed)
    }

    /// All rooms, optionally restricted to a price range.
    pub async fn list_rooms(&self, range: Option<PriceRange>) -> Vec<Room> {
        self.inner
            .read()
            .await
            .hotels
            .values()
            .flat_map(|h| h.rooms.iter())
            .filter(|r| range.is_none_or(|range| range.contains(r.price)))
            .cloned()
            .collect()
    }

    pub async fn room(&self, id: RoomId) -> DomainResult<Room> {
        let inv = self.inner.read().await;
        let (hotel_id, idx) = inv.locate_room(id)?;
        Ok(inv.hotels[&hotel_id].rooms[idx].clone())
    }

    /// Add a room to a hotel and return the updated hotel.
    pub async fn add_room(&self, hotel_id: HotelId, spec: RoomSpec) -> DomainResult<Hotel> {
        let mut inv = self.inner.write().await;
        let room = inv.push_room(hotel_id, spec)?;
        tracing::info!(hotel_id = %hotel_id, room_id = %room.id, number = room.number, "room added");
        Ok(inv.hotel_mut(hotel_id)?.clone())
    }

    pub async fn update_room(&self, id: RoomId, spec: RoomSpec) -> DomainResult<Room> {
        let mut inv = self.inner.write().await;
        let (hotel_id, idx) = inv.locate_room(id)?;
        let hotel = inv.hotel_mut(hotel_id)?;
        if hotel
            .rooms
            .iter()
            .any(|r| r.id != id && r.number == spec.number)
        {
            return Err(DomainError::conflict(ROOM_NUMBER_IN_USE));
        }
        let room = &mut hotel.rooms[idx];
        room.apply(spec);
        Ok(room.clone())
    }

    pub async fn delete_room(&self, id: RoomId) -> DomainResult<Room> {
        let mut inv = self.inner.write().await;
        let (hotel_id, idx) = inv.locate_room(id)?;
        let removed = inv.hotel_mut(hotel_id)?.rooms.remove(idx);
        tracing::info!(hotel_id = %hotel_id, room_id = %id, "room deleted");
        Ok(removed)
    }

    /// Load two demo hotels with six rooms each.
    pub async fn seed_demo(&self) -> DomainResult<()> {
        use RoomType::{Double, Single, Suite};

        let demo = [
            (
                "Hotel California",
                "California",
                HotelType::Luxury,
                [
                    (100, 2520, Single),
                    (101, 2520, Single),
                    (102, 2520, Single),
                    (103, 2520, Single),
                    (104, 3200, Double),
                    (105, 4500, Suite),
                ],
            ),
            (
                "Hilton",
                "Copenhagen",
                HotelType::Standard,
                [
                    (111, 2520, Single),
                    (112, 2520, Single),
                    (113, 2520, Single),
                    (114, 2520, Double),
                    (115, 3200, Double),
                    (116, 4500, Suite),
                ],
            ),
        ];

        for (name, address, hotel_type, rooms) in demo {
            let rooms = rooms
                .into_iter()
                .map(|(number, price, room_type)| RoomSpec {
                    number,
                    price,
                    room_type,
                    size: match room_type {
                        Single => 20.0,
                        Double => 30.0,
                        Suite => 40.0,
                    },
                })
                .collect();

            self.create_hotel(HotelSpec {
                name: name.to_string(),
                address: address.to_string(),
                hotel_type,
                rooms,
            })
            .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hotel_spec(name: &str, rooms: Vec<RoomSpec>) -> HotelSpec {
        HotelSpec {
            name: name.to_string(),
            address: "Main Street 1".to_string(),
            hotel_type: HotelType::Budget,
            rooms,
        }
    }

    fn room_spec(number: u32, price: u32) -> RoomSpec {
        RoomSpec {
            number,
            price,
            room_type: RoomType::Single,
            size: 18.0,
        }
    }

    #[tokio::test]
    async fn ids_are_sequential_and_not_reused() {
        let store = HotelStore::new();
        let first = store.create_hotel(hotel_spec("A", vec![])).await.unwrap();
        let second = store.create_hotel(hotel_spec("B", vec![])).await.unwrap();
        assert_eq!((first.id.get(), second.id.get()), (1, 2));

        store.delete_hotel(second.id).await.unwrap();
        let third = store.create_hotel(hotel_spec("C", vec![])).await.unwrap();
        assert_eq!(third.id.get(), 3);
    }

    #[tokio::test]
    async fn room_numbers_are_unique_per_hotel() {
        let store = HotelStore::new();
        let a = store
            .create_hotel(hotel_spec("A", vec![room_spec(1, 100)]))
            .await
            .unwrap();
        let b = store.create_hotel(hotel_spec("B", vec![])).await.unwrap();

        assert_eq!(
            store.add_room(a.id, room_spec(1, 200)).await.unwrap_err(),
            DomainError::conflict(ROOM_NUMBER_IN_USE)
        );
        // Same number in another hotel is fine.
        store.add_room(b.id, room_spec(1, 200)).await.unwrap();
    }

    #[tokio::test]
    async fn updating_a_room_may_keep_its_own_number() {
        let store = HotelStore::new();
        let hotel = store
            .create_hotel(hotel_spec("A", vec![room_spec(1, 100), room_spec(2, 100)]))
            .await
            .unwrap();
        let room = hotel.rooms[0].id;

        let updated = store.update_room(room, room_spec(1, 150)).await.unwrap();
        assert_eq!(updated.price, 150);
        assert!(store.update_room(room, room_spec(2, 150)).await.is_err());
    }

    #[tokio::test]
    async fn deleting_a_hotel_removes_its_rooms() {
        let store = HotelStore::new();
        let hotel = store
            .create_hotel(hotel_spec("A", vec![room_spec(1, 100)]))
            .await
            .unwrap();
        let room = hotel.rooms[0].id;

        store.delete_hotel(hotel.id).await.unwrap();
        assert_eq!(store.room(room).await.unwrap_err(), DomainError::not_found("Room"));
        assert!(store.list_rooms(None).await.is_empty());
    }

    #[tokio::test]
    async fn list_rooms_filters_by_price() {
        let store = HotelStore::new();
        store.seed_demo().await.unwrap();

        assert_eq!(store.list_rooms(None).await.len(), 12);
        let cheap = store.list_rooms(Some(PriceRange::up_to(3000))).await;
        assert_eq!(cheap.len(), 8);
        assert!(cheap.iter().all(|r| r.price <= 3000));

        let mid = store
            .list_rooms(Some(PriceRange::new(3000, 4000).unwrap()))
            .await;
        assert_eq!(mid.len(), 2);
        assert!(mid.iter().all(|r| r.price == 3200));
    }

    #[tokio::test]
    async fn missing_resources_are_not_found() {
        let store = HotelStore::new();
        let id = HotelId::new(42).unwrap();
        assert_eq!(store.hotel(id).await.unwrap_err(), DomainError::not_found("Hotel"));
        assert!(store.add_room(id, room_spec(1, 1)).await.is_err());
    }
}
