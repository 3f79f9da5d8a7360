use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{Reservation, ReservationRepository, Restaurant, RestaurantRepository};
use crate::{AppError, AppResult};

#[derive(Debug, Default)]
struct State {
    restaurants: Vec<Restaurant>,
    reservations: Vec<Reservation>,
}

impl State {
    fn restaurant_exists(&self, id: ObjectId) -> bool {
        self.restaurants.iter().any(|r| r.id == Some(id))
    }

    fn ensure_restaurant(&self, id: ObjectId) -> AppResult<()> {
        if self.restaurant_exists(id) {
            Ok(())
        } else {
            Err(AppError::not_found_id("Restaurant", &id.to_hex()))
        }
    }

    fn sorted_by_from_time(&self, mut pred: impl FnMut(&Reservation) -> bool) -> Vec<Reservation> {
        let mut found: Vec<Reservation> = self
            .reservations
            .iter()
            .filter(|&r| pred(r))
            .cloned()
            .collect();
        found.sort_by_key(|r| r.from_time);
        found
    }
}

/// Repositorio en memoria
///
/// Los clones comparten el mismo estado.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepo {
    state: Arc<RwLock<State>>,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RestaurantRepository for MemoryRepo {
    async fn insert_restaurant(&self, mut restaurant: Restaurant) -> AppResult<Restaurant> {
        restaurant.validate()?;
        restaurant.id = Some(ObjectId::new());

        self.state.write().await.restaurants.push(restaurant.clone());
        tracing::info!(restaurant = %restaurant.name, "Restaurante guardado en memoria");
        Ok(restaurant)
    }

    async fn find_restaurant(&self, id: ObjectId) -> AppResult<Option<Restaurant>> {
        let state = self.state.read().await;
        Ok(state.restaurants.iter().find(|r| r.id == Some(id)).cloned())
    }

    async fn list_restaurants(&self) -> AppResult<Vec<Restaurant>> {
        Ok(self.state.read().await.restaurants.clone())
    }

    async fn update_restaurant(&self, restaurant: &Restaurant) -> AppResult<()> {
        let id = restaurant.persisted_id()?;
        restaurant.validate()?;

        let mut state = self.state.write().await;
        let slot = state
            .restaurants
            .iter_mut()
            .find(|r| r.id == Some(id))
            .ok_or_else(|| AppError::not_found_id("Restaurant", &id.to_hex()))?;
        *slot = restaurant.clone();
        tracing::info!(restaurant_id = %id, "Restaurante actualizado");
        Ok(())
    }

    async fn delete_restaurant(&self, id: ObjectId) -> AppResult<u64> {
        let mut state = self.state.write().await;
        state.ensure_restaurant(id)?;

        let before = state.reservations.len();
        state.reservations.retain(|r| r.restaurant_id != id);
        let cascaded = (before - state.reservations.len()) as u64;
        state.restaurants.retain(|r| r.id != Some(id));

        tracing::info!(restaurant_id = %id, cascaded, "Restaurante eliminado");
        Ok(cascaded)
    }
}

#[async_trait]
impl ReservationRepository for MemoryRepo {
    async fn insert_reservation(&self, mut reservation: Reservation) -> AppResult<Reservation> {
        reservation.validate()?;
        reservation.to_storage_precision();

        let mut state = self.state.write().await;
        state.ensure_restaurant(reservation.restaurant_id)?;
        reservation.id = Some(ObjectId::new());
        state.reservations.push(reservation.clone());
        tracing::info!(
            restaurant_id = %reservation.restaurant_id,
            guests = reservation.num_guests,
            "Reserva guardada en memoria"
        );
        Ok(reservation)
    }

    async fn find_reservation(&self, id: ObjectId) -> AppResult<Option<Reservation>> {
        let state = self.state.read().await;
        Ok(state.reservations.iter().find(|r| r.id == Some(id)).cloned())
    }

    async fn reservations_of(&self, restaurant_id: ObjectId) -> AppResult<Vec<Reservation>> {
        let state = self.state.read().await;
        Ok(state.sorted_by_from_time(|r| r.restaurant_id == restaurant_id))
    }

    async fn update_reservation(&self, reservation: &Reservation) -> AppResult<()> {
        let id = reservation
            .id
            .ok_or_else(|| AppError::validation_field("id", "la reserva no ha sido guardada"))?;
        reservation.validate()?;

        let mut state = self.state.write().await;
        state.ensure_restaurant(reservation.restaurant_id)?;
        let slot = state
            .reservations
            .iter_mut()
            .find(|r| r.id == Some(id))
            .ok_or_else(|| AppError::not_found_id("Reservation", &id.to_hex()))?;
        *slot = reservation.clone();
        slot.to_storage_precision();
        tracing::info!(reservation_id = %id, "Reserva actualizada");
        Ok(())
    }

    async fn delete_reservation(&self, id: ObjectId) -> AppResult<()> {
        let mut state = self.state.write().await;
        let before = state.reservations.len();
        state.reservations.retain(|r| r.id != Some(id));

        if state.reservations.len() == before {
            return Err(AppError::not_found_id("Reservation", &id.to_hex()));
        }
        tracing::info!(reservation_id = %id, "Reserva eliminada");
        Ok(())
    }

    async fn reservations_at(
        &self,
        restaurant_id: ObjectId,
        at: DateTime<Utc>,
    ) -> AppResult<Vec<Reservation>> {
        let state = self.state.read().await;
        Ok(state.sorted_by_from_time(|r| r.restaurant_id == restaurant_id && r.overlaps(at)))
    }

    async fn reserved_guests_at(
        &self,
        restaurant_id: ObjectId,
        at: DateTime<Utc>,
    ) -> AppResult<i64> {
        let state = self.state.read().await;
        Ok(state
            .reservations
            .iter()
            .filter(|r| r.restaurant_id == restaurant_id && r.overlaps(at))
            .map(|r| i64::from(r.num_guests))
            .sum())
    }
}
