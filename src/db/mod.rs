//! # Almacenamiento
//!
//! Los repositorios se pasan explícitamente a quien los necesita. Hay dos
//! implementaciones con las mismas reglas de validación, clave foránea y
//! borrado en cascada:
//!
//! - [`MongoRepo`] - MongoDB
//! - [`MemoryRepo`] - en memoria, para pruebas y aplicaciones sin base de datos

pub mod memory;
pub mod models;
pub mod mongodb;

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};

use crate::AppResult;

pub use self::memory::MemoryRepo;
pub use self::models::{Reservation, ReservationDisplay, Restaurant, DEFAULT_NUM_SEATS};
pub use self::mongodb::MongoRepo;

/// Repositorio de restaurantes
#[async_trait]
pub trait RestaurantRepository: Send + Sync {
    /// Valida y guarda un restaurante nuevo; devuelve la copia con ID asignado
    async fn insert_restaurant(&self, restaurant: Restaurant) -> AppResult<Restaurant>;

    async fn find_restaurant(&self, id: ObjectId) -> AppResult<Option<Restaurant>>;

    async fn list_restaurants(&self) -> AppResult<Vec<Restaurant>>;

    /// Valida y reemplaza un restaurante existente
    async fn update_restaurant(&self, restaurant: &Restaurant) -> AppResult<()>;

    /// Elimina el restaurante junto con sus reservas
    ///
    /// Devuelve cuántas reservas se han eliminado en cascada.
    async fn delete_restaurant(&self, id: ObjectId) -> AppResult<u64>;
}

/// Repositorio de reservas
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Valida y guarda una reserva nueva; el restaurante debe existir
    async fn insert_reservation(&self, reservation: Reservation) -> AppResult<Reservation>;

    async fn find_reservation(&self, id: ObjectId) -> AppResult<Option<Reservation>>;

    /// Reservas de un restaurante ordenadas por `from_time`
    async fn reservations_of(&self, restaurant_id: ObjectId) -> AppResult<Vec<Reservation>>;

    async fn update_reservation(&self, reservation: &Reservation) -> AppResult<()>;

    async fn delete_reservation(&self, id: ObjectId) -> AppResult<()>;

    /// Reservas del restaurante con `from_time <= at <= to_time`, ordenadas por `from_time`
    async fn reservations_at(
        &self,
        restaurant_id: ObjectId,
        at: DateTime<Utc>,
    ) -> AppResult<Vec<Reservation>>;

    /// Suma de `num_guests` de [`reservations_at`](Self::reservations_at); 0 si no hay ninguna
    async fn reserved_guests_at(&self, restaurant_id: ObjectId, at: DateTime<Utc>)
        -> AppResult<i64>;
}
