//! # Pispas Availability
//!
//! Librería para consultar la disponibilidad de plazas de los restaurantes a
//! partir de sus reservas, con almacenamiento en MongoDB.
//!
//! ## Características principales
//!
//! - **Restaurantes y reservas**: registros planos con validación explícita
//! - **Disponibilidad**: plazas libres en un instante dado
//! - **Repositorios**: MongoDB o memoria, inyectados por quien llama
//!
//! ## Uso
//!
//! ```no_run
//! use chrono::{Duration, Utc};
//! use pispas_availability::db::{MongoRepo, Restaurant, RestaurantRepository, ReservationRepository};
//! use pispas_availability::{logging, seats_available};
//!
//! # async fn demo() -> pispas_availability::AppResult<()> {
//! logging::init_tracing();
//! let repo = MongoRepo::init().await?;
//!
//! let restaurant = repo.insert_restaurant(Restaurant::with_seats("Casa Paco", 20)).await?;
//! let now = Utc::now();
//! repo.insert_reservation(restaurant.reserve("Ana", now, now + Duration::hours(2), 4)?)
//!     .await?;
//!
//! assert_eq!(seats_available(&repo, &restaurant, now).await?, 16);
//! # Ok(())
//! # }
//! ```
//!
//! ## Arquitectura
//!
//! ```text
//! Aplicación
//!     ↓ seats_available / reservations_at
//! Repositorio (trait)
//!     ↓ MongoDB Driver        ↓ memoria
//! MongoDB Database
//! ```

pub mod availability;
pub mod config;
pub mod db;
pub mod errors;
pub mod logging;
pub mod validation;

pub use availability::{reservations_at, seats_available};
pub use errors::{AppError, AppResult, ResultExt};
