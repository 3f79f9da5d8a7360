use std::fmt;

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{validate_min, validate_name};
use crate::{AppError, AppResult};

/// Número de plazas de un restaurante cuando no se indica otro
pub const DEFAULT_NUM_SEATS: i32 = 10;

fn default_num_seats() -> i32 {
    DEFAULT_NUM_SEATS
}

/// `t` con la precisión de una fecha BSON (milisegundos, truncando)
///
/// Todas las comparaciones de ventanas pasan por aquí para que MongoDB y la
/// memoria cuenten las mismas reservas.
pub fn storage_instant(t: DateTime<Utc>) -> DateTime<Utc> {
    bson::DateTime::from_chrono(t).to_chrono()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Restaurant {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(default = "default_num_seats")]
    pub num_seats: i32,
}

impl Restaurant {
    /// Restaurante sin guardar con el número de plazas por defecto
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_seats(name, DEFAULT_NUM_SEATS)
    }

    pub fn with_seats(name: impl Into<String>, num_seats: i32) -> Self {
        Restaurant {
            id: None,
            name: name.into(),
            num_seats,
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        validate_name("name", &self.name)?;
        validate_min("num_seats", self.num_seats, 1)
    }

    /// ID asignado por el almacenamiento
    ///
    /// # Errores
    /// - `ValidationWithField`: el restaurante todavía no se ha guardado
    pub fn persisted_id(&self) -> AppResult<ObjectId> {
        self.id
            .ok_or_else(|| AppError::validation_field("id", "el restaurante no ha sido guardado"))
    }

    /// Crea una reserva sin guardar para este restaurante
    pub fn reserve(
        &self,
        name: impl Into<String>,
        from_time: DateTime<Utc>,
        to_time: DateTime<Utc>,
        num_guests: i32,
    ) -> AppResult<Reservation> {
        Ok(Reservation::new(
            self.persisted_id()?,
            name,
            from_time,
            to_time,
            num_guests,
        ))
    }

    /// Plazas libres en `at` contando solo las reservas de `reservations`
    /// que pertenecen a este restaurante
    ///
    /// Puede ser negativo si hay overbooking.
    pub fn seats_available_among(&self, reservations: &[Reservation], at: DateTime<Utc>) -> i64 {
        let reserved: i64 = reservations
            .iter()
            .filter(|r| Some(r.restaurant_id) == self.id && r.overlaps(at))
            .map(|r| i64::from(r.num_guests))
            .sum();
        i64::from(self.num_seats) - reserved
    }
}

impl fmt::Display for Restaurant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Restaurant {} ({} seats)", self.name, self.num_seats)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Reservation {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub restaurant_id: ObjectId,
    /// Nombre del cliente que reserva
    pub name: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub from_time: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub to_time: DateTime<Utc>,
    pub num_guests: i32,
}

impl Reservation {
    pub fn new(
        restaurant_id: ObjectId,
        name: impl Into<String>,
        from_time: DateTime<Utc>,
        to_time: DateTime<Utc>,
        num_guests: i32,
    ) -> Self {
        Reservation {
            id: None,
            restaurant_id,
            name: name.into(),
            from_time: storage_instant(from_time),
            to_time: storage_instant(to_time),
            num_guests,
        }
    }

    /// Trunca `from_time`/`to_time` a milisegundos antes de guardar
    pub fn to_storage_precision(&mut self) {
        self.from_time = storage_instant(self.from_time);
        self.to_time = storage_instant(self.to_time);
    }

    /// `from_time` posterior a `to_time` no se considera un error.
    pub fn validate(&self) -> AppResult<()> {
        validate_name("name", &self.name)?;
        validate_min("num_guests", self.num_guests, 1)
    }

    /// La ventana `[from_time, to_time]` contiene `at` (ambos extremos incluidos)
    ///
    /// Se compara a milisegundos, igual que el filtro de MongoDB.
    pub fn overlaps(&self, at: DateTime<Utc>) -> bool {
        let at = storage_instant(at);
        storage_instant(self.from_time) <= at && storage_instant(self.to_time) >= at
    }

    /// Representación textual junto al restaurante al que pertenece
    pub fn display_with<'a>(&'a self, restaurant: &'a Restaurant) -> ReservationDisplay<'a> {
        ReservationDisplay {
            reservation: self,
            restaurant,
        }
    }
}

pub struct ReservationDisplay<'a> {
    reservation: &'a Reservation,
    restaurant: &'a Restaurant,
}

impl fmt::Display for ReservationDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Reservation for {} at {}: {} guests from {} to {}",
            self.reservation.name,
            self.restaurant.name,
            self.reservation.num_guests,
            self.reservation.from_time,
            self.reservation.to_time,
        )
    }
}
