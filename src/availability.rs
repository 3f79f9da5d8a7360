//! # Consulta de disponibilidad
//!
//! Plazas libres de un restaurante en un instante: `num_seats` menos la suma de
//! comensales de las reservas cuya ventana `[from_time, to_time]` contiene el
//! instante. El filtro y la suma se delegan en el repositorio.
//!
//! El resultado no se limita a cero: con overbooking es negativo.

use chrono::{DateTime, Utc};

use crate::db::{Reservation, ReservationRepository, Restaurant};
use crate::AppResult;

/// Reservas de `restaurant` que solapan con `at`
///
/// # Errores
/// - `ValidationWithField`: el restaurante no se ha guardado todavía
/// - `Database`: fallo del repositorio
pub async fn reservations_at<R>(
    repo: &R,
    restaurant: &Restaurant,
    at: DateTime<Utc>,
) -> AppResult<Vec<Reservation>>
where
    R: ReservationRepository + ?Sized,
{
    let restaurant_id = restaurant.persisted_id()?;
    repo.reservations_at(restaurant_id, at).await
}

/// Plazas libres de `restaurant` en `at`
///
/// # Ejemplo
/// ```no_run
/// # async fn demo() -> pispas_availability::AppResult<()> {
/// use chrono::Utc;
/// use pispas_availability::db::{MemoryRepo, Restaurant, RestaurantRepository};
/// use pispas_availability::seats_available;
///
/// let repo = MemoryRepo::new();
/// let restaurant = repo.insert_restaurant(Restaurant::new("Casa Paco")).await?;
/// assert_eq!(seats_available(&repo, &restaurant, Utc::now()).await?, 10);
/// # Ok(())
/// # }
/// ```
pub async fn seats_available<R>(
    repo: &R,
    restaurant: &Restaurant,
    at: DateTime<Utc>,
) -> AppResult<i64>
where
    R: ReservationRepository + ?Sized,
{
    let restaurant_id = restaurant.persisted_id()?;
    let reserved = repo.reserved_guests_at(restaurant_id, at).await?;
    let available = i64::from(restaurant.num_seats) - reserved;

    if available < 0 {
        tracing::warn!(
            restaurant_id = %restaurant_id,
            at = %at,
            num_seats = restaurant.num_seats,
            reserved,
            "Overbooking: más comensales que plazas"
        );
    }

    Ok(available)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryRepo, RestaurantRepository};
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, h, m, 0).unwrap()
    }

    #[tokio::test]
    async fn unsaved_restaurant_is_rejected() {
        let repo = MemoryRepo::new();
        let unsaved = Restaurant::new("Casa Paco");

        assert!(seats_available(&repo, &unsaved, at(9, 0)).await.unwrap_err().is_validation());
        assert!(reservations_at(&repo, &unsaved, at(9, 0)).await.unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn works_through_trait_object() {
        let repo = MemoryRepo::new();
        let r = repo.insert_restaurant(Restaurant::with_seats("Bar", 4)).await.unwrap();
        let dyn_repo: &dyn ReservationRepository = &repo;

        dyn_repo
            .insert_reservation(r.reserve("Ana", at(9, 0), at(10, 0), 3).unwrap())
            .await
            .unwrap();

        assert_eq!(seats_available(dyn_repo, &r, at(9, 15)).await.unwrap(), 1);
        assert_eq!(reservations_at(dyn_repo, &r, at(9, 15)).await.unwrap().len(), 1);
    }
}
