use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson, Document};
use chrono::{DateTime, Utc};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Cursor, Database};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{Reservation, ReservationRepository, Restaurant, RestaurantRepository};
use crate::config::MongoConfig;
use crate::errors::ResultExt;
use crate::logging::ErrorLogExt;
use crate::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct MongoRepo {
    pub client: Client,
    pub database: Database,
}

/// Resultado de la agregación `$group` de comensales
#[derive(Deserialize)]
struct GuestTotal {
    total: i64,
}

/// Filtro de reservas de un restaurante cuya ventana contiene `at`
fn overlapping_filter(restaurant_id: ObjectId, at: DateTime<Utc>) -> Document {
    let at = bson::DateTime::from_chrono(at);
    doc! {
        "restaurant_id": restaurant_id,
        "from_time": { "$lte": at },
        "to_time": { "$gte": at },
    }
}

fn guests_pipeline(filter: Document) -> Vec<Document> {
    vec![
        doc! { "$match": filter },
        doc! { "$group": { "_id": Bson::Null, "total": { "$sum": "$num_guests" } } },
    ]
}

async fn collect<T>(mut cursor: Cursor<T>, operation: &str) -> AppResult<Vec<T>>
where
    T: DeserializeOwned + Send + Sync,
{
    let mut results = Vec::new();

    while cursor
        .advance()
        .await
        .map_err(|e| AppError::database(operation, e))?
    {
        let item = cursor
            .deserialize_current()
            .map_err(|e| AppError::database(operation, e))?;
        results.push(item);
    }

    Ok(results)
}

impl MongoRepo {
    /// Conecta usando [`MongoConfig::from_env`]
    pub async fn init() -> AppResult<MongoRepo> {
        let config = MongoConfig::from_env()?;
        Self::connect(&config).await
    }

    pub async fn connect(config: &MongoConfig) -> AppResult<MongoRepo> {
        let options = ClientOptions::parse(&config.uri)
            .await
            .map_err_config("MONGODB_URI inválido")?;

        let client = Client::with_options(options)
            .map_err(|e| AppError::database("connect", e))?;

        let database = client.database(&config.database);

        // Test connection
        database
            .run_command(doc! {"ping": 1})
            .await
            .log_error_context("pinging MongoDB")
            .map_err(|e| AppError::database("ping", e))?;

        tracing::info!(database = %config.database, "Conexión a MongoDB establecida exitosamente");

        Ok(MongoRepo { client, database })
    }

    pub fn restaurants(&self) -> Collection<Restaurant> {
        self.database.collection("restaurants")
    }

    pub fn reservations(&self) -> Collection<Reservation> {
        self.database.collection("reservations")
    }

    /// Crea el índice que sirve a la consulta de disponibilidad
    ///
    /// Un fallo aquí no impide usar el repositorio; quien llama decide si es fatal.
    pub async fn create_indexes(&self) -> AppResult<()> {
        use mongodb::IndexModel;

        let reservation_indexes = vec![
            IndexModel::builder()
                .keys(doc! { "restaurant_id": 1, "from_time": 1, "to_time": 1 })
                .build(),
        ];

        self.reservations()
            .create_indexes(reservation_indexes)
            .await
            .log_error_context("creating reservation indexes")
            .map_err(|e| AppError::database("create_indexes", e))?;

        tracing::info!("Índices MongoDB creados exitosamente");
        Ok(())
    }

    async fn ensure_restaurant(&self, id: ObjectId) -> AppResult<()> {
        let count = self
            .restaurants()
            .count_documents(doc! { "_id": id })
            .await
            .map_err(|e| AppError::database("check_restaurant_exists", e))?;

        if count == 0 {
            tracing::warn!(restaurant_id = %id, "Restaurante no encontrado");
            return Err(AppError::not_found_id("Restaurant", &id.to_hex()));
        }
        Ok(())
    }

    async fn find_reservations(&self, filter: Document, operation: &str) -> AppResult<Vec<Reservation>> {
        let cursor = self
            .reservations()
            .find(filter)
            .sort(doc! { "from_time": 1 })
            .await
            .log_error_context(operation)
            .map_err(|e| AppError::database(operation, e))?;

        collect(cursor, operation).await
    }
}

fn inserted_object_id(id: &Bson) -> AppResult<ObjectId> {
    id.as_object_id()
        .ok_or_else(|| AppError::internal_trace(&format!("ID insertado inesperado: {}", id), None))
}

#[async_trait]
impl RestaurantRepository for MongoRepo {
    async fn insert_restaurant(&self, mut restaurant: Restaurant) -> AppResult<Restaurant> {
        restaurant.validate()?;
        restaurant.id = None;

        let result = self
            .restaurants()
            .insert_one(&restaurant)
            .await
            .log_error_context("inserting new restaurant")
            .map_err(|e| AppError::database("insert_restaurant", e))?;

        restaurant.id = Some(inserted_object_id(&result.inserted_id)?);
        tracing::info!(restaurant = %restaurant.name, "Restaurante guardado");
        Ok(restaurant)
    }

    async fn find_restaurant(&self, id: ObjectId) -> AppResult<Option<Restaurant>> {
        tracing::debug!(restaurant_id = %id, "Buscando restaurante");
        self.restaurants()
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| AppError::database("find_restaurant", e))
    }

    async fn list_restaurants(&self) -> AppResult<Vec<Restaurant>> {
        let cursor = self
            .restaurants()
            .find(doc! {})
            .await
            .log_error_context("listing all restaurants")
            .map_err(|e| AppError::database("list_restaurants", e))?;

        collect(cursor, "list_restaurants").await
    }

    async fn update_restaurant(&self, restaurant: &Restaurant) -> AppResult<()> {
        let id = restaurant.persisted_id()?;
        restaurant.validate()?;

        let result = self
            .restaurants()
            .replace_one(doc! { "_id": id }, restaurant)
            .await
            .log_error_context("updating restaurant")
            .map_err(|e| AppError::database("update_restaurant", e))?;

        if result.matched_count == 0 {
            return Err(AppError::not_found_id("Restaurant", &id.to_hex()));
        }
        tracing::info!(restaurant_id = %id, "Restaurante actualizado");
        Ok(())
    }

    async fn delete_restaurant(&self, id: ObjectId) -> AppResult<u64> {
        self.ensure_restaurant(id).await?;

        // Sin transacción: primero las reservas para no dejar huérfanas
        let cascaded = self
            .reservations()
            .delete_many(doc! { "restaurant_id": id })
            .await
            .log_error_context("deleting reservations of restaurant")
            .map_err(|e| AppError::database("delete_restaurant_reservations", e))?
            .deleted_count;

        let result = self
            .restaurants()
            .delete_one(doc! { "_id": id })
            .await
            .log_error_context("deleting restaurant")
            .map_err(|e| AppError::database("delete_restaurant", e))?;

        if result.deleted_count == 0 {
            return Err(AppError::not_found_id("Restaurant", &id.to_hex()));
        }

        tracing::info!(restaurant_id = %id, cascaded, "Restaurante eliminado");
        Ok(cascaded)
    }
}

#[async_trait]
impl ReservationRepository for MongoRepo {
    async fn insert_reservation(&self, mut reservation: Reservation) -> AppResult<Reservation> {
        reservation.validate()?;
        reservation.to_storage_precision();
        self.ensure_restaurant(reservation.restaurant_id).await?;
        reservation.id = None;

        let result = self
            .reservations()
            .insert_one(&reservation)
            .await
            .log_error_context("inserting new reservation")
            .map_err(|e| AppError::database("insert_reservation", e))?;

        reservation.id = Some(inserted_object_id(&result.inserted_id)?);
        tracing::info!(
            restaurant_id = %reservation.restaurant_id,
            guests = reservation.num_guests,
            "Reserva guardada"
        );
        Ok(reservation)
    }

    async fn find_reservation(&self, id: ObjectId) -> AppResult<Option<Reservation>> {
        self.reservations()
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| AppError::database("find_reservation", e))
    }

    async fn reservations_of(&self, restaurant_id: ObjectId) -> AppResult<Vec<Reservation>> {
        self.find_reservations(doc! { "restaurant_id": restaurant_id }, "reservations_of")
            .await
    }

    async fn update_reservation(&self, reservation: &Reservation) -> AppResult<()> {
        let id = reservation
            .id
            .ok_or_else(|| AppError::validation_field("id", "la reserva no ha sido guardada"))?;
        reservation.validate()?;
        self.ensure_restaurant(reservation.restaurant_id).await?;

        let result = self
            .reservations()
            .replace_one(doc! { "_id": id }, reservation)
            .await
            .log_error_context("updating reservation")
            .map_err(|e| AppError::database("update_reservation", e))?;

        if result.matched_count == 0 {
            return Err(AppError::not_found_id("Reservation", &id.to_hex()));
        }
        tracing::info!(reservation_id = %id, "Reserva actualizada");
        Ok(())
    }

    async fn delete_reservation(&self, id: ObjectId) -> AppResult<()> {
        let result = self
            .reservations()
            .delete_one(doc! { "_id": id })
            .await
            .log_error_context("deleting reservation")
            .map_err(|e| AppError::database("delete_reservation", e))?;

        if result.deleted_count == 0 {
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
        tracing::debug!(restaurant_id = %restaurant_id, at = %at, "Buscando reservas solapadas");
        self.find_reservations(overlapping_filter(restaurant_id, at), "reservations_at")
            .await
    }

    async fn reserved_guests_at(
        &self,
        restaurant_id: ObjectId,
        at: DateTime<Utc>,
    ) -> AppResult<i64> {
        let cursor = self
            .reservations()
            .aggregate(guests_pipeline(overlapping_filter(restaurant_id, at)))
            .await
            .log_error_context("aggregating reserved guests")
            .map_err(|e| AppError::database("reserved_guests_at", e))?;

        // Sin reservas solapadas la agregación no devuelve documentos
        let reserved = match collect(cursor, "reserved_guests_at").await?.into_iter().next() {
            Some(group) => {
                bson::from_document::<GuestTotal>(group)
                    .map_err_internal("resultado de agregación inválido")?
                    .total
            }
            None => 0,
        };

        tracing::debug!(restaurant_id = %restaurant_id, reserved, "Comensales reservados");
        Ok(reserved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn overlapping_filter_uses_inclusive_bounds() {
        let id = ObjectId::new();
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 45, 0).unwrap();
        let filter = overlapping_filter(id, at);

        assert_eq!(filter.get_object_id("restaurant_id").unwrap(), id);
        let from = filter.get_document("from_time").unwrap();
        let to = filter.get_document("to_time").unwrap();
        assert_eq!(from.get_datetime("$lte").unwrap().to_chrono(), at);
        assert_eq!(to.get_datetime("$gte").unwrap().to_chrono(), at);
    }

    #[test]
    fn filter_instant_matches_in_memory_precision() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap() + chrono::Duration::microseconds(700);
        let filter = overlapping_filter(ObjectId::new(), at);
        let lte = filter.get_document("from_time").unwrap().get_datetime("$lte").unwrap();
        assert_eq!(lte.to_chrono(), crate::db::models::storage_instant(at));
    }

    #[test]
    fn pipeline_sums_num_guests() {
        let pipeline = guests_pipeline(doc! {});
        assert_eq!(pipeline.len(), 2);
        let group = pipeline[1].get_document("$group").unwrap();
        assert_eq!(
            group.get_document("total").unwrap().get_str("$sum").unwrap(),
            "$num_guests"
        );
    }

    #[test]
    fn group_total_accepts_int32() {
        let total: GuestTotal =
            bson::from_document(doc! { "_id": Bson::Null, "total": 7_i32 }).unwrap();
        assert_eq!(total.total, 7);
    }
}
