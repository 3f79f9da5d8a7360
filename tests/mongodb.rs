//! Pruebas contra un MongoDB real.
//!
//! Ignoradas por defecto: `MONGODB_URI=mongodb://localhost:27017 cargo test -- --ignored`

use chrono::{DateTime, TimeZone, Utc};
use pispas_availability::config::MongoConfig;
use pispas_availability::db::{
    MongoRepo, ReservationRepository, Restaurant, RestaurantRepository,
};
use pispas_availability::{logging, reservations_at, seats_available};

fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, h, m, 0).unwrap()
}

async fn repo() -> MongoRepo {
    logging::init_tracing();
    let mut config = MongoConfig::from_env().unwrap();
    config.database = format!("pispas_availability_test_{}", uuid::Uuid::new_v4().simple());

    let repo = MongoRepo::connect(&config).await.unwrap();
    repo.create_indexes().await.unwrap();
    repo
}

#[tokio::test]
#[ignore = "requiere MongoDB"]
async fn availability_against_mongodb() {
    let repo = repo().await;
    let r = repo
        .insert_restaurant(Restaurant::with_seats("Casa Paco", 10))
        .await
        .unwrap();

    assert_eq!(seats_available(&repo, &r, at(9, 45)).await.unwrap(), 10);

    for (from, to, guests) in [
        (at(9, 0), at(10, 0), 4),
        (at(9, 30), at(11, 0), 3),
        (at(9, 45), at(9, 45), 6),
    ] {
        repo.insert_reservation(r.reserve("Ana", from, to, guests).unwrap())
            .await
            .unwrap();
    }

    assert_eq!(seats_available(&repo, &r, at(9, 45)).await.unwrap(), -3);
    assert_eq!(seats_available(&repo, &r, at(8, 0)).await.unwrap(), 10);
    assert_eq!(reservations_at(&repo, &r, at(9, 45)).await.unwrap().len(), 3);

    assert_eq!(repo.delete_restaurant(r.id.unwrap()).await.unwrap(), 3);
    assert!(repo.find_restaurant(r.id.unwrap()).await.unwrap().is_none());

    repo.database.drop().await.unwrap();
}

#[tokio::test]
#[ignore = "requiere MongoDB"]
async fn crud_roundtrip_against_mongodb() {
    let repo = repo().await;
    let mut r = repo.insert_restaurant(Restaurant::new("Bar Pepe")).await.unwrap();

    r.num_seats = 40;
    repo.update_restaurant(&r).await.unwrap();
    assert_eq!(
        repo.find_restaurant(r.id.unwrap()).await.unwrap().unwrap().num_seats,
        40
    );

    let mut res = repo
        .insert_reservation(r.reserve("Luis", at(20, 0), at(22, 0), 2).unwrap())
        .await
        .unwrap();
    res.num_guests = 3;
    repo.update_reservation(&res).await.unwrap();
    assert_eq!(
        repo.find_reservation(res.id.unwrap()).await.unwrap(),
        Some(res.clone())
    );

    repo.delete_reservation(res.id.unwrap()).await.unwrap();
    assert!(repo
        .delete_reservation(res.id.unwrap())
        .await
        .unwrap_err()
        .is_not_found());

    repo.database.drop().await.unwrap();
}
