#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

pub mod api;
pub mod config;
pub mod cors;
pub mod error;
pub mod logging;
pub mod model;
pub mod report;
pub mod service;

pub use config::Config;

/// Assemble the server: configuration, database connection, logging, CORS and routes.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .attach(config::ConfigFairing)
        .attach(config::DatabaseFairing)
        .attach(logging::LoggerFairing)
        .attach(cors::CorsFairing)
        .mount("/", api::routes())
}

/// Assemble the server around an existing database connection.
#[cfg(test)]
pub(crate) async fn rocket_for_db(client: mongodb::Client, db_name: &str) -> Rocket<Build> {
    let db = client.database(db_name);
    model::mongodb::ensure_indexes_exist(&db).await.unwrap();
    rocket::build()
        .attach(config::ConfigFairing)
        .attach(cors::CorsFairing)
        .manage(client)
        .manage(db)
        .mount("/", api::routes())
}

/// Connect to the database named by the `db_uri` setting.
#[cfg(test)]
pub(crate) async fn db_client() -> mongodb::Client {
    let db_uri = rocket::Config::figment()
        .extract_inner::<String>("db_uri")
        .expect("`db_uri` not set");
    mongodb::Client::with_uri_str(&db_uri)
        .await
        .expect("Could not connect to test database")
}

/// Use a random database name to avoid collisions between tests.
#[cfg(test)]
pub(crate) fn database() -> String {
    let random: u32 = rand::random();
    format!("test{random}")
}
