use rocket::{serde::json::Json, Route};

use crate::model::api::Ack;

pub fn routes() -> Vec<Route> {
    routes![health]
}

#[get("/health")]
fn health() -> Json<Ack> {
    Json(Ack::default())
}
