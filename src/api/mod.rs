use rocket::Route;

mod export;
mod health;
mod questions;
mod responses;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(health::routes());
    routes.extend(questions::routes());
    routes.extend(responses::routes());
    routes.extend(export::routes());
    routes.extend(crate::cors::routes());
    routes
}
