#[macro_use]
extern crate rocket;

use rocket::{Build, Rocket};

pub mod asset;
pub mod config;
pub mod database;
pub mod model;
pub mod rpc;
pub mod web;
pub mod webby;

use self::config::AppConfig;
use self::database::Catalog;

/// Builds the server around `catalog`, which may still be connecting.
pub fn build_rocket(app: &AppConfig, catalog: Catalog) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("address", app.web.address))
        .merge(("port", app.web.port));

    let rocket = rocket::custom(figment)
        .mount("/", asset::statics())
        .mount("/api", web::routes())
        .register("/", web::catchers())
        .manage(catalog);

    if app.web.allow_origins.is_empty() {
        rocket
    } else {
        rocket.attach(webby::Cors::new(app.web.allow_origins.clone()))
    }
}
