pub mod config;
pub mod constants;
pub mod db;
pub mod errors;
pub mod file_store;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod schema;
pub mod services;
pub mod utils;

use actix_web::web;

use crate::handlers::health_handlers::health;

/// Mounts `/health` and the `/api` tree. App state and the session
/// middleware are attached by the caller.
pub fn configure_app(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .configure(routes::configure);
}
