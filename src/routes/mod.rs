pub mod bookmark_routes;
pub mod media_routes;
pub mod playlist_routes;
pub mod session_routes;

use actix_web::web;

/// Everything mounted under `/api`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(session_routes::configure)
            .configure(media_routes::configure)
            .configure(playlist_routes::configure)
            .configure(bookmark_routes::configure),
    );
}
