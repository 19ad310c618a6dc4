use actix_web::web::{self, scope};

use crate::handlers::session_handlers::{current_user, login, logout};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        scope("/auth")
            .route("/login", web::post().to(login))
            .route("/logout", web::post().to(logout))
            .route("/me", web::get().to(current_user)),
    );
}
