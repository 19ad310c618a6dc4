use actix_web::web;

use crate::handlers::bookmark_handlers::{
    create_bookmark, delete_bookmark, get_bookmark, list_bookmarks, update_bookmark,
};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/bookmarks")
            .route("", web::get().to(list_bookmarks))
            .route("", web::post().to(create_bookmark))
            .route("/{bookmark_id}", web::get().to(get_bookmark))
            .route("/{bookmark_id}", web::put().to(update_bookmark))
            .route("/{bookmark_id}", web::delete().to(delete_bookmark)),
    );
}
