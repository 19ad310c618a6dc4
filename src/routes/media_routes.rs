use actix_web::web;

use crate::handlers::media_handlers::{
    bulk_import, delete_media, download_media, get_media, list_media, search_by_title, update_media, upload_media,
};

pub fn configure(cfg: &mut web::ServiceConfig) {
    // Fixed segments are registered before `/{media_id}`.
    cfg.service(
        web::scope("/media")
            .route("", web::get().to(list_media))
            .route("", web::post().to(upload_media))
            .route("/search_by_title", web::get().to(search_by_title))
            .route("/bulk_import", web::post().to(bulk_import))
            .route("/{media_id}", web::get().to(get_media))
            .route("/{media_id}", web::put().to(update_media))
            .route("/{media_id}", web::delete().to(delete_media))
            .route("/{media_id}/download", web::get().to(download_media)),
    );
}
