use actix_web::web;

use crate::handlers::playlist_handlers::{
    add_media_to_playlist, create_playlist, delete_playlist, get_playlist, list_playlist_media, list_playlists,
    remove_media_from_playlist, reorder_playlist_media, update_playlist,
};

pub fn configure(cfg: &mut web::ServiceConfig) {
    // Playlists
    cfg.service(
        web::scope("/playlists")
            .route("", web::get().to(list_playlists))
            .route("", web::post().to(create_playlist))
            .route("/{playlist_id}", web::get().to(get_playlist))
            .route("/{playlist_id}", web::put().to(update_playlist))
            .route("/{playlist_id}", web::delete().to(delete_playlist))
            // Media in Playlists
            .route("/{playlist_id}/media", web::get().to(list_playlist_media))
            .route("/{playlist_id}/add_media", web::post().to(add_media_to_playlist))
            .route("/{playlist_id}/remove_media", web::post().to(remove_media_from_playlist))
            .route("/{playlist_id}/reorder_media", web::post().to(reorder_playlist_media)),
    );
}
