use actix_web::web::ReqData;
use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::db::{get_conn, DbPool};
use crate::errors::AppError;
use crate::models::playlist_models::{
    AddMediaResponse, CreatePlaylistRequest, PlaylistMediaRequest, ReorderRequest, UpdatePlaylistRequest,
};
use crate::models::token_models::Claims;
use crate::services::playlist_service;

// --------------------- Playlists ---------------------
pub async fn list_playlists(pool: web::Data<DbPool>, claims: ReqData<Claims>) -> Result<HttpResponse, AppError> {
    let user_id = claims.into_inner().sub;

    let list = web::block(move || {
        let mut conn = get_conn(&pool)?;
        playlist_service::list_playlists(&mut conn, &user_id)
    })
    .await??;

    Ok(HttpResponse::Ok().json(list))
}

pub async fn create_playlist(
    pool: web::Data<DbPool>,
    claims: ReqData<Claims>,
    payload: web::Json<CreatePlaylistRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = claims.into_inner().sub;
    let request = payload.into_inner();

    let created = web::block(move || {
        let mut conn = get_conn(&pool)?;
        playlist_service::create_playlist(&mut conn, &user_id, request)
    })
    .await??;

    Ok(HttpResponse::Created().json(created))
}

pub async fn get_playlist(
    pool: web::Data<DbPool>,
    claims: ReqData<Claims>,
    playlist_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let playlist_id = playlist_id.into_inner();
    let user_id = claims.into_inner().sub;

    let playlist = web::block(move || {
        let mut conn = get_conn(&pool)?;
        playlist_service::get_playlist(&mut conn, &playlist_id, &user_id)
    })
    .await??;

    Ok(HttpResponse::Ok().json(playlist))
}

pub async fn update_playlist(
    pool: web::Data<DbPool>,
    claims: ReqData<Claims>,
    playlist_id: web::Path<String>,
    payload: web::Json<UpdatePlaylistRequest>,
) -> Result<HttpResponse, AppError> {
    let playlist_id = playlist_id.into_inner();
    let user_id = claims.into_inner().sub;
    let request = payload.into_inner();

    let playlist = web::block(move || {
        let mut conn = get_conn(&pool)?;
        playlist_service::update_playlist(&mut conn, &playlist_id, &user_id, request)
    })
    .await??;

    Ok(HttpResponse::Ok().json(playlist))
}

pub async fn delete_playlist(
    pool: web::Data<DbPool>,
    claims: ReqData<Claims>,
    playlist_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let playlist_id = playlist_id.into_inner();
    let user_id = claims.into_inner().sub;

    web::block(move || {
        let mut conn = get_conn(&pool)?;
        playlist_service::delete_playlist(&mut conn, &playlist_id, &user_id)
    })
    .await??;

    Ok(HttpResponse::NoContent().finish())
}

// --------------------- Media in Playlist ---------------------
pub async fn list_playlist_media(
    pool: web::Data<DbPool>,
    claims: ReqData<Claims>,
    playlist_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let playlist_id = playlist_id.into_inner();
    let user_id = claims.into_inner().sub;

    let items = web::block(move || {
        let mut conn = get_conn(&pool)?;
        playlist_service::list_media(&mut conn, &playlist_id, &user_id)
    })
    .await??;

    Ok(HttpResponse::Ok().json(items))
}

pub async fn add_media_to_playlist(
    pool: web::Data<DbPool>,
    claims: ReqData<Claims>,
    playlist_id: web::Path<String>,
    payload: web::Json<PlaylistMediaRequest>,
) -> Result<HttpResponse, AppError> {
    let playlist_id = playlist_id.into_inner();
    let user_id = claims.into_inner().sub;
    let media_id = payload.into_inner().media_id;

    let outcome = web::block(move || {
        let mut conn = get_conn(&pool)?;
        playlist_service::add_media(&mut conn, &playlist_id, &media_id, &user_id)
    })
    .await??;

    Ok(HttpResponse::Ok().json(AddMediaResponse::from(outcome)))
}

pub async fn remove_media_from_playlist(
    pool: web::Data<DbPool>,
    claims: ReqData<Claims>,
    playlist_id: web::Path<String>,
    payload: web::Json<PlaylistMediaRequest>,
) -> Result<HttpResponse, AppError> {
    let playlist_id = playlist_id.into_inner();
    let user_id = claims.into_inner().sub;
    let media_id = payload.into_inner().media_id;

    web::block(move || {
        let mut conn = get_conn(&pool)?;
        playlist_service::remove_media(&mut conn, &playlist_id, &media_id, &user_id)
    })
    .await??;

    Ok(HttpResponse::Ok().json(json!({ "message": "Media removed from playlist successfully" })))
}

pub async fn reorder_playlist_media(
    pool: web::Data<DbPool>,
    claims: ReqData<Claims>,
    playlist_id: web::Path<String>,
    payload: web::Json<ReorderRequest>,
) -> Result<HttpResponse, AppError> {
    let playlist_id = playlist_id.into_inner();
    let user_id = claims.into_inner().sub;
    let media_ids = payload.into_inner().media_ids;

    let members = web::block(move || {
        let mut conn = get_conn(&pool)?;
        playlist_service::reorder(&mut conn, &playlist_id, &user_id, &media_ids)
    })
    .await??;

    Ok(HttpResponse::Ok().json(members))
}
