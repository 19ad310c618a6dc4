use actix_web::web::ReqData;
use actix_web::{web, HttpResponse};

use crate::db::{get_conn, DbPool};
use crate::errors::AppError;
use crate::models::bookmark_models::{BookmarkQuery, CreateBookmarkRequest, UpdateBookmarkRequest};
use crate::models::pagination_models::Pagination;
use crate::models::token_models::Claims;
use crate::services::bookmark_service;

pub async fn list_bookmarks(
    pool: web::Data<DbPool>,
    claims: ReqData<Claims>,
    query: web::Query<BookmarkQuery>,
) -> Result<HttpResponse, AppError> {
    let BookmarkQuery { q, limit, offset } = query.into_inner();
    let pagination = Pagination::new(limit, offset);
    let user_id = claims.into_inner().sub;

    let marks = web::block(move || {
        let mut conn = get_conn(&pool)?;
        bookmark_service::list_bookmarks(&mut conn, &user_id, q.as_deref(), &pagination)
    })
    .await??;

    Ok(HttpResponse::Ok().json(marks))
}

pub async fn create_bookmark(
    pool: web::Data<DbPool>,
    claims: ReqData<Claims>,
    payload: web::Json<CreateBookmarkRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = claims.into_inner().sub;
    let request = payload.into_inner();

    let mark = web::block(move || {
        let mut conn = get_conn(&pool)?;
        bookmark_service::create_bookmark(&mut conn, &user_id, request)
    })
    .await??;

    Ok(HttpResponse::Created().json(mark))
}

pub async fn get_bookmark(
    pool: web::Data<DbPool>,
    claims: ReqData<Claims>,
    bookmark_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let bookmark_id = bookmark_id.into_inner();
    let user_id = claims.into_inner().sub;

    let mark = web::block(move || {
        let mut conn = get_conn(&pool)?;
        bookmark_service::get_bookmark(&mut conn, &bookmark_id, &user_id)
    })
    .await??;

    Ok(HttpResponse::Ok().json(mark))
}

pub async fn update_bookmark(
    pool: web::Data<DbPool>,
    claims: ReqData<Claims>,
    bookmark_id: web::Path<String>,
    payload: web::Json<UpdateBookmarkRequest>,
) -> Result<HttpResponse, AppError> {
    let bookmark_id = bookmark_id.into_inner();
    let user_id = claims.into_inner().sub;
    let request = payload.into_inner();

    let mark = web::block(move || {
        let mut conn = get_conn(&pool)?;
        bookmark_service::update_bookmark(&mut conn, &bookmark_id, &user_id, request)
    })
    .await??;

    Ok(HttpResponse::Ok().json(mark))
}

pub async fn delete_bookmark(
    pool: web::Data<DbPool>,
    claims: ReqData<Claims>,
    bookmark_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let bookmark_id = bookmark_id.into_inner();
    let user_id = claims.into_inner().sub;

    web::block(move || {
        let mut conn = get_conn(&pool)?;
        bookmark_service::delete_bookmark(&mut conn, &bookmark_id, &user_id)
    })
    .await??;

    Ok(HttpResponse::NoContent().finish())
}
