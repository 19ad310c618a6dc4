use actix_web::web::ReqData;
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::config::AppConfig;
use crate::db::{get_conn, DbPool};
use crate::errors::AppError;
use crate::models::session_models::LoginRequest;
use crate::models::token_models::Claims;
use crate::models::user_models::UserResponse;
use crate::services::{session_service, user_service};
use crate::utils::token_utils::bearer_token;

pub async fn login(
    pool: web::Data<DbPool>,
    config: web::Data<AppConfig>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let LoginRequest { username, password } = payload.into_inner();

    let session = web::block(move || {
        let mut conn = get_conn(&pool)?;
        session_service::login(
            &mut conn,
            &username,
            &password,
            &config.jwt_secret,
            config.session_ttl_hours,
        )
    })
    .await??;

    Ok(HttpResponse::Ok().json(session))
}

// Log out (delete the session behind the presented token)
pub async fn logout(req: HttpRequest, pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let token = bearer_token(req.headers())
        .map(str::to_string)
        .ok_or(AppError::AuthenticationRequired)?;

    web::block(move || {
        let mut conn = get_conn(&pool)?;
        session_service::logout(&mut conn, &token)
    })
    .await??;

    Ok(HttpResponse::Ok().json(json!({ "message": "Logged out" })))
}

pub async fn current_user(pool: web::Data<DbPool>, claims: ReqData<Claims>) -> Result<HttpResponse, AppError> {
    let user_id = claims.into_inner().sub;

    let user = web::block(move || {
        let mut conn = get_conn(&pool)?;
        user_service::get_user(&mut conn, &user_id)
    })
    .await??;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}
