use std::rc::Rc;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::web::{self, Data};
use actix_web::{Error, HttpMessage, ResponseError};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::config::AppConfig;
use crate::constants::middleware_constants::is_public;
use crate::db::{get_conn, DbPool};
use crate::errors::AppError;
use crate::models::token_models::Claims;
use crate::services::session_service;
use crate::utils::token_utils::{bearer_token, verify_jwt};

/// Requires a live session for every route outside the public set and
/// attaches the verified [`Claims`]
/// to the request.
pub struct SessionMiddleware;

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = SessionMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct SessionMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SessionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            if is_public(req.path(), req.method()) {
                return service.call(req).await.map(ServiceResponse::map_into_left_body);
            }

            match authenticate(&req).await {
                Ok(claims) => {
                    req.extensions_mut().insert(claims);
                    service.call(req).await.map(ServiceResponse::map_into_left_body)
                }
                Err(err) => {
                    if !matches!(err, AppError::AuthenticationRequired) {
                        log::error!("session lookup failed: {}", err);
                    }
                    let response = err.error_response().map_into_right_body();
                    Ok(req.into_response(response))
                }
            }
        })
    }
}

async fn authenticate(req: &ServiceRequest) -> Result<Claims, AppError> {
    let (pool, config) = match (req.app_data::<Data<DbPool>>(), req.app_data::<Data<AppConfig>>()) {
        (Some(pool), Some(config)) => (pool.clone(), config),
        _ => return Err(AppError::Internal("session middleware is missing app state".into())),
    };

    let token = bearer_token(req.headers())
        .map(str::to_string)
        .ok_or(AppError::AuthenticationRequired)?;
    let claims = verify_jwt(&token, &config.jwt_secret).ok_or(AppError::AuthenticationRequired)?;

    let session = web::block(move || {
        let mut conn = get_conn(&pool)?;
        session_service::find_active(&mut conn, &token)
    })
    .await??;

    match session {
        Some(s) if s.user_id == claims.sub => Ok(claims),
        _ => Err(AppError::AuthenticationRequired),
    }
}
