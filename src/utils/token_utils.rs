use actix_web::http::header::{HeaderMap, AUTHORIZATION};
use chrono::{Duration, NaiveDateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::token_models::Claims;

/// Mints a token for `user_id`; returns it with its expiry.
pub fn generate_jwt(user_id: &str, secret: &[u8], ttl_hours: i64) -> Result<(String, NaiveDateTime), AppError> {
    let expiration = Duration::try_hours(ttl_hours)
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        .ok_or_else(|| AppError::Config(format!("Session lifetime out of range: {} hours", ttl_hours)))?;
    let claims = Claims {
        sub: user_id.to_owned(),
        exp: expiration.timestamp(),
        jti: Uuid::new_v4().to_string(),
    };
    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))?;
    Ok((token, expiration.naive_utc()))
}

pub fn verify_jwt(token: &str, secret: &[u8]) -> Option<Claims> {
    decode::<Claims>(token, &DecodingKey::from_secret(secret), &Validation::default())
        .ok()
        .map(|data| data.claims)
}

/// The token of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
