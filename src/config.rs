use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::Duration;

use crate::errors::AppError;

/// Runtime settings, read from the environment (and `.env` when present).
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub db_pool_size: u32,
    pub media_dir: PathBuf,
    pub jwt_secret: Vec<u8>,
    pub session_ttl_hours: i64,
    pub admin_username: String,
    pub admin_password: String,
    pub max_upload_bytes: u64,
    pub bcrypt_cost: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::Config("JWT_SECRET must be set".into()))?
            .into_bytes();

        let max_upload_mb: u64 = parse_or(&lookup, "MAX_UPLOAD_MB", 100)?;
        let max_upload_bytes = max_upload_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| AppError::Config(format!("MAX_UPLOAD_MB is too large: {}", max_upload_mb)))?;

        let session_ttl_hours: i64 = parse_or(&lookup, "SESSION_TTL_HOURS", 720)?;
        if session_ttl_hours <= 0 || Duration::try_hours(session_ttl_hours).is_none() {
            return Err(AppError::Config(format!(
                "SESSION_TTL_HOURS is out of range: {}",
                session_ttl_hours
            )));
        }

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 8080)?,
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| "media.db".to_string()),
            db_pool_size: parse_or(&lookup, "DB_POOL_SIZE", 8)?,
            media_dir: PathBuf::from(lookup("MEDIA_DIR").unwrap_or_else(|| "media_library".to_string())),
            jwt_secret,
            session_ttl_hours,
            admin_username: lookup("ADMIN_USERNAME").unwrap_or_else(|| "admin".to_string()),
            admin_password: lookup("ADMIN_PASSWORD").unwrap_or_else(|| "admin".to_string()),
            max_upload_bytes,
            bcrypt_cost: parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("Invalid {}: {}", key, raw))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let cfg = AppConfig::from_lookup(lookup_from(&[("JWT_SECRET", "s3cret")])).unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.database_url, "media.db");
        assert_eq!(cfg.media_dir, PathBuf::from("media_library"));
        assert_eq!(cfg.admin_username, "admin");
        assert_eq!(cfg.max_upload_bytes, 100 * 1024 * 1024);
        assert_eq!(cfg.jwt_secret, b"s3cret".to_vec());
    }

    #[test]
    fn missing_secret_is_a_config_error() {
        let err = AppConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn oversized_limits_are_config_errors() {
        let huge_upload = AppConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", "x"),
            ("MAX_UPLOAD_MB", "18446744073709551615"),
        ]))
        .unwrap_err();
        assert!(huge_upload.to_string().contains("MAX_UPLOAD_MB"));

        for ttl in ["9223372036854775807", "0", "-5"] {
            let err = AppConfig::from_lookup(lookup_from(&[("JWT_SECRET", "x"), ("SESSION_TTL_HOURS", ttl)]))
                .unwrap_err();
            assert!(matches!(err, AppError::Config(_)));
        }
    }

    #[test]
    fn malformed_number_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("JWT_SECRET", "x"), ("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
