use actix_web::error::BlockingError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

/// Every failure a registry, engine or handler can surface.
///
/// Ownership failures are reported as `NotFound` so callers cannot probe
/// for other users' ids.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    NotFound(String),

    #[error("File type not allowed: {0}")]
    UnsupportedFileType(String),

    #[error("{0}")]
    TypeMismatch(String),

    #[error("Upload exceeds the maximum size of {0} bytes")]
    PayloadTooLarge(u64),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Database connection error: {0}")]
    Pool(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: u16,
    error: &'a str,
    message: String,
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::AuthenticationRequired => "authentication_required",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::NotFound(_) => "not_found",
            AppError::UnsupportedFileType(_) => "unsupported_file_type",
            AppError::TypeMismatch(_) => "type_mismatch",
            AppError::PayloadTooLarge(_) => "payload_too_large",
            AppError::Storage(_) | AppError::Database(_) | AppError::Pool(_) => "storage_error",
            AppError::Config(_) | AppError::Internal(_) => "internal_error",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::UnsupportedFileType(_) | AppError::TypeMismatch(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::AuthenticationRequired | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Storage(_)
            | AppError::Database(_)
            | AppError::Pool(_)
            | AppError::Config(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("request failed: {}", self);
        }
        HttpResponse::build(status).json(ErrorBody {
            code: status.as_u16(),
            error: self.kind(),
            message: self.to_string(),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Storage(e.to_string())
    }
}

impl From<BlockingError> for AppError {
    fn from(e: BlockingError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<actix_multipart::MultipartError> for AppError {
    fn from(e: actix_multipart::MultipartError) -> Self {
        AppError::Validation(format!("Malformed multipart payload: {}", e))
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(e: bcrypt::BcryptError) -> Self {
        AppError::Internal(format!("Password hashing failed: {}", e))
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        AppError::Internal(format!("Token error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ownership_failures_map_to_not_found() {
        let err = AppError::NotFound("Media item abc not found".into());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn client_errors_are_bad_request() {
        for err in [
            AppError::Validation("Title is required".into()),
            AppError::UnsupportedFileType(".exe".into()),
            AppError::TypeMismatch("Cannot add image to a video playlist".into()),
        ] {
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn diesel_errors_are_storage_errors() {
        let err: AppError = diesel::result::Error::RollbackTransaction.into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.kind(), "storage_error");
    }
}
