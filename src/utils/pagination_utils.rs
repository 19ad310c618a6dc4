use crate::errors::AppError;
use crate::models::pagination_models::Pagination;

/// Validate pagination parameters, falling back to `default_limit`.
pub fn validate_pagination(p: &Pagination, default_limit: i64) -> Result<(i64, i64), AppError> {
    let limit = p.limit.unwrap_or(default_limit);
    if limit > Pagination::MAX_LIMIT {
        return Err(AppError::Validation(format!(
            "Limit too high: maximum allowed is {}",
            Pagination::MAX_LIMIT
        )));
    }
    if limit < 0 {
        return Err(AppError::Validation("Limit must not be negative".into()));
    }
    let offset = p.offset.unwrap_or(0);
    if offset < 0 {
        return Err(AppError::Validation("Offset must not be negative".into()));
    }
    Ok((limit, offset))
}
