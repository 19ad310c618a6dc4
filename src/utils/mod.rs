pub mod auth_utils;
pub mod file_utils;
pub mod media_type_utils;
pub mod pagination_utils;
pub mod search_utils;
pub mod token_utils;
