pub mod bookmark_models;
pub mod media_models;
pub mod pagination_models;
pub mod playlist_models;
pub mod session_models;
pub mod token_models;
pub mod user_models;
