pub mod bookmark_handlers;
pub mod health_handlers;
pub mod media_handlers;
pub mod playlist_handlers;
pub mod session_handlers;
