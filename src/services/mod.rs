pub mod bookmark_service;
pub mod media_service;
pub mod playlist_service;
pub mod session_service;
pub mod user_service;

#[cfg(test)]
pub(crate) mod test_support;
