use std::path::Path;
use std::str::FromStr;

use crate::errors::AppError;
use crate::models::media_models::{FileType, Subcategory};

pub const ALLOWED_EXTENSIONS: [&str; 11] = [
    ".jpg", ".jpeg", ".png", ".gif", ".mp3", ".wav", ".mp4", ".mov", ".pdf", ".docx", ".txt",
];

/// Lowercased extension including the leading dot, e.g. `".pdf"`.
pub fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{}", ext.to_lowercase()))
}

pub fn file_type_for_extension(ext: &str) -> FileType {
    match ext {
        ".jpg" | ".jpeg" | ".png" | ".gif" => FileType::Image,
        ".mp3" | ".wav" => FileType::Audio,
        ".mp4" | ".mov" => FileType::Video,
        ".pdf" | ".docx" | ".txt" => FileType::Ebook,
        _ => FileType::Other,
    }
}

pub fn is_allowed(filename: &str) -> bool {
    extension_of(filename)
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Returns the normalized extension of an allowed upload.
pub fn ensure_supported(filename: &str) -> Result<String, AppError> {
    match extension_of(filename) {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => Ok(ext),
        Some(ext) => Err(AppError::UnsupportedFileType(ext)),
        None => Err(AppError::UnsupportedFileType(filename.to_string())),
    }
}

/// Trims a free-text field; blank values collapse to `None`.
pub fn normalize_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn parse_file_type(value: &str) -> Result<FileType, AppError> {
    FileType::from_str(value).map_err(|_| AppError::Validation(format!("Invalid file type: {}", value)))
}

/// Categories share the file type vocabulary; blank means unset.
pub fn validate_category(value: Option<String>) -> Result<Option<String>, AppError> {
    match normalize_text(value) {
        Some(v) => FileType::from_str(&v)
            .map(|c| Some(c.to_string()))
            .map_err(|_| AppError::Validation("Invalid category selected.".into())),
        None => Ok(None),
    }
}

pub fn validate_subcategory(value: Option<String>) -> Result<Option<String>, AppError> {
    match normalize_text(value) {
        Some(v) => Subcategory::from_str(&v)
            .map(|s| Some(s.to_string()))
            .map_err(|_| AppError::Validation("Invalid subcategory selected.".into())),
        None => Ok(None),
    }
}
