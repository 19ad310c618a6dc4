use chrono::NaiveDateTime;
use diesel::prelude::{AsChangeset, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::models::pagination_models::Pagination;

// --------------------- Vocabularies ---------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum FileType {
    Image,
    Audio,
    Video,
    Ebook,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Subcategory {
    Songs,
    Movies,
    ShortClip,
    Music,
    Study,
    Reference,
    Fiction,
    NonFiction,
}

// --------------------- Media Models ---------------------
#[derive(Queryable, Selectable, Serialize, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::media)]
pub struct Media {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub filename: String,
    pub file_type: String,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub upload_date: NaiveDateTime,
    pub user_id: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::media)]
pub struct NewMedia {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub filename: String,
    pub file_type: String,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub upload_date: NaiveDateTime,
    pub user_id: String,
}

/// Outer `None` leaves a column untouched; `Some(None)` clears it.
#[derive(AsChangeset, Default)]
#[diesel(table_name = crate::schema::media)]
pub struct UpdateMedia {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub tags: Option<Option<String>>,
    pub category: Option<Option<String>>,
    pub subcategory: Option<Option<String>>,
}

impl UpdateMedia {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.tags.is_none()
            && self.category.is_none()
            && self.subcategory.is_none()
    }
}

// --------------------- Request Models ---------------------
/// Descriptive fields of an upload; the bytes travel separately.
#[derive(Deserialize, Default, Debug, Clone)]
pub struct NewMediaInput {
    pub title: String,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub file_type: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
}

#[derive(Deserialize, Default, Debug, Clone)]
pub struct MediaUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
}

#[derive(Deserialize, Default, Debug, Clone)]
pub struct MediaFilter {
    pub title: Option<String>,
    pub tags: Option<String>,
    pub file_type: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
}

#[derive(Deserialize)]
pub struct MediaListQuery {
    pub title: Option<String>,
    pub tags: Option<String>,
    pub file_type: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl MediaListQuery {
    pub fn into_parts(self) -> (MediaFilter, Pagination) {
        let pagination = Pagination::new(self.limit, self.offset);
        let filter = MediaFilter {
            title: self.title,
            tags: self.tags,
            file_type: self.file_type,
            category: self.category,
            subcategory: self.subcategory,
        };
        (filter, pagination)
    }
}

#[derive(Deserialize)]
pub struct TitleSearchQuery {
    pub q: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct BulkImportRequest {
    pub folder_path: String,
    #[serde(default)]
    pub default_title: Option<String>,
    #[serde(default)]
    pub default_description: Option<String>,
    #[serde(default)]
    pub default_tags: Option<String>,
}

// --------------------- Response Models ---------------------
#[derive(Queryable, Selectable, Serialize, Debug)]
#[diesel(table_name = crate::schema::media)]
pub struct MediaSummary {
    pub id: String,
    pub title: String,
    pub file_type: String,
}

#[derive(Serialize, Debug, Default, PartialEq)]
pub struct BulkImportReport {
    pub imported: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Serialize, Debug, Default, PartialEq)]
pub struct ReconcileReport {
    pub orphan_files_quarantined: Vec<String>,
    pub rows_missing_files: Vec<String>,
}
