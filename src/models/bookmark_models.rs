use chrono::NaiveDateTime;
use diesel::prelude::{AsChangeset, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

#[derive(Queryable, Selectable, Serialize, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::bookmarks)]
pub struct Bookmark {
    pub id: String,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub created_at: NaiveDateTime,
    pub user_id: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::bookmarks)]
pub struct NewBookmark {
    pub id: String,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub created_at: NaiveDateTime,
    pub user_id: String,
}

#[derive(AsChangeset, Default, Debug)]
#[diesel(table_name = crate::schema::bookmarks)]
pub struct UpdateBookmark {
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<Option<String>>,
    pub tags: Option<Option<String>>,
}

impl UpdateBookmark {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.url.is_none() && self.description.is_none() && self.tags.is_none()
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct CreateBookmarkRequest {
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub tags: Option<String>,
}

#[derive(Deserialize, Default, Debug, Clone)]
pub struct UpdateBookmarkRequest {
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
}

#[derive(Deserialize)]
pub struct BookmarkQuery {
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
