use chrono::NaiveDateTime;
use diesel::prelude::{AsChangeset, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum PlaylistType {
    Audio,
    Video,
    Ebook,
    All,
}

// --------------------- Playlist Models ---------------------
#[derive(Queryable, Selectable, Serialize, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::playlists)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub playlist_type: String,
    pub created_at: NaiveDateTime,
    pub user_id: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::playlists)]
pub struct NewPlaylist {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub playlist_type: String,
    pub created_at: NaiveDateTime,
    pub user_id: String,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = crate::schema::playlists)]
pub struct UpdatePlaylist {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub playlist_type: Option<String>,
}

impl UpdatePlaylist {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.playlist_type.is_none()
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: Option<String>,
    pub playlist_type: String,
}

#[derive(Deserialize, Default, Debug, Clone)]
pub struct UpdatePlaylistRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub playlist_type: Option<String>,
}

// --------------------- Playlist Media Models ---------------------
#[derive(Queryable, Selectable, Serialize, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::playlist_media)]
pub struct PlaylistMedia {
    pub id: i32,
    pub playlist_id: String,
    pub media_id: String,
    pub order_index: i32,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::playlist_media)]
pub struct NewPlaylistMedia<'a> {
    pub playlist_id: &'a str,
    pub media_id: &'a str,
    pub order_index: i32,
}

#[derive(Deserialize)]
pub struct PlaylistMediaRequest {
    pub media_id: String,
}

#[derive(Deserialize)]
pub struct ReorderRequest {
    pub media_ids: Vec<String>,
}

/// Result of an add: a repeated add of the same pair is a success, not a conflict.
#[derive(Debug, PartialEq)]
pub enum AddOutcome {
    Added(PlaylistMedia),
    AlreadyPresent,
}

#[derive(Serialize)]
pub struct AddMediaResponse {
    pub message: &'static str,
    pub order_index: Option<i32>,
}

impl From<AddOutcome> for AddMediaResponse {
    fn from(outcome: AddOutcome) -> Self {
        match outcome {
            AddOutcome::Added(row) => Self {
                message: "Media added to playlist successfully",
                order_index: Some(row.order_index),
            },
            AddOutcome::AlreadyPresent => Self {
                message: "Media already in playlist",
                order_index: None,
            },
        }
    }
}
