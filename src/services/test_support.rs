use std::io::Write;

use diesel::{Connection, SqliteConnection};
use tempfile::TempDir;

use crate::db::{apply_pragmas, run_migrations};
use crate::file_store::FileStore;
use crate::models::media_models::{Media, NewMediaInput};
use crate::services::media_service::{create_media, StagedUpload};
use crate::services::user_service::create_user;

pub fn connection() -> SqliteConnection {
    let mut conn = SqliteConnection::establish(":memory:").unwrap();
    apply_pragmas(&mut conn).unwrap();
    run_migrations(&mut conn).unwrap();
    conn
}

/// Creates a user whose password is `password`; returns the id.
pub fn user(conn: &mut SqliteConnection, username: &str) -> String {
    create_user(conn, username, "password", false, 4).unwrap().id
}

pub fn store() -> (TempDir, FileStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    (dir, store)
}

pub fn staged(store: &FileStore, original_filename: &str, bytes: &[u8]) -> StagedUpload {
    let mut file = store.staging_file().unwrap();
    file.write_all(bytes).unwrap();
    StagedUpload {
        original_filename: original_filename.to_string(),
        file,
    }
}

pub fn upload(conn: &mut SqliteConnection, store: &FileStore, owner: &str, filename: &str, title: &str) -> Media {
    create_media(
        conn,
        store,
        owner,
        NewMediaInput {
            title: title.to_string(),
            ..Default::default()
        },
        staged(store, filename, b"content"),
    )
    .unwrap()
}
