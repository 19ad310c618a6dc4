use std::collections::HashSet;
use std::str::FromStr;

use chrono::Utc;
use diesel::dsl::max;
use diesel::prelude::*;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::media_models::Media;
use crate::models::playlist_models::{
    AddOutcome, CreatePlaylistRequest, NewPlaylist, NewPlaylistMedia, Playlist, PlaylistMedia, PlaylistType,
    UpdatePlaylist, UpdatePlaylistRequest,
};
use crate::schema::{media, playlist_media, playlists};
use crate::services::media_service;
use crate::utils::media_type_utils::normalize_text;

fn find_owned(conn: &mut SqliteConnection, playlist_id: &str, user_id: &str) -> AppResult<Playlist> {
    playlists::table
        .filter(playlists::id.eq(playlist_id))
        .filter(playlists::user_id.eq(user_id))
        .select(Playlist::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("Playlist {} not found", playlist_id)))
}

fn parse_playlist_type(value: &str) -> AppResult<PlaylistType> {
    PlaylistType::from_str(value.trim()).map_err(|_| AppError::Validation("Valid Playlist Type is required.".into()))
}

fn required_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Playlist name is required.".into()));
    }
    Ok(name.to_string())
}

// --------------------- Playlists ---------------------
pub fn create_playlist(conn: &mut SqliteConnection, owner_id: &str, req: CreatePlaylistRequest) -> AppResult<Playlist> {
    let new_playlist = NewPlaylist {
        id: Uuid::new_v4().to_string(),
        name: required_name(&req.name)?,
        description: normalize_text(req.description),
        playlist_type: parse_playlist_type(&req.playlist_type)?.to_string(),
        created_at: Utc::now().naive_utc(),
        user_id: owner_id.to_string(),
    };

    diesel::insert_into(playlists::table)
        .values(&new_playlist)
        .execute(conn)?;
    find_owned(conn, &new_playlist.id, owner_id)
}

pub fn list_playlists(conn: &mut SqliteConnection, owner_id: &str) -> AppResult<Vec<Playlist>> {
    Ok(playlists::table
        .filter(playlists::user_id.eq(owner_id))
        .order((playlists::created_at.asc(), playlists::id.asc()))
        .select(Playlist::as_select())
        .load(conn)?)
}

pub fn get_playlist(conn: &mut SqliteConnection, playlist_id: &str, user_id: &str) -> AppResult<Playlist> {
    find_owned(conn, playlist_id, user_id)
}

/// Changing the type does not re-check existing members.
pub fn update_playlist(
    conn: &mut SqliteConnection,
    playlist_id: &str,
    user_id: &str,
    req: UpdatePlaylistRequest,
) -> AppResult<Playlist> {
    let existing = find_owned(conn, playlist_id, user_id)?;

    let changes = UpdatePlaylist {
        name: req.name.as_deref().map(required_name).transpose()?,
        description: req.description.map(|d| normalize_text(Some(d))),
        playlist_type: req
            .playlist_type
            .as_deref()
            .map(|t| parse_playlist_type(t).map(|t| t.to_string()))
            .transpose()?,
    };

    if !changes.is_empty() {
        diesel::update(playlists::table.filter(playlists::id.eq(&existing.id)))
            .set(&changes)
            .execute(conn)?;
    }
    find_owned(conn, playlist_id, user_id)
}

pub fn delete_playlist(conn: &mut SqliteConnection, playlist_id: &str, user_id: &str) -> AppResult<()> {
    conn.immediate_transaction(|conn| {
        let playlist = find_owned(conn, playlist_id, user_id)?;
        diesel::delete(playlist_media::table.filter(playlist_media::playlist_id.eq(&playlist.id))).execute(conn)?;
        diesel::delete(playlists::table.filter(playlists::id.eq(&playlist.id))).execute(conn)?;
        log::info!("deleted playlist {} for user {}", playlist.id, user_id);
        Ok(())
    })
}

// --------------------- Membership ---------------------
/// Appends `media_id` after the current last member.
///
/// Runs under an IMMEDIATE transaction so two adds to the same playlist
/// cannot read the same maximum index.
pub fn add_media(
    conn: &mut SqliteConnection,
    playlist_id: &str,
    media_id: &str,
    user_id: &str,
) -> AppResult<AddOutcome> {
    conn.immediate_transaction(|conn| {
        let playlist = find_owned(conn, playlist_id, user_id)?;
        let item = media_service::get_media(conn, media_id, user_id)?;

        if playlist.playlist_type != PlaylistType::All.to_string() && item.file_type != playlist.playlist_type {
            return Err(AppError::TypeMismatch(format!(
                "Cannot add {} media to a {} playlist.",
                item.file_type, playlist.playlist_type
            )));
        }

        let existing = playlist_media::table
            .filter(playlist_media::playlist_id.eq(&playlist.id))
            .filter(playlist_media::media_id.eq(&item.id))
            .select(PlaylistMedia::as_select())
            .first(conn)
            .optional()?;
        if existing.is_some() {
            return Ok(AddOutcome::AlreadyPresent);
        }

        let last: Option<i32> = playlist_media::table
            .filter(playlist_media::playlist_id.eq(&playlist.id))
            .select(max(playlist_media::order_index))
            .first(conn)?;

        diesel::insert_into(playlist_media::table)
            .values(&NewPlaylistMedia {
                playlist_id: &playlist.id,
                media_id: &item.id,
                order_index: last.unwrap_or(0) + 1,
            })
            .execute(conn)?;

        let row = playlist_media::table
            .filter(playlist_media::playlist_id.eq(&playlist.id))
            .filter(playlist_media::media_id.eq(&item.id))
            .select(PlaylistMedia::as_select())
            .first(conn)?;
        Ok(AddOutcome::Added(row))
    })
}

/// Leaves a gap in the order; remaining indices are not compacted.
pub fn remove_media(conn: &mut SqliteConnection, playlist_id: &str, media_id: &str, user_id: &str) -> AppResult<()> {
    let playlist = find_owned(conn, playlist_id, user_id)?;
    let removed = diesel::delete(
        playlist_media::table
            .filter(playlist_media::playlist_id.eq(&playlist.id))
            .filter(playlist_media::media_id.eq(media_id)),
    )
    .execute(conn)?;

    if removed == 0 {
        return Err(AppError::NotFound("Media not found in playlist".into()));
    }
    Ok(())
}

/// Assigns `order_index = position` to each listed member, all or nothing.
pub fn reorder(
    conn: &mut SqliteConnection,
    playlist_id: &str,
    user_id: &str,
    media_ids: &[String],
) -> AppResult<Vec<PlaylistMedia>> {
    if media_ids.is_empty() {
        return Err(AppError::Validation("Invalid media order provided.".into()));
    }
    let mut seen = HashSet::new();
    if let Some(dup) = media_ids.iter().find(|id| !seen.insert(id.as_str())) {
        return Err(AppError::Validation(format!("Media ID {} appears more than once.", dup)));
    }

    conn.immediate_transaction(|conn| {
        let playlist = find_owned(conn, playlist_id, user_id)?;
        for (position, media_id) in media_ids.iter().enumerate() {
            let order_index =
                i32::try_from(position).map_err(|_| AppError::Validation("Media order is too long.".into()))?;
            let updated = diesel::update(
                playlist_media::table
                    .filter(playlist_media::playlist_id.eq(&playlist.id))
                    .filter(playlist_media::media_id.eq(media_id)),
            )
            .set(playlist_media::order_index.eq(order_index))
            .execute(conn)?;

            if updated == 0 {
                return Err(AppError::Validation(format!(
                    "Media ID {} not found in playlist {}.",
                    media_id, playlist.id
                )));
            }
        }
        Ok(())
    })?;

    list_members(conn, playlist_id, user_id)
}

pub fn list_members(conn: &mut SqliteConnection, playlist_id: &str, user_id: &str) -> AppResult<Vec<PlaylistMedia>> {
    let playlist = find_owned(conn, playlist_id, user_id)?;
    Ok(playlist_media::table
        .filter(playlist_media::playlist_id.eq(&playlist.id))
        .order((playlist_media::order_index.asc(), playlist_media::id.asc()))
        .select(PlaylistMedia::as_select())
        .load(conn)?)
}

pub fn list_media(conn: &mut SqliteConnection, playlist_id: &str, user_id: &str) -> AppResult<Vec<Media>> {
    let playlist = find_owned(conn, playlist_id, user_id)?;
    Ok(playlist_media::table
        .inner_join(media::table)
        .filter(playlist_media::playlist_id.eq(&playlist.id))
        .order((playlist_media::order_index.asc(), playlist_media::id.asc()))
        .select(Media::as_select())
        .load(conn)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{connection, store, upload, user};

    fn playlist(conn: &mut SqliteConnection, owner: &str, name: &str, kind: &str) -> Playlist {
        create_playlist(
            conn,
            owner,
            CreatePlaylistRequest {
                name: name.into(),
                description: None,
                playlist_type: kind.into(),
            },
        )
        .unwrap()
    }

    fn ordered_ids(conn: &mut SqliteConnection, playlist_id: &str, owner: &str) -> Vec<String> {
        list_media(conn, playlist_id, owner)
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect()
    }

    #[test]
    fn create_validates_name_and_type() {
        let mut conn = connection();
        let owner = user(&mut conn, "u1");

        let bad_type = create_playlist(
            &mut conn,
            &owner,
            CreatePlaylistRequest {
                name: "Mix".into(),
                description: None,
                playlist_type: "image".into(),
            },
        );
        assert!(matches!(bad_type, Err(AppError::Validation(_))));

        let blank = create_playlist(
            &mut conn,
            &owner,
            CreatePlaylistRequest {
                name: "  ".into(),
                description: None,
                playlist_type: "audio".into(),
            },
        );
        assert!(matches!(blank, Err(AppError::Validation(_))));

        let ok = playlist(&mut conn, &owner, " Road trip ", "all");
        assert_eq!(ok.name, "Road trip");
        assert_eq!(list_playlists(&mut conn, &owner).unwrap(), vec![ok]);
    }

    #[test]
    fn adds_append_and_repeats_are_ignored() {
        let mut conn = connection();
        let (_dir, store) = store();
        let owner = user(&mut conn, "u1");
        let list = playlist(&mut conn, &owner, "Tunes", "audio");
        let a = upload(&mut conn, &store, &owner, "a.mp3", "A");
        let b = upload(&mut conn, &store, &owner, "b.wav", "B");

        match add_media(&mut conn, &list.id, &a.id, &owner).unwrap() {
            AddOutcome::Added(row) => assert_eq!(row.order_index, 1),
            other => panic!("unexpected: {:?}", other),
        }
        match add_media(&mut conn, &list.id, &b.id, &owner).unwrap() {
            AddOutcome::Added(row) => assert_eq!(row.order_index, 2),
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(add_media(&mut conn, &list.id, &a.id, &owner).unwrap(), AddOutcome::AlreadyPresent);

        let members = list_members(&mut conn, &list.id, &owner).unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(ordered_ids(&mut conn, &list.id, &owner), vec![a.id, b.id]);
    }

    #[test]
    fn concurrent_adds_get_distinct_positions() {
        use crate::db::{get_conn, init_pool, run_migrations};

        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("concurrent.db").display().to_string();
        let pool = init_pool(&db_path, 8).unwrap();
        let (_media_dir, store) = store();

        let (owner, list_id, media_ids) = {
            let mut conn = get_conn(&pool).unwrap();
            run_migrations(&mut conn).unwrap();
            let owner = user(&mut conn, "u1");
            let list = playlist(&mut conn, &owner, "Everything", "all");
            let media_ids: Vec<String> = (0..40)
                .map(|i| upload(&mut conn, &store, &owner, "clip.mp4", &format!("Clip {}", i)).id)
                .collect();
            (owner, list.id, media_ids)
        };

        std::thread::scope(|scope| {
            for media_id in &media_ids {
                let (pool, owner, list_id) = (&pool, &owner, &list_id);
                scope.spawn(move || {
                    let mut conn = get_conn(pool).unwrap();
                    let outcome = add_media(&mut conn, list_id, media_id, owner).unwrap();
                    assert!(matches!(outcome, AddOutcome::Added(_)));
                });
            }
        });

        let mut conn = get_conn(&pool).unwrap();
        let members = list_members(&mut conn, &list_id, &owner).unwrap();
        assert_eq!(members.len(), 40);
        let positions: HashSet<i32> = members.iter().map(|m| m.order_index).collect();
        assert_eq!(positions.len(), 40);
    }

    #[test]
    fn type_mismatch_writes_nothing() {
        let mut conn = connection();
        let (_dir, store) = store();
        let owner = user(&mut conn, "u1");
        let videos = playlist(&mut conn, &owner, "Clips", "video");
        let sunset = upload(&mut conn, &store, &owner, "sunset.jpg", "Sunset");

        let err = add_media(&mut conn, &videos.id, &sunset.id, &owner);
        assert!(matches!(err, Err(AppError::TypeMismatch(_))));
        assert!(list_members(&mut conn, &videos.id, &owner).unwrap().is_empty());

        let everything = playlist(&mut conn, &owner, "Everything", "all");
        assert!(matches!(
            add_media(&mut conn, &everything.id, &sunset.id, &owner).unwrap(),
            AddOutcome::Added(_)
        ));
    }

    #[test]
    fn reorder_assigns_positions() {
        let mut conn = connection();
        let (_dir, store) = store();
        let owner = user(&mut conn, "u1");
        let list = playlist(&mut conn, &owner, "Mix", "all");
        let a = upload(&mut conn, &store, &owner, "a.mp3", "A");
        let b = upload(&mut conn, &store, &owner, "b.mp3", "B");
        let c = upload(&mut conn, &store, &owner, "c.mp3", "C");
        for m in [&a, &b, &c] {
            add_media(&mut conn, &list.id, &m.id, &owner).unwrap();
        }

        let rows = reorder(&mut conn, &list.id, &owner, &[c.id.clone(), a.id.clone(), b.id.clone()]).unwrap();
        let indices: Vec<(String, i32)> = rows.into_iter().map(|r| (r.media_id, r.order_index)).collect();
        assert_eq!(indices, vec![(c.id.clone(), 0), (a.id.clone(), 1), (b.id.clone(), 2)]);
        assert_eq!(ordered_ids(&mut conn, &list.id, &owner), vec![c.id, a.id, b.id]);
    }

    #[test]
    fn reorder_with_unknown_id_changes_nothing() {
        let mut conn = connection();
        let (_dir, store) = store();
        let owner = user(&mut conn, "u1");
        let list = playlist(&mut conn, &owner, "Mix", "all");
        let a = upload(&mut conn, &store, &owner, "a.mp3", "A");
        let b = upload(&mut conn, &store, &owner, "b.mp3", "B");
        add_media(&mut conn, &list.id, &a.id, &owner).unwrap();
        add_media(&mut conn, &list.id, &b.id, &owner).unwrap();
        let before = list_members(&mut conn, &list.id, &owner).unwrap();

        let err = reorder(&mut conn, &list.id, &owner, &[b.id.clone(), "nope".into()]);
        assert!(matches!(err, Err(AppError::Validation(_))));
        assert_eq!(list_members(&mut conn, &list.id, &owner).unwrap(), before);

        assert!(matches!(reorder(&mut conn, &list.id, &owner, &[]), Err(AppError::Validation(_))));
        assert!(matches!(
            reorder(&mut conn, &list.id, &owner, &[a.id.clone(), a.id.clone()]),
            Err(AppError::Validation(_))
        ));
        assert_eq!(list_members(&mut conn, &list.id, &owner).unwrap(), before);
    }

    #[test]
    fn remove_leaves_gap_and_next_add_goes_after_max() {
        let mut conn = connection();
        let (_dir, store) = store();
        let owner = user(&mut conn, "u1");
        let list = playlist(&mut conn, &owner, "Mix", "all");
        let a = upload(&mut conn, &store, &owner, "a.mp3", "A");
        let b = upload(&mut conn, &store, &owner, "b.mp3", "B");
        let c = upload(&mut conn, &store, &owner, "c.mp3", "C");
        add_media(&mut conn, &list.id, &a.id, &owner).unwrap();
        add_media(&mut conn, &list.id, &b.id, &owner).unwrap();

        remove_media(&mut conn, &list.id, &a.id, &owner).unwrap();
        assert!(matches!(
            remove_media(&mut conn, &list.id, &a.id, &owner),
            Err(AppError::NotFound(_))
        ));

        let remaining = list_members(&mut conn, &list.id, &owner).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].order_index, 2);

        match add_media(&mut conn, &list.id, &c.id, &owner).unwrap() {
            AddOutcome::Added(row) => assert_eq!(row.order_index, 3),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn foreign_playlists_and_media_are_not_found() {
        let mut conn = connection();
        let (_dir, store) = store();
        let owner = user(&mut conn, "u1");
        let other = user(&mut conn, "u2");
        let mine = playlist(&mut conn, &owner, "Mine", "all");
        let theirs = playlist(&mut conn, &other, "Theirs", "all");
        let my_track = upload(&mut conn, &store, &owner, "a.mp3", "A");
        let their_track = upload(&mut conn, &store, &other, "b.mp3", "B");

        assert!(matches!(get_playlist(&mut conn, &theirs.id, &owner), Err(AppError::NotFound(_))));
        assert!(matches!(
            add_media(&mut conn, &theirs.id, &my_track.id, &owner),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            add_media(&mut conn, &mine.id, &their_track.id, &owner),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(list_media(&mut conn, &theirs.id, &owner), Err(AppError::NotFound(_))));
        assert!(matches!(delete_playlist(&mut conn, &theirs.id, &owner), Err(AppError::NotFound(_))));
        assert_eq!(list_playlists(&mut conn, &owner).unwrap().len(), 1);
    }

    #[test]
    fn update_is_partial_and_can_clear_description() {
        let mut conn = connection();
        let owner = user(&mut conn, "u1");
        let created = create_playlist(
            &mut conn,
            &owner,
            CreatePlaylistRequest {
                name: "Mix".into(),
                description: Some("old".into()),
                playlist_type: "audio".into(),
            },
        )
        .unwrap();

        let renamed = update_playlist(
            &mut conn,
            &created.id,
            &owner,
            UpdatePlaylistRequest {
                name: Some("New mix".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(renamed.name, "New mix");
        assert_eq!(renamed.description.as_deref(), Some("old"));

        let cleared = update_playlist(
            &mut conn,
            &created.id,
            &owner,
            UpdatePlaylistRequest {
                description: Some(String::new()),
                playlist_type: Some("video".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(cleared.description, None);
        assert_eq!(cleared.playlist_type, "video");

        assert!(matches!(
            update_playlist(
                &mut conn,
                &created.id,
                &owner,
                UpdatePlaylistRequest {
                    playlist_type: Some("image".into()),
                    ..Default::default()
                }
            ),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn deleting_media_or_playlist_drops_memberships() {
        let mut conn = connection();
        let (_dir, store) = store();
        let owner = user(&mut conn, "u1");
        let list = playlist(&mut conn, &owner, "Mix", "all");
        let a = upload(&mut conn, &store, &owner, "a.mp3", "A");
        let b = upload(&mut conn, &store, &owner, "b.mp3", "B");
        add_media(&mut conn, &list.id, &a.id, &owner).unwrap();
        add_media(&mut conn, &list.id, &b.id, &owner).unwrap();

        media_service::delete_media(&mut conn, &store, &a.id, &owner).unwrap();
        assert_eq!(ordered_ids(&mut conn, &list.id, &owner), vec![b.id.clone()]);

        delete_playlist(&mut conn, &list.id, &owner).unwrap();
        let leftover: i64 = playlist_media::table.count().get_result(&mut conn).unwrap();
        assert_eq!(leftover, 0);
        assert!(media_service::get_media(&mut conn, &b.id, &owner).is_ok());
    }

    #[test]
    fn sunset_photo_lands_in_a_mixed_playlist() {
        let mut conn = connection();
        let (_dir, store) = store();
        let owner = user(&mut conn, "u1");
        let sunset = upload(&mut conn, &store, &owner, "sunset.jpg", "Sunset");
        let clip = upload(&mut conn, &store, &owner, "beach.mp4", "Beach");
        let trip = playlist(&mut conn, &owner, "Trip", "all");

        add_media(&mut conn, &trip.id, &clip.id, &owner).unwrap();
        add_media(&mut conn, &trip.id, &sunset.id, &owner).unwrap();
        reorder(&mut conn, &trip.id, &owner, &[sunset.id.clone(), clip.id.clone()]).unwrap();

        let items = list_media(&mut conn, &trip.id, &owner).unwrap();
        assert_eq!(items[0].title, "Sunset");
        assert_eq!(items[0].file_type, "image");
        assert_eq!(items[1].title, "Beach");
    }
}
