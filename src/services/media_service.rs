use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::Utc;
use diesel::expression::BoxableExpression;
use diesel::prelude::*;
use diesel::sql_types::Bool;
use diesel::sqlite::Sqlite;
use tempfile::NamedTempFile;
use uuid::Uuid;
use walkdir::WalkDir;

use crate::errors::{AppError, AppResult};
use crate::file_store::FileStore;
use crate::models::media_models::{
    BulkImportReport, BulkImportRequest, Media, MediaFilter, MediaSummary, MediaUpdateRequest, NewMedia,
    NewMediaInput, ReconcileReport, UpdateMedia,
};
use crate::models::pagination_models::Pagination;
use crate::schema::media;
use crate::utils::media_type_utils::{
    ensure_supported, extension_of, file_type_for_extension, is_allowed, normalize_text, parse_file_type,
    validate_category, validate_subcategory,
};
use crate::utils::pagination_utils::validate_pagination;
use crate::utils::search_utils::{contains_pattern, LIKE_ESCAPE};

const DEFAULT_PAGE_SIZE: i64 = 20;
const TITLE_SEARCH_LIMIT: i64 = 10;

type MediaPredicate = Box<dyn BoxableExpression<media::table, Sqlite, SqlType = Bool>>;

/// Uploaded bytes waiting in the store's staging area.
pub struct StagedUpload {
    pub original_filename: String,
    pub file: NamedTempFile,
}

/// Stored names are a simple-format UUID plus the normalized extension.
fn generated_filename(ext: &str) -> String {
    format!("{}{}", Uuid::new_v4().simple(), ext)
}

fn is_generated_filename(name: &str) -> bool {
    let Some(ext) = extension_of(name) else {
        return false;
    };
    let Some(stem) = name.strip_suffix(ext.as_str()) else {
        return false;
    };
    is_allowed(name) && stem.len() == 32 && stem.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

fn find_owned(conn: &mut SqliteConnection, media_id: &str, user_id: &str) -> AppResult<Media> {
    media::table
        .filter(media::id.eq(media_id))
        .filter(media::user_id.eq(user_id))
        .select(Media::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("Media item {} not found", media_id)))
}

// --------------------- Create ---------------------
pub fn create_media(
    conn: &mut SqliteConnection,
    store: &FileStore,
    owner_id: &str,
    input: NewMediaInput,
    upload: StagedUpload,
) -> AppResult<Media> {
    let ext = ensure_supported(&upload.original_filename)?;

    let title = input.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::Validation("Title is required.".into()));
    }

    let file_type = match normalize_text(input.file_type) {
        Some(explicit) => parse_file_type(&explicit)?,
        None => file_type_for_extension(&ext),
    };
    let category = validate_category(input.category)?.or_else(|| Some(file_type.to_string()));
    let subcategory = validate_subcategory(input.subcategory)?;

    let filename = generated_filename(&ext);
    store.persist(upload.file, &filename)?;

    let new_media = NewMedia {
        id: Uuid::new_v4().to_string(),
        title,
        description: normalize_text(input.description),
        tags: normalize_text(input.tags),
        filename,
        file_type: file_type.to_string(),
        category,
        subcategory,
        upload_date: Utc::now().naive_utc(),
        user_id: owner_id.to_string(),
    };

    if let Err(e) = diesel::insert_into(media::table).values(&new_media).execute(conn) {
        if let Err(cleanup) = store.remove(&new_media.filename) {
            log::error!("could not remove {} after failed insert: {}", new_media.filename, cleanup);
        }
        return Err(AppError::Storage(format!("Failed to save media record: {}", e)));
    }

    log::info!(
        "stored {} as {} ({}) for user {}",
        upload.original_filename,
        new_media.filename,
        new_media.file_type,
        owner_id
    );
    find_owned(conn, &new_media.id, owner_id)
}

// --------------------- Read ---------------------
pub fn get_media(conn: &mut SqliteConnection, media_id: &str, user_id: &str) -> AppResult<Media> {
    find_owned(conn, media_id, user_id)
}

/// Resolves an owned item to the path of its backing file.
pub fn open_media(
    conn: &mut SqliteConnection,
    store: &FileStore,
    media_id: &str,
    user_id: &str,
) -> AppResult<(Media, PathBuf)> {
    let item = find_owned(conn, media_id, user_id)?;
    let path = store.path_for(&item.filename);
    Ok((item, path))
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// OR of substring matches over the comma separated tag list.
fn any_tag_matches(raw: &str) -> Option<MediaPredicate> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(|tag| -> MediaPredicate {
            Box::new(media::tags.assume_not_null().like(contains_pattern(tag)).escape(LIKE_ESCAPE))
        })
        .reduce(|acc, next| -> MediaPredicate { Box::new(acc.or(next)) })
}

pub fn list_media(
    conn: &mut SqliteConnection,
    owner_id: &str,
    filter: &MediaFilter,
    pagination: &Pagination,
) -> AppResult<Vec<Media>> {
    let (limit, offset) = validate_pagination(pagination, DEFAULT_PAGE_SIZE)?;

    let mut query = media::table
        .filter(media::user_id.eq(owner_id.to_string()))
        .into_boxed();

    if let Some(title) = non_blank(&filter.title) {
        query = query.filter(media::title.like(contains_pattern(title)).escape(LIKE_ESCAPE));
    }
    if let Some(predicate) = non_blank(&filter.tags).and_then(any_tag_matches) {
        query = query.filter(predicate);
    }
    if let Some(file_type) = non_blank(&filter.file_type) {
        query = query.filter(media::file_type.eq(file_type.to_string()));
    }
    if let Some(category) = non_blank(&filter.category) {
        query = query.filter(media::category.eq(category.to_string()));
    }
    if let Some(subcategory) = non_blank(&filter.subcategory) {
        query = query.filter(media::subcategory.eq(subcategory.to_string()));
    }

    Ok(query
        .order((media::upload_date.desc(), media::id.asc()))
        .limit(limit)
        .offset(offset)
        .select(Media::as_select())
        .load(conn)?)
}

pub fn search_by_title(conn: &mut SqliteConnection, owner_id: &str, q: &str) -> AppResult<Vec<MediaSummary>> {
    let q = q.trim();
    if q.is_empty() {
        return Ok(Vec::new());
    }
    Ok(media::table
        .filter(media::user_id.eq(owner_id))
        .filter(media::title.like(contains_pattern(q)).escape(LIKE_ESCAPE))
        .order(media::title.asc())
        .limit(TITLE_SEARCH_LIMIT)
        .select(MediaSummary::as_select())
        .load(conn)?)
}

// --------------------- Update ---------------------
pub fn update_media(
    conn: &mut SqliteConnection,
    media_id: &str,
    user_id: &str,
    req: MediaUpdateRequest,
) -> AppResult<Media> {
    let existing = find_owned(conn, media_id, user_id)?;

    let title = match req.title {
        Some(t) if t.trim().is_empty() => return Err(AppError::Validation("Title is required.".into())),
        Some(t) => Some(t.trim().to_string()),
        None => None,
    };
    let category = match req.category {
        Some(c) => Some(validate_category(Some(c))?),
        None => None,
    };
    let subcategory = match req.subcategory {
        Some(s) => Some(validate_subcategory(Some(s))?),
        None => None,
    };

    let changes = UpdateMedia {
        title,
        description: req.description.map(|d| normalize_text(Some(d))),
        tags: req.tags.map(|t| normalize_text(Some(t))),
        category,
        subcategory,
    };

    if !changes.is_empty() {
        diesel::update(media::table.filter(media::id.eq(&existing.id)))
            .set(&changes)
            .execute(conn)?;
    }
    find_owned(conn, media_id, user_id)
}

// --------------------- Delete ---------------------
/// Row delete and file removal commit together: a failed removal rolls the
/// row back. A file that is already gone is tolerated.
pub fn delete_media(conn: &mut SqliteConnection, store: &FileStore, media_id: &str, user_id: &str) -> AppResult<()> {
    conn.immediate_transaction(|conn| {
        let item = find_owned(conn, media_id, user_id)?;
        diesel::delete(media::table.filter(media::id.eq(&item.id))).execute(conn)?;
        if !store.remove(&item.filename)? {
            log::warn!("file {} for media {} was already missing", item.filename, item.id);
        }
        log::info!("deleted media {} ({}) for user {}", item.id, item.filename, user_id);
        Ok(())
    })
}

// --------------------- Bulk import ---------------------
pub fn bulk_import(
    conn: &mut SqliteConnection,
    store: &FileStore,
    owner_id: &str,
    req: &BulkImportRequest,
) -> AppResult<BulkImportReport> {
    let folder = req.folder_path.trim();
    if folder.is_empty() {
        return Err(AppError::Validation("Folder path is required.".into()));
    }
    let folder = Path::new(folder);
    if !folder.is_dir() {
        return Err(AppError::Validation(format!("Invalid folder path: {}", folder.display())));
    }
    let canonical = folder.canonicalize()?;
    if canonical.starts_with(store.root().canonicalize()?) {
        return Err(AppError::Validation("Cannot import from the media directory itself.".into()));
    }

    let mut report = BulkImportReport::default();
    for entry in WalkDir::new(&canonical).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            report.skipped += 1;
            continue;
        };
        if !is_allowed(name) {
            report.skipped += 1;
            continue;
        }

        let title = normalize_text(req.default_title.clone()).unwrap_or_else(|| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| name.to_string())
        });
        let input = NewMediaInput {
            title,
            description: req.default_description.clone(),
            tags: req.default_tags.clone(),
            ..Default::default()
        };

        let imported = store.stage_copy(path).and_then(|file| {
            let upload = StagedUpload {
                original_filename: name.to_string(),
                file,
            };
            create_media(conn, store, owner_id, input, upload)
        });
        match imported {
            Ok(_) => report.imported += 1,
            Err(e) => {
                log::error!("bulk import of {} failed: {}", path.display(), e);
                report.failed += 1;
            }
        }
    }

    log::info!(
        "bulk import from {} for user {}: {} imported, {} skipped, {} failed",
        canonical.display(),
        owner_id,
        report.imported,
        report.skipped,
        report.failed
    );
    Ok(report)
}

// --------------------- Reconciliation ---------------------
/// Recovery sweep for the two-step create/delete paths. Unreferenced files
/// with generated names are moved to quarantine; anything else in the
/// directory is left alone. Rows whose file is gone are reported.
pub fn reconcile(conn: &mut SqliteConnection, store: &FileStore) -> AppResult<ReconcileReport> {
    let known: HashSet<String> = media::table
        .select(media::filename)
        .load::<String>(conn)?
        .into_iter()
        .collect();
    let stored = store.stored_filenames()?;

    let mut report = ReconcileReport::default();
    for name in stored.difference(&known) {
        if !is_generated_filename(name) {
            log::debug!("leaving unmanaged file {} in place", name);
            continue;
        }
        let moved = store.quarantine(name)?;
        log::warn!("quarantined orphan file {} to {}", name, moved.display());
        report.orphan_files_quarantined.push(name.clone());
    }
    report.rows_missing_files = known.difference(&stored).cloned().collect();
    report.orphan_files_quarantined.sort();
    report.rows_missing_files.sort();

    for name in &report.rows_missing_files {
        log::warn!("media row references missing file {}", name);
    }
    Ok(report)
}
