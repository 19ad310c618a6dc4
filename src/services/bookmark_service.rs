use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::bookmark_models::{Bookmark, CreateBookmarkRequest, NewBookmark, UpdateBookmark, UpdateBookmarkRequest};
use crate::models::pagination_models::Pagination;
use crate::schema::bookmarks;
use crate::utils::media_type_utils::normalize_text;
use crate::utils::pagination_utils::validate_pagination;
use crate::utils::search_utils::{contains_pattern, LIKE_ESCAPE};

const DEFAULT_PAGE_SIZE: i64 = 10;

fn find_owned(conn: &mut SqliteConnection, bookmark_id: &str, user_id: &str) -> AppResult<Bookmark> {
    bookmarks::table
        .filter(bookmarks::id.eq(bookmark_id))
        .filter(bookmarks::user_id.eq(user_id))
        .select(Bookmark::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("Bookmark {} not found", bookmark_id)))
}

fn required_title(title: &str) -> AppResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Title is required.".into()));
    }
    Ok(title.to_string())
}

/// Accepts `http://` and `https://` URLs with a non-empty host.
fn validate_url(url: &str) -> AppResult<String> {
    let url = url.trim();
    let invalid = || AppError::Validation(format!("Invalid URL: {}", url));
    if url.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or_else(invalid)?;
    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if host.is_empty() {
        return Err(invalid());
    }
    Ok(url.to_string())
}

pub fn create_bookmark(conn: &mut SqliteConnection, owner_id: &str, req: CreateBookmarkRequest) -> AppResult<Bookmark> {
    let new_bookmark = NewBookmark {
        id: Uuid::new_v4().to_string(),
        title: required_title(&req.title)?,
        url: validate_url(&req.url)?,
        description: normalize_text(req.description),
        tags: normalize_text(req.tags),
        created_at: Utc::now().naive_utc(),
        user_id: owner_id.to_string(),
    };

    diesel::insert_into(bookmarks::table)
        .values(&new_bookmark)
        .execute(conn)?;
    find_owned(conn, &new_bookmark.id, owner_id)
}

/// Newest first; `q` matches title, description or tags.
pub fn list_bookmarks(
    conn: &mut SqliteConnection,
    owner_id: &str,
    q: Option<&str>,
    pagination: &Pagination,
) -> AppResult<Vec<Bookmark>> {
    let (limit, offset) = validate_pagination(pagination, DEFAULT_PAGE_SIZE)?;

    let mut query = bookmarks::table
        .filter(bookmarks::user_id.eq(owner_id.to_string()))
        .into_boxed();

    if let Some(q) = q.map(str::trim).filter(|q| !q.is_empty()) {
        let pattern = contains_pattern(q);
        query = query.filter(
            bookmarks::title
                .like(pattern.clone())
                .escape(LIKE_ESCAPE)
                .or(bookmarks::description
                    .assume_not_null()
                    .like(pattern.clone())
                    .escape(LIKE_ESCAPE))
                .or(bookmarks::tags.assume_not_null().like(pattern).escape(LIKE_ESCAPE)),
        );
    }

    Ok(query
        .order((bookmarks::created_at.desc(), bookmarks::id.asc()))
        .limit(limit)
        .offset(offset)
        .select(Bookmark::as_select())
        .load(conn)?)
}

pub fn get_bookmark(conn: &mut SqliteConnection, bookmark_id: &str, user_id: &str) -> AppResult<Bookmark> {
    find_owned(conn, bookmark_id, user_id)
}

pub fn update_bookmark(
    conn: &mut SqliteConnection,
    bookmark_id: &str,
    user_id: &str,
    req: UpdateBookmarkRequest,
) -> AppResult<Bookmark> {
    let existing = find_owned(conn, bookmark_id, user_id)?;

    let changes = UpdateBookmark {
        title: req.title.as_deref().map(required_title).transpose()?,
        url: req.url.as_deref().map(validate_url).transpose()?,
        description: req.description.map(|d| normalize_text(Some(d))),
        tags: req.tags.map(|t| normalize_text(Some(t))),
    };

    if !changes.is_empty() {
        diesel::update(bookmarks::table.filter(bookmarks::id.eq(&existing.id)))
            .set(&changes)
            .execute(conn)?;
    }
    find_owned(conn, bookmark_id, user_id)
}

pub fn delete_bookmark(conn: &mut SqliteConnection, bookmark_id: &str, user_id: &str) -> AppResult<()> {
    let deleted = diesel::delete(
        bookmarks::table
            .filter(bookmarks::id.eq(bookmark_id))
            .filter(bookmarks::user_id.eq(user_id)),
    )
    .execute(conn)?;

    if deleted == 0 {
        return Err(AppError::NotFound(format!("Bookmark {} not found", bookmark_id)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{connection, user};

    fn request(title: &str, url: &str, tags: Option<&str>) -> CreateBookmarkRequest {
        CreateBookmarkRequest {
            title: title.into(),
            url: url.into(),
            description: None,
            tags: tags.map(str::to_string),
        }
    }

    #[test]
    fn urls_need_http_scheme_and_host() {
        assert!(validate_url("https://example.com/path?x=1").is_ok());
        assert!(validate_url("http://localhost:8080").is_ok());
        assert!(validate_url("ftp://example.com").is_err());
        assert!(validate_url("https://").is_err());
        assert!(validate_url("https:///path").is_err());
        assert!(validate_url("https://exa mple.com").is_err());
        assert!(validate_url("example.com").is_err());
    }

    #[test]
    fn search_treats_wildcards_literally() {
        let mut conn = connection();
        let owner = user(&mut conn, "u1");
        create_bookmark(&mut conn, &owner, request("Sale 50% off", "https://shop.example.com", None)).unwrap();
        create_bookmark(&mut conn, &owner, request("snake_case guide", "https://style.example.com", None)).unwrap();
        create_bookmark(&mut conn, &owner, request("Plain", "https://plain.example.com", None)).unwrap();

        let hits = list_bookmarks(&mut conn, &owner, Some("%"), &Pagination::default()).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Sale 50% off");

        let hits = list_bookmarks(&mut conn, &owner, Some("_"), &Pagination::default()).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "snake_case guide");
    }

    #[test]
    fn create_search_and_paginate() {
        let mut conn = connection();
        let owner = user(&mut conn, "u1");
        create_bookmark(&mut conn, &owner, request("Rust book", "https://doc.rust-lang.org/book", Some("learning"))).unwrap();
        create_bookmark(&mut conn, &owner, request("News", "https://news.example.com", None)).unwrap();

        let hits = list_bookmarks(&mut conn, &owner, Some("learn"), &Pagination::default()).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Rust book");

        let all = list_bookmarks(&mut conn, &owner, None, &Pagination::default()).unwrap();
        assert_eq!(all.len(), 2);
        let page = list_bookmarks(&mut conn, &owner, None, &Pagination::new(Some(1), Some(1))).unwrap();
        assert_eq!(page.len(), 1);

        assert!(matches!(
            create_bookmark(&mut conn, &owner, request(" ", "https://a.b", None)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn update_and_delete_are_owner_scoped() {
        let mut conn = connection();
        let owner = user(&mut conn, "u1");
        let other = user(&mut conn, "u2");
        let mark = create_bookmark(&mut conn, &owner, request("Docs", "https://docs.rs", Some("rust"))).unwrap();

        assert!(matches!(
            update_bookmark(&mut conn, &mark.id, &other, UpdateBookmarkRequest::default()),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(delete_bookmark(&mut conn, &mark.id, &other), Err(AppError::NotFound(_))));

        let updated = update_bookmark(
            &mut conn,
            &mark.id,
            &owner,
            UpdateBookmarkRequest {
                tags: Some(String::new()),
                url: Some("https://crates.io".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(updated.tags, None);
        assert_eq!(updated.url, "https://crates.io");
        assert_eq!(updated.title, "Docs");

        delete_bookmark(&mut conn, &mark.id, &owner).unwrap();
        assert!(matches!(get_bookmark(&mut conn, &mark.id, &owner), Err(AppError::NotFound(_))));
    }
}
