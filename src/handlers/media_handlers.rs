use std::io::{SeekFrom, Write};

use actix_multipart::{Field, Multipart};
use actix_web::http::header::{self, ContentDisposition, DispositionParam, DispositionType};
use actix_web::web::{Bytes, BytesMut, ReqData};
use actix_web::{web, HttpRequest, HttpResponse};
use futures::TryStreamExt;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::config::AppConfig;
use crate::db::{get_conn, DbPool};
use crate::errors::AppError;
use crate::file_store::FileStore;
use crate::models::media_models::{BulkImportRequest, MediaListQuery, MediaUpdateRequest, NewMediaInput, TitleSearchQuery};
use crate::models::token_models::Claims;
use crate::services::media_service::{self, StagedUpload};
use crate::utils::file_utils::{content_type_for, parse_byte_range, RangeRequest, CHUNK_SIZE};
use crate::utils::media_type_utils::ensure_supported;

const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;

pub async fn list_media(
    pool: web::Data<DbPool>,
    claims: ReqData<Claims>,
    query: web::Query<MediaListQuery>,
) -> Result<HttpResponse, AppError> {
    let (filter, pagination) = query.into_inner().into_parts();
    let user_id = claims.into_inner().sub;

    let items = web::block(move || {
        let mut conn = get_conn(&pool)?;
        media_service::list_media(&mut conn, &user_id, &filter, &pagination)
    })
    .await??;

    Ok(HttpResponse::Ok().json(items))
}

async fn read_text_field(field: &mut Field) -> Result<String, AppError> {
    let mut bytes = BytesMut::new();
    while let Some(chunk) = field.try_next().await? {
        if bytes.len() + chunk.len() > MAX_TEXT_FIELD_BYTES {
            return Err(AppError::Validation("Form field is too large.".into()));
        }
        bytes.extend_from_slice(&chunk);
    }
    String::from_utf8(bytes.to_vec()).map_err(|_| AppError::Validation("Form fields must be UTF-8.".into()))
}

/// Accepts `file` plus optional `title`, `description`, `tags`,
/// `file_type`, `category` and `subcategory` form fields.
pub async fn upload_media(
    pool: web::Data<DbPool>,
    store: web::Data<FileStore>,
    config: web::Data<AppConfig>,
    claims: ReqData<Claims>,
    mut payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let mut input = NewMediaInput::default();
    let mut upload: Option<StagedUpload> = None;

    while let Some(mut field) = payload.try_next().await? {
        let name = field.name().unwrap_or_default().to_string();

        if name == "file" {
            let original_filename = field
                .content_disposition()
                .and_then(|cd| cd.get_filename())
                .map(str::to_string)
                .filter(|f| !f.trim().is_empty())
                .ok_or_else(|| AppError::Validation("No selected file".into()))?;
            // Reject before any bytes hit the disk.
            ensure_supported(&original_filename)?;

            let mut staged = store.staging_file()?;
            let mut written: u64 = 0;
            while let Some(chunk) = field.try_next().await? {
                written += chunk.len() as u64;
                if written > config.max_upload_bytes {
                    return Err(AppError::PayloadTooLarge(config.max_upload_bytes));
                }
                staged.write_all(&chunk)?;
            }
            staged.flush()?;

            upload = Some(StagedUpload {
                original_filename,
                file: staged,
            });
            continue;
        }

        let value = read_text_field(&mut field).await?;
        match name.as_str() {
            "title" => input.title = value,
            "description" => input.description = Some(value),
            "tags" => input.tags = Some(value),
            "file_type" => input.file_type = Some(value),
            "category" => input.category = Some(value),
            "subcategory" => input.subcategory = Some(value),
            other => log::debug!("ignoring multipart field {}", other),
        }
    }

    let upload = upload.ok_or_else(|| AppError::Validation("No file part".into()))?;
    let user_id = claims.into_inner().sub;

    let item = web::block(move || {
        let mut conn = get_conn(&pool)?;
        media_service::create_media(&mut conn, store.get_ref(), &user_id, input, upload)
    })
    .await??;

    Ok(HttpResponse::Created().json(item))
}

pub async fn get_media(
    pool: web::Data<DbPool>,
    claims: ReqData<Claims>,
    media_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let media_id = media_id.into_inner();
    let user_id = claims.into_inner().sub;

    let item = web::block(move || {
        let mut conn = get_conn(&pool)?;
        media_service::get_media(&mut conn, &media_id, &user_id)
    })
    .await??;

    Ok(HttpResponse::Ok().json(item))
}

pub async fn update_media(
    pool: web::Data<DbPool>,
    claims: ReqData<Claims>,
    media_id: web::Path<String>,
    payload: web::Json<MediaUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    let media_id = media_id.into_inner();
    let user_id = claims.into_inner().sub;
    let changes = payload.into_inner();

    let item = web::block(move || {
        let mut conn = get_conn(&pool)?;
        media_service::update_media(&mut conn, &media_id, &user_id, changes)
    })
    .await??;

    Ok(HttpResponse::Ok().json(item))
}

pub async fn delete_media(
    pool: web::Data<DbPool>,
    store: web::Data<FileStore>,
    claims: ReqData<Claims>,
    media_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let media_id = media_id.into_inner();
    let user_id = claims.into_inner().sub;

    web::block(move || {
        let mut conn = get_conn(&pool)?;
        media_service::delete_media(&mut conn, store.get_ref(), &media_id, &user_id)
    })
    .await??;

    Ok(HttpResponse::NoContent().finish())
}

/// Streams the stored file, honoring a single `Range: bytes=` request.
pub async fn download_media(
    req: HttpRequest,
    pool: web::Data<DbPool>,
    store: web::Data<FileStore>,
    claims: ReqData<Claims>,
    media_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let media_id = media_id.into_inner();
    let user_id = claims.into_inner().sub;

    let (item, path) = web::block(move || {
        let mut conn = get_conn(&pool)?;
        media_service::open_media(&mut conn, store.get_ref(), &media_id, &user_id)
    })
    .await??;

    let mut file = match tokio::fs::File::open(&path).await {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::warn!("media {} has no file at {}", item.id, path.display());
            return Err(AppError::NotFound(format!("File for media item {} not found", item.id)));
        }
        Err(e) => return Err(e.into()),
    };
    let total = file.metadata().await?.len();

    let range = match req.headers().get(header::RANGE).and_then(|v| v.to_str().ok()) {
        Some(value) => match parse_byte_range(value, total) {
            RangeRequest::Partial(r) => Some(r),
            RangeRequest::Full => None,
            RangeRequest::Unsatisfiable => {
                return Ok(HttpResponse::RangeNotSatisfiable()
                    .insert_header((header::CONTENT_RANGE, format!("bytes */{}", total)))
                    .insert_header((header::ACCEPT_RANGES, "bytes"))
                    .finish());
            }
        },
        None => None,
    };

    let (start, len) = match range {
        Some(r) => (r.start, r.len()),
        None => (0, total),
    };
    if start > 0 {
        file.seek(SeekFrom::Start(start)).await?;
    }

    let stream = async_stream::stream! {
        let mut reader = file.take(len);
        let mut buf = vec![0u8; CHUNK_SIZE];
        loop {
            match reader.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => yield Ok::<_, std::io::Error>(Bytes::copy_from_slice(&buf[..n])),
                Err(e) => {
                    yield Err(e);
                    break;
                }
            }
        }
    };

    let mut response = match range {
        Some(r) => {
            let mut partial = HttpResponse::PartialContent();
            partial.insert_header((header::CONTENT_RANGE, format!("bytes {}-{}/{}", r.start, r.end, total)));
            partial
        }
        None => HttpResponse::Ok(),
    };

    Ok(response
        .insert_header((header::ACCEPT_RANGES, "bytes"))
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(item.filename.clone())],
        })
        .content_type(content_type_for(&item.filename))
        .no_chunking(len)
        .streaming(stream))
}

pub async fn search_by_title(
    pool: web::Data<DbPool>,
    claims: ReqData<Claims>,
    query: web::Query<TitleSearchQuery>,
) -> Result<HttpResponse, AppError> {
    let q = query.into_inner().q.unwrap_or_default();
    let user_id = claims.into_inner().sub;

    let hits = web::block(move || {
        let mut conn = get_conn(&pool)?;
        media_service::search_by_title(&mut conn, &user_id, &q)
    })
    .await??;

    Ok(HttpResponse::Ok().json(hits))
}

pub async fn bulk_import(
    pool: web::Data<DbPool>,
    store: web::Data<FileStore>,
    claims: ReqData<Claims>,
    payload: web::Json<BulkImportRequest>,
) -> Result<HttpResponse, AppError> {
    let request = payload.into_inner();
    let user_id = claims.into_inner().sub;

    let report = web::block(move || {
        let mut conn = get_conn(&pool)?;
        media_service::bulk_import(&mut conn, store.get_ref(), &user_id, &request)
    })
    .await??;

    Ok(HttpResponse::Ok().json(report))
}
