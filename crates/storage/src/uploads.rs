use banchi_core::{UploadStatus, UploadType};
use serde::Serialize;
use std::str::FromStr;

use crate::db::DbPool;

#[derive(Debug, Clone, Serialize)]
pub struct UploadRecord {
    pub id: i64,
    pub upload_type: UploadType,
    pub original_filename: String,
    pub stored_filename: String,
    pub mime_type: String,
    pub file_size_bytes: i64,
    pub upload_time: String,
    pub status: UploadStatus,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewUpload {
    pub upload_type: UploadType,
    pub original_filename: String,
    pub stored_filename: String,
    pub mime_type: String,
    pub file_size_bytes: i64,
}

type UploadTuple = (
    i64,
    String,
    String,
    String,
    String,
    i64,
    String,
    String,
    Option<String>,
);

fn from_tuple(r: UploadTuple) -> UploadRecord {
    UploadRecord {
        id: r.0,
        upload_type: UploadType::from_str(&r.1).unwrap_or(UploadType::Other),
        original_filename: r.2,
        stored_filename: r.3,
        mime_type: r.4,
        file_size_bytes: r.5,
        upload_time: r.6,
        status: UploadStatus::from_str(&r.7).unwrap_or(UploadStatus::Failed),
        error_message: r.8,
    }
}

const SELECT_COLUMNS: &str = "id, upload_type, original_filename, stored_filename, mime_type, \
                              file_size_bytes, upload_time, status, error_message";

pub async fn insert_upload(pool: &DbPool, new: &NewUpload) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO uploads (upload_type, original_filename, stored_filename, mime_type, \
         file_size_bytes, status) VALUES (?, ?, ?, ?, ?, 'uploaded')",
    )
    .bind(new.upload_type.to_string())
    .bind(&new.original_filename)
    .bind(&new.stored_filename)
    .bind(&new.mime_type)
    .bind(new.file_size_bytes)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn get_upload(pool: &DbPool, id: i64) -> Result<Option<UploadRecord>, sqlx::Error> {
    let row = sqlx::query_as::<_, UploadTuple>(&format!(
        "SELECT {SELECT_COLUMNS} FROM uploads WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(from_tuple))
}

/// Newest first. `limit` is clamped to [1, 200] and `offset` to >= 0 even
/// though both are bound parameters.
pub async fn list_uploads(
    pool: &DbPool,
    upload_type: Option<UploadType>,
    limit: i64,
    offset: i64,
) -> Result<Vec<UploadRecord>, sqlx::Error> {
    let limit = limit.clamp(1, 200);
    let offset = offset.max(0);

    let rows = match upload_type {
        Some(t) => {
            sqlx::query_as::<_, UploadTuple>(&format!(
                "SELECT {SELECT_COLUMNS} FROM uploads WHERE upload_type = ? \
                 ORDER BY upload_time DESC, id DESC LIMIT ? OFFSET ?"
            ))
            .bind(t.to_string())
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, UploadTuple>(&format!(
                "SELECT {SELECT_COLUMNS} FROM uploads \
                 ORDER BY upload_time DESC, id DESC LIMIT ? OFFSET ?"
            ))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows.into_iter().map(from_tuple).collect())
}

pub async fn set_upload_status(
    pool: &DbPool,
    id: i64,
    status: UploadStatus,
    error_message: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE uploads SET status = ?, error_message = ? WHERE id = ?")
        .bind(status.to_string())
        .bind(error_message)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// The single most recent receipt-type upload, if any.
pub async fn latest_receipt_upload(pool: &DbPool) -> Result<Option<i64>, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT id FROM uploads WHERE upload_type = 'receipt' \
         ORDER BY upload_time DESC, id DESC LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.0))
}
