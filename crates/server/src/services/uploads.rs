use banchi_core::UploadType;
use banchi_storage::{self as storage, DbPool, NewUpload, UploadRecord};
use chrono::Utc;
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUpload {
    pub upload_type: UploadType,
    pub original_filename: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub file_size_bytes: Option<i64>,
}

#[derive(Clone)]
pub struct UploadsService {
    pool: DbPool,
}

impl UploadsService {
    pub fn new(pool: DbPool) -> Self {
        UploadsService { pool }
    }

    /// Register an upload from its metadata. The stored filename is derived
    /// here; file-byte storage is handled outside this service.
    pub async fn create(&self, input: RegisterUpload) -> Result<UploadRecord, ApiError> {
        if input.original_filename.trim().is_empty() {
            return Err(ApiError::invalid("NO_FILE", "No file uploaded"));
        }

        let stored_filename = derive_stored_filename(&input.original_filename);
        let id = storage::insert_upload(
            &self.pool,
            &NewUpload {
                upload_type: input.upload_type,
                original_filename: input.original_filename,
                stored_filename,
                mime_type: input
                    .mime_type
                    .unwrap_or_else(|| "application/octet-stream".to_string()),
                file_size_bytes: input.file_size_bytes.unwrap_or(0),
            },
        )
        .await?;

        self.get(id).await
    }

    pub async fn get(&self, id: i64) -> Result<UploadRecord, ApiError> {
        storage::get_upload(&self.pool, id)
            .await?
            .ok_or_else(|| ApiError::not_found("UPLOAD_NOT_FOUND", "Upload not found"))
    }

    pub async fn list(
        &self,
        upload_type: Option<UploadType>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UploadRecord>, ApiError> {
        Ok(storage::list_uploads(&self.pool, upload_type, limit, offset).await?)
    }
}

/// Timestamp prefix plus a sanitized copy of the client filename.
fn derive_stored_filename(original: &str) -> String {
    let sanitized: String = original
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect();
    format!("{}-{}", Utc::now().format("%Y%m%d%H%M%S%f"), sanitized)
}
