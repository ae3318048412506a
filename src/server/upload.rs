use std::path::Path;

use axum::extract::multipart::Field;
use axum::extract::{Multipart, State};
use axum::Json;
use tokio::io::AsyncWriteExt;

use super::AppContext;
use crate::error::ApiError;
use crate::model::{UploadReceipt, UPLOAD_FIELD};

/// `POST /api/upload`：所有 `file` 字段保存到根目录
pub async fn upload_files(
    State(context): State<AppContext>,
    mut multipart: Multipart,
) -> Result<Json<UploadReceipt>, ApiError> {
    let mut saved = Vec::new();
    let mut seen_file_part = false;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let original = field.file_name().unwrap_or_default().to_string();
        if original.is_empty() {
            if !seen_file_part {
                return Err(ApiError::NoSelectedFile);
            }
            continue;
        }
        seen_file_part = true;

        // 安全文件名处理
        let filename = sanitize_filename::sanitize(&original);
        if filename.is_empty() {
            tracing::warn!(original = %original, "filename empty after sanitizing, skipped");
            continue;
        }

        let file_path = context.root().join(&filename);
        let written = save_field(field, &file_path).await?;
        tracing::info!(file = %filename, bytes = written, "saved upload");
        saved.push(filename);
    }

    if !seen_file_part {
        return Err(ApiError::NoFilePart);
    }
    Ok(Json(UploadReceipt {
        success: true,
        filenames: saved,
    }))
}

/// 逐块写盘；中途出错时删掉写了一半的文件
async fn save_field(mut field: Field<'_>, file_path: &Path) -> Result<u64, ApiError> {
    let mut file = tokio::fs::File::create(file_path).await?;
    let result: Result<u64, ApiError> = async {
        let mut written = 0u64;
        while let Some(chunk) = field.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        Ok(written)
    }
    .await;

    if result.is_err() {
        drop(file);
        let _ = tokio::fs::remove_file(file_path).await;
    }
    result
}
