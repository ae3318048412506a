use std::path::{Component, Path, PathBuf};

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use super::AppContext;
use crate::error::ApiError;
use crate::model::{DirectoryEntry, ListingResponse};

#[derive(Debug, Default, Deserialize)]
pub struct PathQuery {
    #[serde(default)]
    pub path: String,
}

impl PathQuery {
    /// `root` 是根目录的别名
    pub fn relative(self) -> String {
        if self.path == "root" {
            String::new()
        } else {
            self.path
        }
    }
}

/// 逐段检查相对路径，不允许绝对路径或跳出根目录的 `..`
fn normalize(rel: &str) -> Result<PathBuf, ApiError> {
    let mut parts: Vec<&std::ffi::OsStr> = Vec::new();
    for component in Path::new(rel).components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.pop().is_none() {
                    return Err(ApiError::AccessDenied);
                }
            }
            Component::RootDir | Component::Prefix(_) => return Err(ApiError::AccessDenied),
        }
    }
    Ok(parts.iter().collect())
}

/// 把请求路径解析到根目录下的真实路径。
///
/// 不存在 → `NotFound`；规范化后（含符号链接）不在根目录内 → `AccessDenied`。
pub(crate) async fn resolve(root: &Path, rel: &str) -> Result<PathBuf, ApiError> {
    let relative = normalize(rel)?;
    let canonical = tokio::fs::canonicalize(root.join(relative))
        .await
        .map_err(|_| ApiError::NotFound)?;

    if !canonical.starts_with(root) {
        tracing::warn!(path = rel, "path escapes served root");
        return Err(ApiError::AccessDenied);
    }
    Ok(canonical)
}

/// 列表项的相对路径：根目录下就是文件名本身
fn join_relative(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else if base.ends_with('/') {
        format!("{}{}", base, name)
    } else {
        format!("{}/{}", base, name)
    }
}

async fn read_entries(dir: &Path, rel: &str) -> std::io::Result<Vec<DirectoryEntry>> {
    let mut dir_entries = tokio::fs::read_dir(dir).await?;
    let mut entries = Vec::new();

    while let Some(entry) = dir_entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        // 跟随符号链接；元数据读不到时当作大小为 0 的文件
        let (is_dir, size) = match tokio::fs::metadata(entry.path()).await {
            Ok(metadata) => (metadata.is_dir(), metadata.len()),
            Err(e) => {
                tracing::debug!(name = %name, error = %e, "metadata unavailable");
                (false, 0)
            }
        };
        entries.push(DirectoryEntry {
            path: join_relative(rel, &name),
            name,
            is_dir,
            size,
        });
    }
    Ok(entries)
}

/// 生成目录列表；目标是文件时列表为空
pub(crate) async fn listing_for(root: &Path, rel: String) -> Result<ListingResponse, ApiError> {
    let target = resolve(root, &rel).await?;
    let files = if tokio::fs::metadata(&target).await?.is_dir() {
        read_entries(&target, &rel).await?
    } else {
        Vec::new()
    };
    Ok(ListingResponse::new(rel, files))
}

/// `GET /api/files?path=`
pub async fn list_files(
    State(context): State<AppContext>,
    Query(query): Query<PathQuery>,
) -> Result<Json<ListingResponse>, ApiError> {
    let listing = listing_for(context.root(), query.relative()).await?;
    Ok(Json(listing))
}
