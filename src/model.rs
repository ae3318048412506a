//! `/api/*` 的 JSON 结构，服务端和客户端共用。

use serde::{Deserialize, Serialize};

/// 上传时所有文件共用的 multipart 字段名
pub const UPLOAD_FIELD: &str = "file";

/// 目录中的一项。`path` 相对于服务根目录，是导航和下载的键。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub path: String,
    pub is_dir: bool,
    #[serde(default)]
    pub size: u64,
}

/// `GET /api/files` 的响应。出错时只带 `error`。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingResponse {
    #[serde(default)]
    pub current_path: String,
    #[serde(default)]
    pub files: Vec<DirectoryEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ListingResponse {
    pub fn new(current_path: impl Into<String>, files: Vec<DirectoryEntry>) -> Self {
        Self {
            current_path: current_path.into(),
            files,
            error: None,
        }
    }
}

/// `POST /api/upload` 成功时的响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub success: bool,
    pub filenames: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
