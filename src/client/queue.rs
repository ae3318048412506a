use std::path::{Path, PathBuf};

use crate::error::ClientError;

/// 本地选中、等待上传的文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    /// 队列内唯一
    pub name: String,
    pub size: u64,
    /// 上传时从这里读取内容
    pub source: PathBuf,
}

impl PendingFile {
    pub fn new(name: impl Into<String>, size: u64, source: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            size,
            source: source.into(),
        }
    }

    /// 从本地文件构造：名称取文件名，大小取元数据长度
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(ClientError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            )));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("file"));
        Ok(Self::new(name, metadata.len(), path))
    }
}

/// 待上传队列：按选择顺序排列，同名文件只保留第一次加入的
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadQueue {
    files: Vec<PendingFile>,
}

impl UploadQueue {
    /// 追加队列中还没有的文件，返回实际加入的数量
    pub fn add(&mut self, files: impl IntoIterator<Item = PendingFile>) -> usize {
        let mut added = 0;
        for file in files {
            if self.contains(&file.name) {
                tracing::debug!(name = %file.name, "skipping duplicate");
                continue;
            }
            self.files.push(file);
            added += 1;
        }
        added
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.iter().any(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingFile> {
        self.files.iter()
    }

    pub fn files(&self) -> &[PendingFile] {
        &self.files
    }
}
