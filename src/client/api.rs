use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{StreamExt, TryStreamExt};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, StatusCode, Url};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::io::ReaderStream;

use super::{PendingFile, TransferProgress};
use crate::error::ClientError;
use crate::model::{ListingResponse, UPLOAD_FIELD};
use crate::view;

const USER_AGENT: &str = concat!("filedeck/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// `/api/*` 的 HTTP 客户端
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base: &str) -> Result<Self, ClientError> {
        let mut base = Url::parse(base).map_err(|e| ClientError::InvalidUrl {
            url: base.to_string(),
            reason: e.to_string(),
        })?;
        // 保证相对路径拼接在前缀之后
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        // 上传不设总超时，只限制建立连接的时间
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self { http, base })
    }

    #[cfg(test)]
    pub fn base(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, name: &str) -> Result<Url, ClientError> {
        self.base.join(name).map_err(|e| ClientError::InvalidUrl {
            url: format!("{}{}", self.base, name),
            reason: e.to_string(),
        })
    }

    pub fn download_url(&self, path: &str) -> Result<Url, ClientError> {
        // 与浏览页的下载链接使用同一种编码
        let mut url = self.endpoint("api/download")?;
        url.set_query(Some(&format!("path={}", view::encode_path(path))));
        Ok(url)
    }

    /// 获取目录列表。不看状态码，以响应体里的 `error` 为准
    pub async fn list(&self, path: &str) -> Result<ListingResponse, ClientError> {
        let url = self.endpoint("api/files")?;
        let listing = self
            .http
            .get(url)
            .query(&[("path", path)])
            .send()
            .await?
            .json::<ListingResponse>()
            .await?;
        Ok(listing)
    }

    /// 把所有文件放进一个 multipart 请求上传，读盘时通过 `progress` 报告已发送字节数。
    ///
    /// 返回服务器的状态码；只有传输层失败才返回 `Err`。
    pub async fn upload(
        &self,
        files: &[PendingFile],
        progress: UnboundedSender<TransferProgress>,
    ) -> Result<StatusCode, ClientError> {
        let url = self.endpoint("api/upload")?;
        let total: u64 = files.iter().map(|f| f.size).sum();
        let loaded = Arc::new(AtomicU64::new(0));

        let mut form = Form::new();
        for file in files {
            let handle = tokio::fs::File::open(&file.source).await?;
            let loaded = loaded.clone();
            let progress = progress.clone();
            let stream = ReaderStream::new(handle).inspect_ok(move |chunk| {
                let len = chunk.len() as u64;
                let now = loaded.fetch_add(len, Ordering::Relaxed) + len;
                // 接收端已经结束时忽略
                let _ = progress.send(TransferProgress { loaded: now, total });
            });
            let mime = mime_guess::from_path(&file.name).first_or_octet_stream();
            let part = Part::stream_with_length(Body::wrap_stream(stream), file.size)
                .file_name(file.name.clone())
                .mime_str(mime.as_ref())?;
            form = form.part(UPLOAD_FIELD, part);
        }
        drop(progress);

        tracing::info!(files = files.len(), total, %url, "uploading");
        let response = self.http.post(url).multipart(form).send().await?;
        Ok(response.status())
    }

    /// 把服务器上的文件流式保存到 `dest`，返回写入的字节数
    pub async fn download(&self, path: &str, dest: &Path) -> Result<u64, ClientError> {
        let response = self.http.get(self.download_url(path)?).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_respect_base_prefix() {
        let client = ApiClient::new("http://127.0.0.1:8000/files").unwrap();
        assert_eq!(client.base().as_str(), "http://127.0.0.1:8000/files/");
        assert_eq!(
            client.download_url("a b/c.txt").unwrap().as_str(),
            "http://127.0.0.1:8000/files/api/download?path=a%20b%2Fc.txt"
        );
        let url = client.download_url("a b/c&d.txt").unwrap();
        assert_eq!(url.path(), "/files/api/download");
        assert_eq!(
            url.query(),
            view::download_href("a b/c&d.txt").split_once('?').map(|(_, q)| q)
        );
    }

    #[test]
    fn rejects_invalid_base() {
        assert!(matches!(
            ApiClient::new("not a url"),
            Err(ClientError::InvalidUrl { .. })
        ));
    }
}
