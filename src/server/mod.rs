//! HTTP 服务：`/api/files`、`/api/upload`、`/api/download` 和服务端渲染的浏览页。

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

mod download;
mod files;
mod index;
mod upload;

/// 所有处理函数共享的状态
#[derive(Debug, Clone)]
pub struct AppContext {
    root: Arc<PathBuf>,
}

impl AppContext {
    /// 根目录会被规范化为绝对路径
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let canonical = std::fs::canonicalize(root)?;
        if !canonical.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a directory", canonical.display()),
            ));
        }
        Ok(Self {
            root: Arc::new(canonical),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// `max_upload_bytes == 0` 表示不限制请求体大小
pub fn router(context: AppContext, max_upload_bytes: u64) -> Router {
    let body_limit = match usize::try_from(max_upload_bytes) {
        Ok(0) | Err(_) => DefaultBodyLimit::disable(),
        Ok(limit) => DefaultBodyLimit::max(limit),
    };

    Router::new()
        .route("/", get(index::browse))
        .route("/api/files", get(files::list_files))
        .route("/api/download", get(download::download_file))
        .route("/api/upload", post(upload::upload_files))
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .with_state(context)
}

pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    // 1. 规范化共享目录
    let context = AppContext::new(&config.root)
        .with_context(|| format!("cannot serve {}", config.root.display()))?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;

    // 2. 绑定端口
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot bind {}", addr))?;
    let local = listener.local_addr()?;
    tracing::info!(root = %context.root().display(), "serving files");
    tracing::info!("Server running on http://{}", local);
    if let Some(local_ip) = get_local_ip() {
        tracing::info!("Access files at: http://{}:{}", local_ip, local.port());
    }

    // 3. 启动服务，Ctrl-C 时优雅退出
    let app = router(context, config.max_upload_bytes);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

// 获取本地局域网 IP 地址
fn get_local_ip() -> Option<String> {
    use std::net::{IpAddr, Ipv4Addr};

    let socket = std::net::UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?; // 不会真正发包，只用来选出口网卡

    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(ipv4) if !ipv4.is_loopback() && ipv4 != Ipv4Addr::UNSPECIFIED => {
            Some(ipv4.to_string())
        }
        _ => None,
    }
}


#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::testing::{app, read_json};
    use super::*;

    #[test]
    fn context_requires_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        std::fs::write(&file, b"x").unwrap();

        assert!(AppContext::new(dir.path()).is_ok());
        assert!(AppContext::new(&file).is_err());
        assert!(AppContext::new(dir.path().join("missing")).is_err());
    }

    async fn get_json(root: &Path, uri: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::get(uri).body(Body::empty()).unwrap();
        let response = app(root).oneshot(request).await.unwrap();
        (response.status(), read_json(response).await)
    }

    #[tokio::test]
    async fn lists_root_and_nested_directories() {
        let root = tempfile::tempdir().unwrap();
        tokio::fs::create_dir_all(root.path().join("docs/old")).await.unwrap();
        tokio::fs::write(root.path().join("docs/a.txt"), b"abc").await.unwrap();

        let (status, body) = get_json(root.path(), "/api/files").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["current_path"], "");
        assert_eq!(
            body["files"],
            serde_json::json!([{ "name": "docs", "path": "docs", "is_dir": true, "size": body["files"][0]["size"] }])
        );

        let (status, body) = get_json(root.path(), "/api/files?path=docs").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["current_path"], "docs");
        let mut files: Vec<_> = body["files"].as_array().unwrap().clone();
        files.sort_by_key(|f| f["name"].as_str().unwrap().to_string());
        assert_eq!(files[0]["path"], "docs/a.txt");
        assert_eq!(files[0]["size"], 3);
        assert_eq!(files[0]["is_dir"], false);
        assert_eq!(files[1]["path"], "docs/old");
        assert_eq!(files[1]["is_dir"], true);
    }

    #[tokio::test]
    async fn root_alias_lists_root() {
        let root = tempfile::tempdir().unwrap();
        tokio::fs::write(root.path().join("x"), b"").await.unwrap();

        let (status, body) = get_json(root.path(), "/api/files?path=root").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["current_path"], "");
        assert_eq!(body["files"][0]["path"], "x");
    }

    #[tokio::test]
    async fn listing_a_file_returns_no_entries() {
        let root = tempfile::tempdir().unwrap();
        tokio::fs::write(root.path().join("x.txt"), b"x").await.unwrap();

        let (status, body) = get_json(root.path(), "/api/files?path=x.txt").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["files"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn listing_errors_are_json() {
        let root = tempfile::tempdir().unwrap();

        let (status, body) = get_json(root.path(), "/api/files?path=..").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, serde_json::json!({ "error": "Access denied" }));

        let (status, body) = get_json(root.path(), "/api/files?path=missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, serde_json::json!({ "error": "Path not found" }));
    }
}
