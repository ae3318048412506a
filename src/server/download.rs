use std::io::SeekFrom;
use std::path::Path;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header::{self, HeaderMap, HeaderValue};
use axum::http::response::Builder;
use axum::http::StatusCode;
use axum::response::Response;
use mime_guess::from_path;
use percent_encoding::{percent_encode, NON_ALPHANUMERIC};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use super::files::{resolve, PathQuery};
use super::AppContext;
use crate::error::ApiError;

// 1MB 数据块，提高大文件传输效率
const CHUNK_SIZE: usize = 1024 * 1024;

/// `GET /api/download?path=`：以附件形式发送文件，支持单段 Range
pub async fn download_file(
    State(context): State<AppContext>,
    Query(query): Query<PathQuery>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let path = resolve(context.root(), &query.path).await?;
    let metadata = tokio::fs::metadata(&path).await?;
    if metadata.is_dir() {
        return Err(ApiError::NotFound);
    }

    let file_size = metadata.len();
    let mime_type = from_path(&path).first_or_octet_stream();
    let builder = Response::builder()
        .header(header::CONTENT_TYPE, mime_type.as_ref())
        .header(header::CONTENT_DISPOSITION, content_disposition(&path))
        .header(header::ACCEPT_RANGES, "bytes");

    tracing::debug!(path = %query.path, size = file_size, "download");
    match headers.get(header::RANGE) {
        Some(range) => ranged_download(range, &path, file_size, builder).await,
        None => full_download(&path, file_size, builder).await,
    }
}

/// RFC 5987 编码的附件头
fn content_disposition(path: &Path) -> String {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file");
    let encoded = percent_encode(file_name.as_bytes(), NON_ALPHANUMERIC);
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        file_name.replace('"', "\\\""),
        encoded
    )
}

async fn full_download(path: &Path, file_size: u64, builder: Builder) -> Result<Response, ApiError> {
    let file = File::open(path).await?;
    let stream = ReaderStream::with_capacity(file, CHUNK_SIZE);
    Ok(builder
        .header(header::CONTENT_LENGTH, file_size.to_string())
        .body(Body::from_stream(stream))?)
}

#[derive(Debug, PartialEq, Eq)]
enum RangeError {
    Malformed,
    Unsatisfiable,
}

/// 解析 `bytes=start-end`、`bytes=start-`、`bytes=-suffix`，返回闭区间
fn parse_range(value: &str, file_size: u64) -> Result<(u64, u64), RangeError> {
    let spec = value.strip_prefix("bytes=").ok_or(RangeError::Malformed)?;
    let (start, end) = spec.split_once('-').ok_or(RangeError::Malformed)?;
    let parse = |s: &str| s.trim().parse::<u64>().map_err(|_| RangeError::Malformed);

    if file_size == 0 {
        return Err(RangeError::Unsatisfiable);
    }
    let last = file_size - 1;

    let (start, end) = match (start.trim().is_empty(), end.trim().is_empty()) {
        (true, true) => return Err(RangeError::Malformed),
        // 最后 N 个字节
        (true, false) => {
            let suffix = parse(end)?;
            if suffix == 0 {
                return Err(RangeError::Unsatisfiable);
            }
            (file_size.saturating_sub(suffix), last)
        }
        (false, true) => (parse(start)?, last),
        (false, false) => (parse(start)?, parse(end)?.min(last)),
    };

    if start > end || start >= file_size {
        return Err(RangeError::Unsatisfiable);
    }
    Ok((start, end))
}

async fn ranged_download(
    range: &HeaderValue,
    path: &Path,
    file_size: u64,
    builder: Builder,
) -> Result<Response, ApiError> {
    let parsed = range
        .to_str()
        .map_err(|_| RangeError::Malformed)
        .and_then(|value| parse_range(value, file_size));

    let (start, end) = match parsed {
        Ok(bounds) => bounds,
        Err(RangeError::Malformed) => {
            return Ok(builder
                .status(StatusCode::BAD_REQUEST)
                .body(Body::from("Invalid Range header"))?);
        }
        Err(RangeError::Unsatisfiable) => {
            return Ok(builder
                .status(StatusCode::RANGE_NOT_SATISFIABLE)
                .header(header::CONTENT_RANGE, format!("bytes */{}", file_size))
                .body(Body::empty())?);
        }
    };

    let content_length = end - start + 1;
    let mut file = File::open(path).await?;
    file.seek(SeekFrom::Start(start)).await?;
    let stream = ReaderStream::with_capacity(file.take(content_length), CHUNK_SIZE);

    Ok(builder
        .status(StatusCode::PARTIAL_CONTENT)
        .header(
            header::CONTENT_RANGE,
            format!("bytes {}-{}/{}", start, end, file_size),
        )
        .header(header::CONTENT_LENGTH, content_length.to_string())
        .body(Body::from_stream(stream))?)
}

#[cfg(test)]
mod tests {
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::server::testing::{app, read_bytes, read_json};

    #[test]
    fn parses_range_forms() {
        assert_eq!(parse_range("bytes=0-3", 10), Ok((0, 3)));
        assert_eq!(parse_range("bytes=4-", 10), Ok((4, 9)));
        assert_eq!(parse_range("bytes=-3", 10), Ok((7, 9)));
        assert_eq!(parse_range("bytes=5-100", 10), Ok((5, 9)));
        assert_eq!(parse_range("bytes=-30", 10), Ok((0, 9)));
    }

    #[test]
    fn rejects_bad_ranges() {
        assert_eq!(parse_range("items=0-1", 10), Err(RangeError::Malformed));
        assert_eq!(parse_range("bytes=a-b", 10), Err(RangeError::Malformed));
        assert_eq!(parse_range("bytes=-", 10), Err(RangeError::Malformed));
        assert_eq!(parse_range("bytes=10-", 10), Err(RangeError::Unsatisfiable));
        assert_eq!(parse_range("bytes=5-2", 10), Err(RangeError::Unsatisfiable));
        assert_eq!(parse_range("bytes=0-0", 0), Err(RangeError::Unsatisfiable));
    }

    #[test]
    fn disposition_escapes_non_ascii() {
        let header = content_disposition(Path::new("/srv/报告 1.pdf"));
        assert!(header.starts_with("attachment; filename=\"报告 1.pdf\""));
        assert!(header.ends_with("filename*=UTF-8''%E6%8A%A5%E5%91%8A%201%2Epdf"));
    }

    #[tokio::test]
    async fn streams_whole_file_as_attachment() {
        let root = tempfile::tempdir().unwrap();
        tokio::fs::create_dir(root.path().join("docs")).await.unwrap();
        tokio::fs::write(root.path().join("docs/a.txt"), b"0123456789").await.unwrap();

        let request = Request::get("/api/download?path=docs%2Fa.txt")
            .body(Body::empty())
            .unwrap();
        let response = app(root.path()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "text/plain");
        assert_eq!(headers[header::CONTENT_LENGTH], "10");
        assert_eq!(headers[header::ACCEPT_RANGES], "bytes");
        assert!(headers[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .starts_with("attachment;"));
        assert_eq!(read_bytes(response).await, b"0123456789"[..]);
    }

    #[tokio::test]
    async fn serves_partial_content() {
        let root = tempfile::tempdir().unwrap();
        tokio::fs::write(root.path().join("a.bin"), b"0123456789").await.unwrap();

        let request = Request::get("/api/download?path=a.bin")
            .header(header::RANGE, "bytes=2-5")
            .body(Body::empty())
            .unwrap();
        let response = app(root.path()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes 2-5/10");
        assert_eq!(read_bytes(response).await, b"2345"[..]);

        let request = Request::get("/api/download?path=a.bin")
            .header(header::RANGE, "bytes=20-")
            .body(Body::empty())
            .unwrap();
        let response = app(root.path()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes */10");
    }

    #[tokio::test]
    async fn directories_and_escapes_are_refused() {
        let root = tempfile::tempdir().unwrap();
        tokio::fs::create_dir(root.path().join("docs")).await.unwrap();

        let request = Request::get("/api/download?path=docs").body(Body::empty()).unwrap();
        let response = app(root.path()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(read_json(response).await["error"], "Path not found");

        let request = Request::get("/api/download?path=..%2Fsecret")
            .body(Body::empty())
            .unwrap();
        let response = app(root.path()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(read_json(response).await["error"], "Access denied");
    }
}
