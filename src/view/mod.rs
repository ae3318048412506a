//! 状态到界面的纯投影。服务端渲染的浏览页和客户端会话都从这里取视图描述，
//! 真正的显示由调用方负责。

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

mod breadcrumb;
mod listing;
mod preview;
mod size;
mod transfer;

pub use breadcrumb::{breadcrumbs, Crumb};
pub use listing::{listing, Item, ItemKind, ListingView, EMPTY_PLACEHOLDER};
pub use preview::{preview, PreviewView};
pub use size::format_size;
pub use transfer::{transfer, TransferView};

/// 点击某一项后的动作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// 加载该路径的目录列表
    Navigate(String),
    /// 下载该路径的文件
    Download(String),
}

// 与 encodeURIComponent 保留的字符一致
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// 编码后可直接放进 `?path=` 的值
pub fn encode_path(path: &str) -> String {
    utf8_percent_encode(path, QUERY_COMPONENT).to_string()
}

pub fn download_href(path: &str) -> String {
    format!("/api/download?path={}", encode_path(path))
}

pub fn browse_href(path: &str) -> String {
    format!("/?path={}", encode_path(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hrefs_encode_path_like_uri_components() {
        assert_eq!(download_href("a b/c&d.txt"), "/api/download?path=a%20b%2Fc%26d.txt");
        assert_eq!(browse_href("docs/(old)"), "/?path=docs%2F(old)");
        assert_eq!(encode_path("报告.pdf"), "%E6%8A%A5%E5%91%8A.pdf");
    }
}
