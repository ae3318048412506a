//! 把视图描述渲染成完整的 HTML 页面（服务端浏览页）。

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::model::UPLOAD_FIELD;
use crate::view::{browse_href, download_href, Action, Crumb, Item, ListingView, EMPTY_PLACEHOLDER};

pub fn page(current_path: &str, crumbs: &[Crumb], listing: &ListingView, notice: Option<&str>) -> String {
    let title = if current_path.is_empty() { "/" } else { current_path };
    let notice = notice
        .map(|message| format!(r#"<div class="notice">{}</div>"#, encode_text(message)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
        <html lang="en">
        <head>
            <meta charset="UTF-8">
            <meta name="viewport" content="width=device-width, initial-scale=1.0">
            <title>filedeck - {title}</title>
            <link rel="stylesheet" href="https://fonts.googleapis.com/icon?family=Material+Icons+Round">
            <style>
                {css}
            </style>
        </head>
        <body>
            <div class="container">
                <header>
                    <nav class="breadcrumbs">{crumbs}</nav>
                </header>
                {notice}
                <form class="upload" method="post" action="/api/upload" enctype="multipart/form-data">
                    <input type="file" name="{field}" multiple>
                    <button type="submit">Upload</button>
                </form>
                <div class="file-list">{items}</div>
            </div>
        </body>
        </html>"#,
        title = encode_text(title),
        css = CSS,
        crumbs = breadcrumbs(crumbs),
        notice = notice,
        field = UPLOAD_FIELD,
        items = items(listing),
    )
}

// 生成面包屑导航
fn breadcrumbs(crumbs: &[Crumb]) -> String {
    crumbs
        .iter()
        .map(|crumb| {
            let label = if crumb.is_root() {
                r#"<span class="material-icons-round">home</span>"#.to_string()
            } else {
                encode_text(&crumb.label).into_owned()
            };
            format!(
                r#"<a class="crumb" href="{}">{}</a>"#,
                encode_double_quoted_attribute(&browse_href(&crumb.target)),
                label
            )
        })
        .collect::<Vec<_>>()
        .join(" / ")
}

fn items(listing: &ListingView) -> String {
    match listing {
        ListingView::Empty => format!(r#"<div class="empty">{}</div>"#, EMPTY_PLACEHOLDER),
        ListingView::Items(items) => items.iter().map(item).collect(),
    }
}

fn item(item: &Item) -> String {
    let href = match &item.action {
        Action::Navigate(path) => browse_href(path),
        Action::Download(path) => download_href(path),
    };
    format!(
        r#"<a class="file-item {class}" href="{href}">
                <span class="material-icons-round file-icon">{icon}</span>
                <div class="file-details">
                    <span class="file-name" title="{title}">{name}</span>
                    <span class="file-meta">{meta}</span>
                </div>
            </a>"#,
        class = item.kind.class(),
        href = encode_double_quoted_attribute(&href),
        icon = item.kind.icon(),
        title = encode_double_quoted_attribute(&item.name),
        name = encode_text(&item.name),
        meta = encode_text(&item.meta),
    )
}

const CSS: &str = r#"
    * { margin: 0; padding: 0; box-sizing: border-box; }
    body {
        font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto,
            "Helvetica Neue", Arial, sans-serif;
        line-height: 1.6;
        background: #f5f5f5;
        color: #333;
    }
    .container {
        max-width: 1000px;
        margin: 2rem auto;
        padding: 1rem;
        background: white;
        border-radius: 8px;
        box-shadow: 0 2px 8px rgba(0,0,0,0.1);
    }
    header {
        border-bottom: 1px solid #eee;
        padding-bottom: 1rem;
        margin-bottom: 1.5rem;
    }
    .breadcrumbs { color: #7f8c8d; }
    .crumb { color: #3498db; text-decoration: none; }
    .crumb .material-icons-round { font-size: 16px; vertical-align: middle; }
    .crumb:hover { text-decoration: underline; }
    .notice {
        padding: 0.6rem 1rem;
        margin-bottom: 1rem;
        border-radius: 4px;
        background: #fdecea;
        color: #c0392b;
    }
    .upload { margin-bottom: 1.5rem; }
    .file-list {
        display: grid;
        grid-template-columns: repeat(auto-fill, minmax(200px, 1fr));
        gap: 0.5rem;
    }
    .file-item {
        display: flex;
        align-items: center;
        padding: 0.8rem 1rem;
        text-decoration: none;
        color: #34495e;
        border-radius: 4px;
        transition: all 0.2s;
    }
    .file-item:hover { background: #f8f9fa; transform: translateX(4px); }
    .file-icon { color: #7f8c8d; margin-right: 0.5rem; }
    .folder .file-icon { color: #3498db; }
    .file-details { display: flex; flex-direction: column; min-width: 0; }
    .file-name { word-break: break-all; }
    .file-meta { color: #95a5a6; font-size: 0.8em; }
    .empty { grid-column: 1/-1; text-align: center; color: #95a5a6; padding: 20px; }
    @media (max-width: 600px) {
        .container { margin: 1rem; }
        .file-item { padding: 0.6rem; }
    }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DirectoryEntry;
    use crate::view::{breadcrumbs as crumbs_for, listing, ItemKind};

    #[test]
    fn escapes_names_and_links_every_crumb() {
        let entries = vec![DirectoryEntry {
            name: "<b>&.txt".into(),
            path: "a/<b>&.txt".into(),
            is_dir: false,
            size: 10,
        }];
        let html = page("a", &crumbs_for("a"), &listing(entries), None);

        assert!(html.contains("&lt;b&gt;&amp;.txt"));
        assert!(html.contains(r#"href="/?path=""#));
        assert!(html.contains(r#"href="/?path=a""#));
        assert!(html.contains("/api/download?path=a%2F%3Cb%3E%26.txt"));
        assert!(html.contains("10 Bytes"));
    }

    #[test]
    fn notice_is_rendered_once() {
        let html = page("", &crumbs_for(""), &ListingView::Empty, Some("Access denied"));
        assert_eq!(html.matches("Access denied").count(), 1);
        assert!(html.contains(EMPTY_PLACEHOLDER));
    }

    #[test]
    fn item_kind_controls_icon() {
        let folder = Item {
            name: "src".into(),
            kind: ItemKind::Folder,
            meta: "Folder".into(),
            action: Action::Navigate("src".into()),
        };
        let html = item(&folder);
        assert!(html.contains("file-item folder"));
        assert!(html.contains(">folder</span>"));
    }
}
