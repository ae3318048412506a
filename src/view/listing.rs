use std::cmp::Ordering;

use feruca::Collator;

use super::{format_size, Action};
use crate::model::DirectoryEntry;

/// 空目录时唯一显示的占位文字
pub const EMPTY_PLACEHOLDER: &str = "Empty Directory";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Folder,
    File,
}

impl ItemKind {
    /// 图标名（Material Icons）
    pub fn icon(self) -> &'static str {
        match self {
            ItemKind::Folder => "folder",
            ItemKind::File => "description",
        }
    }

    pub fn class(self) -> &'static str {
        match self {
            ItemKind::Folder => "folder",
            ItemKind::File => "file",
        }
    }
}

/// 列表中可点击的一项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub name: String,
    pub kind: ItemKind,
    /// 目录显示 "Folder"，文件显示格式化后的大小
    pub meta: String,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingView {
    Empty,
    Items(Vec<Item>),
}

impl ListingView {
    pub fn items(&self) -> &[Item] {
        match self {
            ListingView::Empty => &[],
            ListingView::Items(items) => items,
        }
    }
}

/// 目录在前，文件在后；组内按 Unicode 排序规则（CLDR root）比较名称。
///
/// 重音字母跟随基本字母，大小写只在其余都相同时才区分（小写在前）。
fn compare_entries(collator: &mut Collator, a: &DirectoryEntry, b: &DirectoryEntry) -> Ordering {
    b.is_dir
        .cmp(&a.is_dir)
        .then_with(|| collator.collate(a.name.as_str(), b.name.as_str()))
}

fn sort_entries(entries: &mut [DirectoryEntry]) {
    let mut collator = Collator::default();
    entries.sort_by(|a, b| compare_entries(&mut collator, a, b));
}

pub fn listing(mut entries: Vec<DirectoryEntry>) -> ListingView {
    if entries.is_empty() {
        return ListingView::Empty;
    }
    sort_entries(&mut entries);

    let items = entries
        .into_iter()
        .map(|entry| {
            if entry.is_dir {
                Item {
                    name: entry.name,
                    kind: ItemKind::Folder,
                    meta: String::from("Folder"),
                    action: Action::Navigate(entry.path),
                }
            } else {
                Item {
                    name: entry.name,
                    kind: ItemKind::File,
                    meta: format_size(entry.size),
                    action: Action::Download(entry.path),
                }
            }
        })
        .collect();
    ListingView::Items(items)
}
