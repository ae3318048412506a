use super::format_size;
use crate::client::UploadQueue;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRow {
    pub name: String,
    pub size: String,
}

/// 待上传队列的视图。队列为空时面板隐藏。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewView {
    pub visible: bool,
    pub rows: Vec<PreviewRow>,
    pub trigger_label: String,
}

/// `Upload 1 File` / `Upload N Files`
pub fn trigger_label(count: usize) -> String {
    format!("Upload {} File{}", count, if count == 1 { "" } else { "s" })
}

pub fn preview(queue: &UploadQueue) -> PreviewView {
    let rows = queue
        .iter()
        .map(|file| PreviewRow {
            name: file.name.clone(),
            size: format_size(file.size),
        })
        .collect();
    PreviewView {
        visible: !queue.is_empty(),
        rows,
        trigger_label: trigger_label(queue.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::PendingFile;

    #[test]
    fn label_is_singular_for_one_file() {
        assert_eq!(trigger_label(1), "Upload 1 File");
        assert_eq!(trigger_label(2), "Upload 2 Files");
        assert_eq!(trigger_label(0), "Upload 0 Files");
    }

    #[test]
    fn rows_follow_queue_order() {
        let mut queue = UploadQueue::default();
        queue.add([
            PendingFile::new("b.bin", 1536, "/tmp/b.bin"),
            PendingFile::new("a.txt", 0, "/tmp/a.txt"),
        ]);
        let view = preview(&queue);
        assert!(view.visible);
        assert_eq!(view.trigger_label, "Upload 2 Files");
        assert_eq!(
            view.rows,
            [
                PreviewRow { name: "b.bin".into(), size: "1.5 KB".into() },
                PreviewRow { name: "a.txt".into(), size: "0 Bytes".into() },
            ]
        );
    }

    #[test]
    fn empty_queue_hides_panel() {
        let view = preview(&UploadQueue::default());
        assert!(!view.visible);
        assert!(view.rows.is_empty());
    }
}
