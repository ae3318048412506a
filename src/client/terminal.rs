use std::io::{self, Write};

use super::Ui;
use crate::view::{Crumb, ItemKind, ListingView, PreviewView, TransferView, EMPTY_PLACEHOLDER};

/// 把视图打印到终端：列表写 stdout，进度和提示写 stderr
#[derive(Debug, Default)]
pub struct TerminalUi {
    /// 进度行还没换行
    progress_open: bool,
}

impl TerminalUi {
    pub fn new() -> Self {
        Self::default()
    }

    fn end_progress_line(&mut self) {
        if self.progress_open {
            eprintln!();
            self.progress_open = false;
        }
    }
}

impl Ui for TerminalUi {
    fn preview(&mut self, view: &PreviewView) {
        if !view.visible {
            return;
        }
        let width = view.rows.iter().map(|r| r.name.chars().count()).max().unwrap_or(0);
        for row in &view.rows {
            println!("  + {:<width$}  {}", row.name, row.size, width = width);
        }
        println!("[{}]", view.trigger_label);
    }

    fn breadcrumbs(&mut self, crumbs: &[Crumb]) {
        self.end_progress_line();
        let trail: Vec<&str> = crumbs.iter().map(|c| c.label.as_str()).collect();
        println!("{}", trail.join(" / "));
    }

    fn listing(&mut self, view: &ListingView) {
        match view {
            ListingView::Empty => println!("  {}", EMPTY_PLACEHOLDER),
            ListingView::Items(items) => {
                let width = items.iter().map(|i| i.name.chars().count()).max().unwrap_or(0);
                for item in items {
                    let marker = match item.kind {
                        ItemKind::Folder => "d",
                        ItemKind::File => "-",
                    };
                    println!("  {} {:<width$}  {}", marker, item.name, item.meta, width = width);
                }
            }
        }
    }

    fn transfer(&mut self, view: &TransferView) {
        if !view.visible {
            self.end_progress_line();
            return;
        }
        const BAR: usize = 30;
        let filled = ((view.width / 100.0) * BAR as f64).round() as usize;
        let filled = filled.min(BAR);
        let mut stderr = io::stderr().lock();
        let _ = write!(
            stderr,
            "\r{:<24} [{}{}] {:>4}{}",
            view.label,
            "#".repeat(filled),
            " ".repeat(BAR - filled),
            view.percent,
            if view.error { " !" } else { "" }
        );
        let _ = stderr.flush();
        self.progress_open = true;
    }

    fn alert(&mut self, message: &str) {
        self.end_progress_line();
        eprintln!("error: {}", message);
    }

    fn open_download(&mut self, url: &str) {
        println!("{}", url);
    }
}
