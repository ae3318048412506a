//! 浏览 / 上传会话。
//!
//! [`Session`] 持有导航状态和待上传队列，负责目录加载和上传的先后顺序，
//! 每次状态变化后把视图描述交给注入的 [`Ui`]。所有操作都需要 `&mut self`，
//! 同一个会话里不会同时存在两个上传或两个目录加载。

use std::time::Duration;

use tokio::sync::mpsc;

use crate::view::{self, Action, Crumb, ListingView, PreviewView, TransferView};

mod api;
mod queue;
mod terminal;
mod transfer;

pub use api::ApiClient;
pub use queue::{PendingFile, UploadQueue};
pub use terminal::TerminalUi;
pub use transfer::{TransferPhase, TransferProgress, TransferStatus};

/// 上传成功后隐藏进度条、刷新目录之前的等待时间
pub const DEFAULT_REFRESH_DELAY: Duration = Duration::from_millis(1500);

/// 宿主界面。会话只输出视图描述，怎么显示由实现决定。
pub trait Ui {
    fn preview(&mut self, view: &PreviewView);
    fn breadcrumbs(&mut self, crumbs: &[Crumb]);
    fn listing(&mut self, view: &ListingView);
    fn transfer(&mut self, view: &TransferView);
    /// 阻塞式提示（目录加载被服务器拒绝）
    fn alert(&mut self, message: &str);
    fn open_download(&mut self, url: &str);
}

/// 会话状态
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// 空字符串表示根目录；只由成功的目录响应修改
    pub current_path: String,
    pub queue: UploadQueue,
    pub transfer: TransferStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    /// 服务器在响应里给出了 `error`
    Rejected(String),
    /// 请求或解析失败，只记录日志
    Unreachable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    /// 队列为空，什么都没做
    Skipped,
    Completed,
    Rejected(u16),
    Failed,
}

pub struct Session<U> {
    api: ApiClient,
    ui: U,
    state: AppState,
    refresh_delay: Duration,
}

impl<U: Ui> Session<U> {
    pub fn new(api: ApiClient, ui: U) -> Self {
        Self {
            api,
            ui,
            state: AppState::default(),
            refresh_delay: DEFAULT_REFRESH_DELAY,
        }
    }

    pub fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    #[cfg(test)]
    pub fn ui(&self) -> &U {
        &self.ui
    }

    /// 加入待上传文件（同名跳过），并重新渲染预览
    pub fn add_files(&mut self, files: impl IntoIterator<Item = PendingFile>) {
        self.state.queue.add(files);
        self.render_preview();
    }

    pub fn clear(&mut self) {
        self.state.queue.clear();
        self.render_preview();
    }

    fn render_preview(&mut self) {
        self.ui.preview(&view::preview(&self.state.queue));
    }

    fn render_transfer(&mut self) {
        self.ui.transfer(&view::transfer(&self.state.transfer));
    }

    /// 加载目录。成功时以服务器返回的路径为准更新导航状态并渲染面包屑和列表
    pub async fn load(&mut self, path: &str) -> LoadOutcome {
        let listing = match self.api.list(path).await {
            Ok(listing) => listing,
            Err(e) => {
                tracing::error!(path, error = %e, "failed to load directory");
                return LoadOutcome::Unreachable;
            }
        };

        if let Some(message) = listing.error {
            tracing::warn!(path, %message, "directory listing rejected");
            self.ui.alert(&message);
            return LoadOutcome::Rejected(message);
        }

        tracing::debug!(path, current = %listing.current_path, entries = listing.files.len(), "directory loaded");
        self.state.current_path = listing.current_path;
        self.ui.breadcrumbs(&view::breadcrumbs(&self.state.current_path));
        self.ui.listing(&view::listing(listing.files));
        LoadOutcome::Loaded
    }

    /// 重新加载当前目录
    pub async fn refresh(&mut self) -> LoadOutcome {
        let path = self.state.current_path.clone();
        self.load(&path).await
    }

    /// 处理面包屑或列表项的点击
    pub async fn activate(&mut self, action: &Action) {
        match action {
            Action::Navigate(path) => {
                self.load(path).await;
            }
            Action::Download(path) => match self.api.download_url(path) {
                Ok(url) => self.ui.open_download(url.as_str()),
                Err(e) => tracing::warn!(path, error = %e, "cannot build download url"),
            },
        }
    }

    /// 上传整个队列。
    ///
    /// 成功后清空队列，等待 `refresh_delay` 再隐藏进度条并刷新当前目录；
    /// 失败时保留队列，不自动重试。
    pub async fn upload(&mut self) -> UploadOutcome {
        if self.state.queue.is_empty() {
            return UploadOutcome::Skipped;
        }

        self.state.transfer = TransferStatus::started(self.state.queue.len());
        self.render_transfer();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let result = {
            let send = self.api.upload(self.state.queue.files(), tx);
            tokio::pin!(send);
            loop {
                tokio::select! {
                    result = &mut send => break result,
                    Some(progress) = rx.recv() => {
                        self.state.transfer.advance(progress);
                        self.ui.transfer(&view::transfer(&self.state.transfer));
                    }
                }
            }
        };
        while let Ok(progress) = rx.try_recv() {
            self.state.transfer.advance(progress);
            self.render_transfer();
        }

        match result {
            Ok(status) if status == reqwest::StatusCode::OK => {
                tracing::info!(files = self.state.transfer.files, "upload complete");
                self.state.transfer.finish(TransferPhase::Completed);
                self.render_transfer();
                self.clear();

                tokio::time::sleep(self.refresh_delay).await;
                self.state.transfer = TransferStatus::default();
                self.render_transfer();
                self.refresh().await;
                UploadOutcome::Completed
            }
            Ok(status) => {
                tracing::warn!(%status, "upload rejected");
                self.state.transfer.finish(TransferPhase::Rejected(status.as_u16()));
                self.render_transfer();
                UploadOutcome::Rejected(status.as_u16())
            }
            Err(e) => {
                tracing::warn!(error = %e, "upload failed");
                self.state.transfer.finish(TransferPhase::Errored);
                self.render_transfer();
                UploadOutcome::Failed
            }
        }
    }
}
