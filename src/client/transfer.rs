/// 传输中的进度快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    pub loaded: u64,
    pub total: u64,
}

impl TransferProgress {
    /// 总量未知（为 0）时返回 `None`
    pub fn percent(&self) -> Option<f64> {
        (self.total > 0).then(|| self.loaded as f64 / self.total as f64 * 100.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransferPhase {
    #[default]
    Idle,
    InFlight,
    Completed,
    /// 服务器返回了非 200 状态
    Rejected(u16),
    /// 传输层错误
    Errored,
}

/// 一次上传的界面状态：idle → in-flight → completed | rejected | errored
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransferStatus {
    pub phase: TransferPhase,
    pub files: usize,
    pub percent: f64,
}

impl TransferStatus {
    pub fn started(files: usize) -> Self {
        Self {
            phase: TransferPhase::InFlight,
            files,
            percent: 0.0,
        }
    }

    /// 只在总量可知时更新百分比
    pub fn advance(&mut self, progress: TransferProgress) {
        if let Some(percent) = progress.percent() {
            self.percent = percent.min(100.0);
        }
    }

    pub fn finish(&mut self, phase: TransferPhase) {
        self.phase = phase;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_total_keeps_last_percent() {
        let mut status = TransferStatus::started(1);
        status.advance(TransferProgress { loaded: 50, total: 200 });
        assert_eq!(status.percent, 25.0);
        status.advance(TransferProgress { loaded: 80, total: 0 });
        assert_eq!(status.percent, 25.0);
        assert_eq!(status.phase, TransferPhase::InFlight);
    }

    #[test]
    fn percent_never_exceeds_full() {
        let mut status = TransferStatus::started(1);
        status.advance(TransferProgress { loaded: 12, total: 10 });
        assert_eq!(status.percent, 100.0);
    }
}
