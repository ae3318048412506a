use crate::client::{TransferPhase, TransferStatus};

/// 上传进度条的视图
#[derive(Debug, Clone, PartialEq)]
pub struct TransferView {
    pub visible: bool,
    pub label: String,
    /// 四舍五入后的百分比文字，例如 `42%`
    pub percent: String,
    /// 进度条宽度（0..=100）
    pub width: f64,
    pub error: bool,
}

pub fn transfer(status: &TransferStatus) -> TransferView {
    let label = match status.phase {
        TransferPhase::Idle => String::new(),
        TransferPhase::InFlight => format!(
            "Uploading {} file{}...",
            status.files,
            if status.files == 1 { "" } else { "s" }
        ),
        TransferPhase::Completed => String::from("Upload Complete!"),
        TransferPhase::Rejected(_) => String::from("Upload Failed"),
        TransferPhase::Errored => String::from("Error processing upload"),
    };
    TransferView {
        visible: status.phase != TransferPhase::Idle,
        label,
        percent: format!("{}%", status.percent.round() as u32),
        width: status.percent,
        error: matches!(status.phase, TransferPhase::Rejected(_) | TransferPhase::Errored),
    }
}
