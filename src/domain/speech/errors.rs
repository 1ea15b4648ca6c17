//! Speech Context - Errors

use thiserror::Error;

/// 一次 speak 调用的失败结局
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpeechError {
    /// 宿主完全不具备语音合成能力，不重试
    #[error("Speech synthesis not supported")]
    Unsupported,

    /// 宿主在朗读过程中报告错误，不自动重试
    #[error("Synthesis error: {0}")]
    Synthesis(String),

    /// 被新的请求取代或被显式停止
    #[error("Speech cancelled")]
    Cancelled,

    #[error("Invalid speech request: {0}")]
    InvalidRequest(String),
}

impl SpeechError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// 取消属于有意为之，UI 不应显示错误信息
    pub fn is_cancellation(&self) -> bool {
        matches!(self, SpeechError::Cancelled)
    }
}
