//! Speech Engine Port - 宿主语音合成引擎抽象
//!
//! 定义宿主合成引擎的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::domain::speech::Prosody;
use crate::domain::voice::Voice;

/// 宿主引擎错误
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Speech synthesis not supported")]
    Unsupported,

    /// 被 cancel_all 打断
    #[error("Utterance interrupted")]
    Interrupted,

    #[error("Synthesis failed: {0}")]
    SynthesisFailed(String),

    #[error("Process error: {0}")]
    ProcessError(String),
}

/// 单次朗读配置
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub prosody: Prosody,
    /// 指定音色，None 时由宿主按语言选择
    pub voice: Option<Voice>,
    /// 语言标签
    pub lang: String,
}

/// Speech Engine Port
///
/// 宿主的音色列表可能异步填充，通过"音色变化"通知告知
#[async_trait]
pub trait SpeechEnginePort: Send + Sync {
    /// 宿主是否具备语音合成能力
    fn is_supported(&self) -> bool;

    /// 当前音色列表（可能为空）
    fn list_voices(&self) -> Vec<Voice>;

    /// 订阅"音色列表变化"通知；宿主不提供通知时返回 None
    fn subscribe_voices_changed(&self) -> Option<broadcast::Receiver<()>>;

    /// 朗读一段文本，正常结束返回 Ok，宿主报错或被打断返回 Err
    ///
    /// 返回的 future 可能在结束前被丢弃，实现需能容忍
    async fn speak(&self, utterance: Utterance) -> Result<(), EngineError>;

    /// 立即停止所有在途朗读
    fn cancel_all(&self);

    /// 宿主当前是否在输出语音
    fn is_speaking(&self) -> bool;
}
