//! Speech Context - 会话状态

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 语音会话标识
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 控制器状态
///
/// Completed / Failed / Cancelled 是结局而非状态，发生后立即回到 Idle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeechState {
    Idle,
    /// 等待宿主音色就绪
    AwaitingVoices,
    Speaking,
}

impl SpeechState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeechState::Idle => "idle",
            SpeechState::AwaitingVoices => "awaiting_voices",
            SpeechState::Speaking => "speaking",
        }
    }
}
