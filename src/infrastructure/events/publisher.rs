//! Event Publisher Implementation
//!
//! 语音生命周期事件广播，UI 层据此驱动头像动画

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::domain::speech::SessionId;
use crate::domain::voice::Voice;

/// 语音事件类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum SpeechEvent {
    /// 音色目录首次就绪
    VoicesReady { count: usize },
    /// 选中音色（自动或手动）
    VoiceSelected { name: String, lang: String },
    /// 开始朗读
    Started {
        session_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        voice: Option<String>,
        lang: String,
    },
    /// 正常结束
    Completed {
        session_id: String,
        duration_ms: i64,
    },
    /// 宿主报错
    Failed { session_id: String, error: String },
    /// 被取代或被停止
    Cancelled { session_id: String },
}

impl SpeechEvent {
    /// 是否为会话结局事件
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SpeechEvent::Completed { .. } | SpeechEvent::Failed { .. } | SpeechEvent::Cancelled { .. }
        )
    }
}

/// 事件发布器
pub struct EventPublisher {
    channel: broadcast::Sender<SpeechEvent>,
}

impl EventPublisher {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(100);
        Self { channel: tx }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SpeechEvent> {
        self.channel.subscribe()
    }

    /// 发布音色目录就绪事件
    pub fn publish_voices_ready(&self, count: usize) {
        self.publish(SpeechEvent::VoicesReady { count });
    }

    /// 发布音色选中事件
    pub fn publish_voice_selected(&self, voice: &Voice) {
        self.publish(SpeechEvent::VoiceSelected {
            name: voice.name().to_string(),
            lang: voice.lang().to_string(),
        });
    }

    /// 发布开始朗读事件
    pub fn publish_started(&self, session_id: &SessionId, voice: Option<&Voice>, lang: &str) {
        self.publish(SpeechEvent::Started {
            session_id: session_id.to_string(),
            voice: voice.map(|v| v.name().to_string()),
            lang: lang.to_string(),
        });
    }

    /// 发布朗读完成事件
    pub fn publish_completed(&self, session_id: &SessionId, duration_ms: i64) {
        self.publish(SpeechEvent::Completed {
            session_id: session_id.to_string(),
            duration_ms,
        });
    }

    /// 发布朗读失败事件
    pub fn publish_failed(&self, session_id: &SessionId, error: &str) {
        self.publish(SpeechEvent::Failed {
            session_id: session_id.to_string(),
            error: error.to_string(),
        });
    }

    /// 发布朗读取消事件
    pub fn publish_cancelled(&self, session_id: &SessionId) {
        self.publish(SpeechEvent::Cancelled {
            session_id: session_id.to_string(),
        });
    }

    fn publish(&self, event: SpeechEvent) {
        if let Err(e) = self.channel.send(event) {
            tracing::debug!(error = %e, "Failed to publish speech event (no receivers)");
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}
