//! Simulated Speech Engine - 模拟宿主合成引擎
//!
//! 不输出声音，按文本长度和语速计时。用于演示和测试：
//! - 可延迟加载音色并发出"音色变化"通知
//! - cancel_all 打断所有在途朗读
//! - 可按文本注入失败

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::InFlight;
use crate::application::ports::{EngineError, SpeechEnginePort, Utterance};
use crate::domain::voice::Voice;

/// 模拟引擎配置
#[derive(Debug, Clone)]
pub struct SimulatedEngineConfig {
    /// 是否具备合成能力
    pub supported: bool,
    /// 宿主最终提供的音色
    pub voices: Vec<Voice>,
    /// 音色延迟加载时间（毫秒），0 表示构造时即可用
    pub voices_delay_ms: u64,
    /// 加载音色后是否发出通知
    pub notify_voices_changed: bool,
    /// 语速 1.0 时每分钟单词数
    pub words_per_minute: u32,
    /// 文本包含该子串时模拟宿主报错
    pub fail_on: Option<String>,
}

impl Default for SimulatedEngineConfig {
    fn default() -> Self {
        Self {
            supported: true,
            voices: Vec::new(),
            voices_delay_ms: 0,
            notify_voices_changed: true,
            words_per_minute: 150,
            fail_on: None,
        }
    }
}

impl SimulatedEngineConfig {
    /// 构造时即提供音色
    pub fn with_voices(voices: Vec<Voice>) -> Self {
        Self {
            voices,
            ..Default::default()
        }
    }

    /// 不具备合成能力的宿主
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Default::default()
        }
    }
}

/// 模拟宿主引擎
pub struct SimulatedSpeechEngine {
    config: SimulatedEngineConfig,
    voices: RwLock<Vec<Voice>>,
    changes: broadcast::Sender<()>,
    /// 当前批次的打断令牌，cancel_all 时整体替换
    interrupt: Mutex<CancellationToken>,
    in_flight: AtomicUsize,
    list_calls: AtomicUsize,
    history: Mutex<Vec<Utterance>>,
}

impl SimulatedSpeechEngine {
    pub fn new(config: SimulatedEngineConfig) -> Self {
        let initial = if config.supported && config.voices_delay_ms == 0 {
            config.voices.clone()
        } else {
            Vec::new()
        };
        let (changes, _) = broadcast::channel(16);

        tracing::info!(
            supported = config.supported,
            voices = config.voices.len(),
            voices_delay_ms = config.voices_delay_ms,
            "SimulatedSpeechEngine initialized"
        );

        Self {
            config,
            voices: RwLock::new(initial),
            changes,
            interrupt: Mutex::new(CancellationToken::new()),
            in_flight: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
            history: Mutex::new(Vec::new()),
        }
    }

    /// 启动延迟加载；音色已在构造时可用或宿主不支持时返回 None
    pub fn start(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        if !self.config.supported || self.config.voices_delay_ms == 0 {
            return None;
        }
        let engine = Arc::clone(self);
        let delay = Duration::from_millis(self.config.voices_delay_ms);
        Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            engine.load_voices(engine.config.voices.clone());
        }))
    }

    /// 替换音色列表
    pub fn load_voices(&self, voices: Vec<Voice>) {
        let count = voices.len();
        *self.voices.write().unwrap_or_else(PoisonError::into_inner) = voices;
        tracing::debug!(count = count, "Simulated voices loaded");

        if self.config.notify_voices_changed {
            // 无订阅者时忽略
            let _ = self.changes.send(());
        }
    }

    /// 单次朗读的模拟时长
    pub fn utterance_duration(&self, utterance: &Utterance) -> Duration {
        let words = utterance.text.split_whitespace().count().max(1) as f64;
        let wpm = f64::from(self.config.words_per_minute.max(1)) * f64::from(utterance.prosody.rate);
        Duration::from_millis((words * 60_000.0 / wpm.max(1.0)).round() as u64)
    }

    /// list_voices 被调用的次数
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// 提交过的朗读
    pub fn spoken(&self) -> Vec<Utterance> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl SpeechEnginePort for SimulatedSpeechEngine {
    fn is_supported(&self) -> bool {
        self.config.supported
    }

    fn list_voices(&self) -> Vec<Voice> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.voices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn subscribe_voices_changed(&self) -> Option<broadcast::Receiver<()>> {
        self.config
            .notify_voices_changed
            .then(|| self.changes.subscribe())
    }

    async fn speak(&self, utterance: Utterance) -> Result<(), EngineError> {
        if !self.config.supported {
            return Err(EngineError::Unsupported);
        }

        let interrupt = self
            .interrupt
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let duration = self.utterance_duration(&utterance);
        let fails = self
            .config
            .fail_on
            .as_deref()
            .is_some_and(|needle| utterance.text.contains(needle));

        tracing::debug!(
            text_len = utterance.text.len(),
            voice = ?utterance.voice.as_ref().map(|v| v.name().to_string()),
            lang = %utterance.lang,
            duration_ms = duration.as_millis() as u64,
            "SimulatedSpeechEngine: speaking"
        );
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(utterance);

        if fails {
            return Err(EngineError::SynthesisFailed("synthesis-failed".to_string()));
        }

        let _in_flight = InFlight::enter(&self.in_flight);
        tokio::select! {
            _ = interrupt.cancelled() => Err(EngineError::Interrupted),
            _ = tokio::time::sleep(duration) => Ok(()),
        }
    }

    fn cancel_all(&self) {
        let mut interrupt = self.interrupt.lock().unwrap_or_else(PoisonError::into_inner);
        interrupt.cancel();
        *interrupt = CancellationToken::new();
    }

    fn is_speaking(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }
}
