//! Voice Catalog - 宿主音色列表的就绪视图
//!
//! 宿主的音色列表异步填充，目录将其收敛为：
//! - 单向锁存的就绪标记（首次拿到非空列表时置位，之后不再回退）
//! - 按需读取的快照
//!
//! 宿主完全不支持合成时目录永久处于未就绪、空列表的惰性状态，这不是错误。

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::time::MissedTickBehavior;

use crate::application::ports::SpeechEnginePort;
use crate::domain::voice::markers::LISTING_MASCULINE_MARKERS;
use crate::domain::voice::Voice;
use crate::infrastructure::events::EventPublisher;

/// 默认轮询间隔
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// 音色目录
pub struct VoiceCatalog {
    engine: Arc<dyn SpeechEnginePort>,
    events: Arc<EventPublisher>,
    voices: RwLock<Vec<Voice>>,
    ready: watch::Sender<bool>,
    poll_interval: Duration,
}

impl VoiceCatalog {
    /// 创建目录并立即读取一次宿主列表
    pub fn new(
        engine: Arc<dyn SpeechEnginePort>,
        events: Arc<EventPublisher>,
        poll_interval: Duration,
    ) -> Self {
        let (ready, _) = watch::channel(false);
        let catalog = Self {
            engine,
            events,
            voices: RwLock::new(Vec::new()),
            ready,
            poll_interval,
        };
        catalog.refresh();
        catalog
    }

    /// 重新读取宿主音色列表
    ///
    /// 返回本次调用是否使目录变为就绪
    pub fn refresh(&self) -> bool {
        if !self.engine.is_supported() {
            return false;
        }

        let voices = self.engine.list_voices();
        let count = voices.len();
        *self.voices.write().unwrap_or_else(PoisonError::into_inner) = voices;

        let became_ready = count > 0
            && self.ready.send_if_modified(|ready| {
                if *ready {
                    false
                } else {
                    *ready = true;
                    true
                }
            });

        if became_ready {
            tracing::info!(count = count, "Voice catalog ready");
            self.events.publish_voices_ready(count);
        } else {
            tracing::debug!(count = count, "Voice catalog refreshed");
        }
        became_ready
    }

    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    /// 等待目录就绪
    ///
    /// 已就绪时立即返回，不触发宿主刷新。宿主始终不报告音色时永不返回，
    /// 需要超时的调用方自行包一层 `tokio::time::timeout`。
    pub async fn wait_until_ready(&self) {
        let mut rx = self.ready.subscribe();
        if rx.wait_for(|ready| *ready).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    /// 当前快照
    pub fn all_voices(&self) -> Vec<Voice> {
        self.voices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn filter<F>(&self, predicate: F) -> Vec<Voice>
    where
        F: Fn(&Voice) -> bool,
    {
        self.voices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|voice| predicate(voice))
            .cloned()
            .collect()
    }

    /// 指定语言的音色
    pub fn voices_for_language(&self, language: &str) -> Vec<Voice> {
        self.filter(|voice| voice.speaks(language))
    }

    /// 名称带男声标记的音色
    pub fn masculine_voices(&self) -> Vec<Voice> {
        self.filter(|voice| voice.name_contains_any(LISTING_MASCULINE_MARKERS))
    }

    /// 监听宿主通知
    ///
    /// 每次"音色变化"通知都刷新一次；就绪之前额外按轮询间隔刷新，
    /// 覆盖只填充列表却不发通知的宿主。就绪且通知源关闭后退出。
    pub async fn run(self: Arc<Self>) {
        if !self.engine.is_supported() {
            tracing::info!("Speech synthesis not supported, voice catalog stays inert");
            return;
        }

        let mut changes = self.engine.subscribe_voices_changed();
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::debug!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            notifications = changes.is_some(),
            "Voice catalog listener started"
        );

        loop {
            tokio::select! {
                changed = next_change(&mut changes) => {
                    if changed {
                        self.refresh();
                    } else {
                        changes = None;
                    }
                }
                _ = ticker.tick(), if !self.is_ready() => {
                    self.refresh();
                }
            }

            if changes.is_none() && self.is_ready() {
                break;
            }
        }

        tracing::debug!("Voice catalog listener stopped");
    }
}

/// 等待下一次通知；通知源关闭时返回 false，没有通知源时永远挂起
async fn next_change(changes: &mut Option<broadcast::Receiver<()>>) -> bool {
    match changes {
        Some(rx) => match rx.recv().await {
            Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => true,
            Err(broadcast::error::RecvError::Closed) => false,
        },
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::{SimulatedEngineConfig, SimulatedSpeechEngine};

    fn sample_voices() -> Vec<Voice> {
        vec![
            Voice::new("Google русский", "ru-RU"),
            Voice::new("Microsoft David", "en-US"),
            Voice::new("Мужской голос", "ru-RU"),
        ]
    }

    fn catalog_for(engine: Arc<SimulatedSpeechEngine>) -> Arc<VoiceCatalog> {
        Arc::new(VoiceCatalog::new(
            engine,
            EventPublisher::new().arc(),
            DEFAULT_POLL_INTERVAL,
        ))
    }

    #[tokio::test]
    async fn test_ready_when_voices_present_at_construction() {
        let engine = Arc::new(SimulatedSpeechEngine::new(SimulatedEngineConfig::with_voices(
            sample_voices(),
        )));
        let catalog = catalog_for(engine.clone());

        assert!(catalog.is_ready());
        assert_eq!(catalog.all_voices().len(), 3);

        // 已就绪时等待不会再读取宿主
        let calls = engine.list_calls();
        catalog.wait_until_ready().await;
        assert_eq!(engine.list_calls(), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_after_voices_changed_notification() {
        let engine = Arc::new(SimulatedSpeechEngine::new(SimulatedEngineConfig::default()));
        let catalog = catalog_for(engine.clone());
        assert!(!catalog.is_ready());
        assert!(catalog.all_voices().is_empty());

        tokio::spawn(catalog.clone().run());
        tokio::task::yield_now().await;

        engine.load_voices(sample_voices());
        tokio::time::timeout(Duration::from_secs(1), catalog.wait_until_ready())
            .await
            .expect("catalog should become ready");
        assert_eq!(catalog.all_voices().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_covers_silent_hosts() {
        let config = SimulatedEngineConfig {
            notify_voices_changed: false,
            ..SimulatedEngineConfig::default()
        };
        let engine = Arc::new(SimulatedSpeechEngine::new(config));
        let catalog = catalog_for(engine.clone());
        tokio::spawn(catalog.clone().run());

        engine.load_voices(sample_voices());
        assert!(!catalog.is_ready());

        tokio::time::timeout(DEFAULT_POLL_INTERVAL * 2, catalog.wait_until_ready())
            .await
            .expect("polling should pick up voices");
    }

    #[tokio::test(start_paused = true)]
    async fn test_readiness_never_reverts() {
        let engine = Arc::new(SimulatedSpeechEngine::new(SimulatedEngineConfig::with_voices(
            sample_voices(),
        )));
        let catalog = catalog_for(engine.clone());
        assert!(catalog.is_ready());

        engine.load_voices(Vec::new());
        assert!(!catalog.refresh());
        assert!(catalog.is_ready());
        assert!(catalog.all_voices().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_host_never_ready() {
        let engine = Arc::new(SimulatedSpeechEngine::new(SimulatedEngineConfig::default()));
        let catalog = catalog_for(engine);
        tokio::spawn(catalog.clone().run());

        let waited = tokio::time::timeout(Duration::from_secs(5), catalog.wait_until_ready()).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn test_unsupported_host_is_inert() {
        let engine = Arc::new(SimulatedSpeechEngine::new(SimulatedEngineConfig::unsupported()));
        let catalog = catalog_for(engine.clone());

        assert!(!catalog.refresh());
        assert!(!catalog.is_ready());
        assert!(catalog.all_voices().is_empty());
        assert_eq!(engine.list_calls(), 0);

        // 监听任务立即退出
        catalog.clone().run().await;
    }

    #[tokio::test]
    async fn test_filtered_queries() {
        let engine = Arc::new(SimulatedSpeechEngine::new(SimulatedEngineConfig::with_voices(
            sample_voices(),
        )));
        let catalog = catalog_for(engine);

        let russian: Vec<String> = catalog
            .voices_for_language("ru")
            .iter()
            .map(|v| v.name().to_string())
            .collect();
        assert_eq!(russian, vec!["Google русский", "Мужской голос"]);

        let masculine: Vec<String> = catalog
            .masculine_voices()
            .iter()
            .map(|v| v.name().to_string())
            .collect();
        assert_eq!(masculine, vec!["Microsoft David", "Мужской голос"]);

        assert_eq!(catalog.filter(|v| v.lang() == "en-US").len(), 1);
    }
}
