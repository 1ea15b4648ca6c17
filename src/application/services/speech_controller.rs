//! Speech Controller - 语音会话编排
//!
//! 一次 speak 调用的完整流程：
//! 1. 校验请求，宿主不支持时立即失败
//! 2. AwaitingVoices：等待音色目录就绪
//! 3. 取代在途会话并无条件取消宿主上的朗读，进入 Speaking
//! 4. 等待宿主结束，产生唯一结局后回到 Idle
//!
//! 不变量: 同一时刻最多一个 Speaking 会话；每次调用恰好结算一次。

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::application::ports::{EngineError, SpeechEnginePort, Utterance};
use crate::application::services::VoiceCatalog;
use crate::domain::speech::{Prosody, ProsodyDefaults, SessionId, SpeechError, SpeechOptions, SpeechState};
use crate::domain::voice::{reads_as_masculine, Voice, VoiceSelector};
use crate::infrastructure::events::EventPublisher;

/// 控制器配置
#[derive(Debug, Clone)]
pub struct SpeechControllerConfig {
    pub prosody: ProsodyDefaults,
    /// 未选中音色时使用的语言标签
    pub default_lang: String,
}

impl Default for SpeechControllerConfig {
    fn default() -> Self {
        Self {
            prosody: ProsodyDefaults::default(),
            default_lang: "ru-RU".to_string(),
        }
    }
}

/// 一个尚未结算的会话
struct ActiveSession {
    id: SessionId,
    cancel: CancellationToken,
    started_at: DateTime<Utc>,
}

impl ActiveSession {
    fn new() -> Self {
        Self {
            id: SessionId::new(),
            cancel: CancellationToken::new(),
            started_at: Utc::now(),
        }
    }
}

/// 会话离开控制器时（含 future 被丢弃）清理登记
struct SessionGuard<'a> {
    controller: &'a SpeechController,
    id: SessionId,
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.controller.lock();
        state.awaiting.retain(|s| s.id != self.id);
        if state.speaking.as_ref().is_some_and(|s| s.id == self.id) {
            state.speaking = None;
        }
    }
}

#[derive(Default)]
struct ControllerState {
    speaking: Option<ActiveSession>,
    /// 新会话登记时取消并移除之前的等待者
    awaiting: Vec<ActiveSession>,
    selected: Option<Voice>,
}

/// 语音控制器
pub struct SpeechController {
    engine: Arc<dyn SpeechEnginePort>,
    catalog: Arc<VoiceCatalog>,
    selector: VoiceSelector,
    config: SpeechControllerConfig,
    events: Arc<EventPublisher>,
    state: Mutex<ControllerState>,
}

impl SpeechController {
    pub fn new(
        engine: Arc<dyn SpeechEnginePort>,
        catalog: Arc<VoiceCatalog>,
        selector: VoiceSelector,
        config: SpeechControllerConfig,
        events: Arc<EventPublisher>,
    ) -> Self {
        Self {
            engine,
            catalog,
            selector,
            config,
            events,
            state: Mutex::new(ControllerState::default()),
        }
    }

    /// 朗读一段文本
    ///
    /// 正常结束返回 Ok；被新的调用取代或被 stop 时返回 `SpeechError::Cancelled`。
    /// 宿主支持合成但始终不提供音色时，返回的 future 永不完成。
    pub async fn speak(&self, text: &str, options: SpeechOptions) -> Result<(), SpeechError> {
        if text.trim().is_empty() {
            return Err(SpeechError::invalid("text must not be empty"));
        }
        options.validate().map_err(SpeechError::invalid)?;

        if !self.engine.is_supported() {
            tracing::warn!("Speech synthesis not supported by host");
            return Err(SpeechError::Unsupported);
        }

        let session = ActiveSession::new();
        let id = session.id.clone();
        let cancel = session.cancel.clone();
        let started_at = session.started_at;
        {
            let mut state = self.lock();
            // 同一时刻至多一个会话等待音色
            for earlier in state.awaiting.drain(..) {
                tracing::debug!(
                    session_id = %earlier.id,
                    superseded_by = %id,
                    "Superseding awaiting session"
                );
                earlier.cancel.cancel();
            }
            state.awaiting.push(session);
        }
        let guard = SessionGuard {
            controller: self,
            id: id.clone(),
        };
        tracing::debug!(session_id = %id, "Awaiting voices");

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                drop(guard);
                return self.settle(&id, started_at, Err(SpeechError::Cancelled));
            }
            _ = self.catalog.wait_until_ready() => {}
        }

        let (utterance, newly_selected) = {
            let mut state = self.lock();
            let position = state.awaiting.iter().position(|s| s.id == id);
            let session = match position {
                Some(index) if !cancel.is_cancelled() => state.awaiting.remove(index),
                _ => {
                    drop(state);
                    drop(guard);
                    return self.settle(&id, started_at, Err(SpeechError::Cancelled));
                }
            };

            if let Some(previous) = state.speaking.take() {
                tracing::debug!(
                    session_id = %previous.id,
                    superseded_by = %id,
                    "Superseding in-flight session"
                );
                previous.cancel.cancel();
            }
            // 无条件取消宿主上的在途朗读
            self.engine.cancel_all();

            let newly_selected = self.resolve_voice(&mut state);
            let utterance = self.build_utterance(text, &options, state.selected.clone());
            state.speaking = Some(session);
            (utterance, newly_selected)
        };

        if let Some(voice) = newly_selected {
            self.events.publish_voice_selected(&voice);
        }

        tracing::info!(
            session_id = %id,
            voice = ?utterance.voice.as_ref().map(|v| v.name().to_string()),
            lang = %utterance.lang,
            rate = utterance.prosody.rate,
            pitch = utterance.prosody.pitch,
            volume = utterance.prosody.volume,
            "Speaking"
        );
        self.events
            .publish_started(&id, utterance.voice.as_ref(), &utterance.lang);

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SpeechError::Cancelled),
            outcome = self.engine.speak(utterance) => outcome.map_err(|e| match e {
                EngineError::Interrupted => SpeechError::Cancelled,
                EngineError::Unsupported => SpeechError::Unsupported,
                other => SpeechError::Synthesis(other.to_string()),
            }),
        };

        drop(guard);
        self.settle(&id, started_at, result)
    }

    /// 停止当前朗读
    ///
    /// 返回是否有会话被停止；Idle 时不做任何事，也不通知宿主。
    pub fn stop(&self) -> bool {
        let (speaking, awaiting) = {
            let mut state = self.lock();
            if state.speaking.is_none() && state.awaiting.is_empty() {
                return false;
            }
            (state.speaking.take(), std::mem::take(&mut state.awaiting))
        };

        for session in speaking.iter().chain(awaiting.iter()) {
            session.cancel.cancel();
        }
        self.engine.cancel_all();

        tracing::info!(
            speaking = speaking.is_some(),
            awaiting = awaiting.len(),
            "Speech stopped"
        );
        true
    }

    /// 是否有会话处于 Speaking
    pub fn is_speaking(&self) -> bool {
        self.lock().speaking.is_some()
    }

    pub fn state(&self) -> SpeechState {
        let state = self.lock();
        if state.speaking.is_some() {
            SpeechState::Speaking
        } else if !state.awaiting.is_empty() {
            SpeechState::AwaitingVoices
        } else {
            SpeechState::Idle
        }
    }

    pub fn selected_voice(&self) -> Option<Voice> {
        self.lock().selected.clone()
    }

    /// 按名称（完全相等）手动选择音色，未找到时静默不变
    pub fn select_by_name(&self, name: &str) -> bool {
        self.select_by_predicate(|voice| voice.name() == name)
    }

    /// 按条件手动选择音色（目录顺序第一个命中），未找到时静默不变
    pub fn select_by_predicate<F>(&self, predicate: F) -> bool
    where
        F: Fn(&Voice) -> bool,
    {
        let Some(voice) = self.catalog.all_voices().into_iter().find(|v| predicate(v)) else {
            tracing::debug!("Voice override matched nothing, selection unchanged");
            return false;
        };

        tracing::info!(voice = %voice, "Voice selected manually");
        self.events.publish_voice_selected(&voice);
        self.lock().selected = Some(voice);
        true
    }

    /// 首次就绪后自动选择一次音色，返回新选中的音色
    fn resolve_voice(&self, state: &mut ControllerState) -> Option<Voice> {
        if state.selected.is_some() {
            return None;
        }

        let voices = self.catalog.all_voices();
        let (rank, voice) = self.selector.select_ranked(&voices)?;
        tracing::info!(voice = %voice, priority = rank + 1, "Voice selected");
        state.selected = Some(voice.clone());
        Some(voice.clone())
    }

    fn build_utterance(&self, text: &str, options: &SpeechOptions, voice: Option<Voice>) -> Utterance {
        let masculine = voice.as_ref().is_some_and(reads_as_masculine);
        let lang = voice
            .as_ref()
            .map(|v| v.lang().to_string())
            .unwrap_or_else(|| self.config.default_lang.clone());

        Utterance {
            text: text.to_string(),
            prosody: Prosody::resolve(options, &self.config.prosody, masculine),
            voice,
            lang,
        }
    }

    /// 记录并广播唯一结局
    fn settle(
        &self,
        id: &SessionId,
        started_at: DateTime<Utc>,
        result: Result<(), SpeechError>,
    ) -> Result<(), SpeechError> {
        match &result {
            Ok(()) => {
                let duration_ms = (Utc::now() - started_at).num_milliseconds();
                tracing::info!(session_id = %id, duration_ms = duration_ms, "Speech completed");
                self.events.publish_completed(id, duration_ms);
            }
            Err(SpeechError::Cancelled) => {
                tracing::debug!(session_id = %id, "Speech cancelled");
                self.events.publish_cancelled(id);
            }
            Err(e) => {
                tracing::warn!(session_id = %id, error = %e, "Speech failed");
                self.events.publish_failed(id, &e.to_string());
            }
        }
        result
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::broadcast;

    use crate::application::services::DEFAULT_POLL_INTERVAL;
    use crate::infrastructure::adapters::{SimulatedEngineConfig, SimulatedSpeechEngine};
    use crate::infrastructure::events::SpeechEvent;

    struct Fixture {
        engine: Arc<SimulatedSpeechEngine>,
        catalog: Arc<VoiceCatalog>,
        controller: Arc<SpeechController>,
        events: broadcast::Receiver<SpeechEvent>,
    }

    fn fixture(config: SimulatedEngineConfig) -> Fixture {
        let engine = Arc::new(SimulatedSpeechEngine::new(config));
        let publisher = EventPublisher::new().arc();
        let catalog = Arc::new(VoiceCatalog::new(
            engine.clone(),
            publisher.clone(),
            DEFAULT_POLL_INTERVAL,
        ));
        let events = publisher.subscribe();
        let controller = Arc::new(SpeechController::new(
            engine.clone(),
            catalog.clone(),
            VoiceSelector::default(),
            SpeechControllerConfig::default(),
            publisher,
        ));
        Fixture {
            engine,
            catalog,
            controller,
            events,
        }
    }

    fn scenario_voices() -> SimulatedEngineConfig {
        SimulatedEngineConfig::with_voices(vec![
            Voice::new("Google ru-RU", "ru-RU"),
            Voice::new("Microsoft David", "en-US"),
        ])
    }

    fn drain(events: &mut broadcast::Receiver<SpeechEvent>) -> Vec<SpeechEvent> {
        let mut received = Vec::new();
        while let Ok(event) = events.try_recv() {
            received.push(event);
        }
        received
    }

    async fn wait_speaking(controller: &SpeechController) {
        wait_state(controller, SpeechState::Speaking).await;
    }

    async fn wait_state(controller: &SpeechController, expected: SpeechState) {
        while controller.state() != expected {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_speak_completes_and_returns_to_idle() {
        let mut f = fixture(scenario_voices());

        let result = f.controller.speak("Привет! Рад вас видеть.", SpeechOptions::default()).await;
        assert!(result.is_ok());
        assert_eq!(f.controller.state(), SpeechState::Idle);
        assert!(!f.controller.is_speaking());
        assert_eq!(f.controller.selected_voice().unwrap().name(), "Google ru-RU");

        let spoken = f.engine.spoken();
        assert_eq!(spoken.len(), 1);
        assert_eq!(spoken[0].lang, "ru-RU");
        assert_eq!(spoken[0].prosody.rate, 0.9);
        assert_eq!(spoken[0].prosody.pitch, 1.1);
        assert_eq!(spoken[0].prosody.volume, 0.8);

        let events = drain(&mut f.events);
        assert!(matches!(events[0], SpeechEvent::VoiceSelected { .. }));
        assert!(matches!(events[1], SpeechEvent::Started { .. }));
        assert!(matches!(events[2], SpeechEvent::Completed { .. }));
        assert_eq!(events.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_masculine_voice_lowers_default_pitch() {
        let f = fixture(SimulatedEngineConfig::with_voices(vec![Voice::new(
            "Yandex Filipp",
            "ru-RU",
        )]));

        f.controller.speak("Привет", SpeechOptions::default()).await.unwrap();
        assert_eq!(f.engine.spoken()[0].prosody.pitch, 0.9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_options_override_defaults() {
        let f = fixture(scenario_voices());
        let options = SpeechOptions::default().with_volume(0.3).with_rate(1.2);

        f.controller.speak("Привет", options).await.unwrap();
        let prosody = f.engine.spoken()[0].prosody;
        assert_eq!(prosody.volume, 0.3);
        assert_eq!(prosody.rate, 1.2);
    }

    #[tokio::test]
    async fn test_unsupported_host_rejects() {
        let f = fixture(SimulatedEngineConfig::unsupported());

        let result = f.controller.speak("hello", SpeechOptions::default()).await;
        assert_eq!(result, Err(SpeechError::Unsupported));
        assert_eq!(f.controller.state(), SpeechState::Idle);
        assert!(f.engine.spoken().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_requests_rejected() {
        let f = fixture(scenario_voices());

        let empty = f.controller.speak("   ", SpeechOptions::default()).await;
        assert!(matches!(empty, Err(SpeechError::InvalidRequest(_))));

        let loud = f
            .controller
            .speak("hello", SpeechOptions::default().with_volume(3.0))
            .await;
        assert!(matches!(loud, Err(SpeechError::InvalidRequest(_))));
        assert!(f.engine.spoken().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_speak_supersedes_first() {
        let mut f = fixture(scenario_voices());

        let first = {
            let controller = f.controller.clone();
            tokio::spawn(async move { controller.speak("A", SpeechOptions::default()).await })
        };
        wait_speaking(&f.controller).await;

        let second = {
            let controller = f.controller.clone();
            tokio::spawn(async move { controller.speak("B", SpeechOptions::default()).await })
        };

        assert_eq!(first.await.unwrap(), Err(SpeechError::Cancelled));
        assert_eq!(second.await.unwrap(), Ok(()));
        assert_eq!(f.controller.state(), SpeechState::Idle);

        let terminal: Vec<SpeechEvent> = drain(&mut f.events)
            .into_iter()
            .filter(SpeechEvent::is_terminal)
            .collect();
        assert_eq!(terminal.len(), 2);
        assert!(matches!(terminal[0], SpeechEvent::Cancelled { .. }));
        assert!(matches!(terminal[1], SpeechEvent::Completed { .. }));
    }

    #[tokio::test]
    async fn test_stop_when_idle_is_noop() {
        let mut f = fixture(scenario_voices());

        assert!(!f.controller.stop());
        assert_eq!(f.controller.state(), SpeechState::Idle);
        assert!(drain(&mut f.events).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_settles_speaking_as_cancelled() {
        let f = fixture(scenario_voices());

        let pending = {
            let controller = f.controller.clone();
            tokio::spawn(async move {
                controller
                    .speak("Я цифровой аватар, созданный для общения.", SpeechOptions::default())
                    .await
            })
        };
        wait_speaking(&f.controller).await;
        assert!(f.engine.is_speaking());

        assert!(f.controller.stop());
        assert!(!f.controller.is_speaking());
        assert_eq!(f.controller.state(), SpeechState::Idle);

        assert_eq!(pending.await.unwrap(), Err(SpeechError::Cancelled));
        assert!(!f.engine.is_speaking());
    }

    #[tokio::test(start_paused = true)]
    async fn test_speak_waits_for_voices() {
        let config = SimulatedEngineConfig {
            voices: vec![Voice::new("Google русский", "ru-RU")],
            voices_delay_ms: 300,
            ..Default::default()
        };
        let f = fixture(config);
        f.engine.start();
        tokio::spawn(f.catalog.clone().run());

        let pending = {
            let controller = f.controller.clone();
            tokio::spawn(async move { controller.speak("Привет", SpeechOptions::default()).await })
        };
        wait_state(&f.controller, SpeechState::AwaitingVoices).await;
        assert!(!f.controller.is_speaking());

        assert_eq!(pending.await.unwrap(), Ok(()));
        assert_eq!(f.controller.selected_voice().unwrap().name(), "Google русский");
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_speak_supersedes_first_while_awaiting_voices() {
        let config = SimulatedEngineConfig {
            voices: vec![Voice::new("Google русский", "ru-RU")],
            voices_delay_ms: 300,
            ..Default::default()
        };
        let mut f = fixture(config);
        f.engine.start();
        tokio::spawn(f.catalog.clone().run());

        let first = {
            let controller = f.controller.clone();
            tokio::spawn(async move { controller.speak("A", SpeechOptions::default()).await })
        };
        wait_state(&f.controller, SpeechState::AwaitingVoices).await;

        let second = {
            let controller = f.controller.clone();
            tokio::spawn(async move { controller.speak("B", SpeechOptions::default()).await })
        };

        // 第一个调用在音色到达前就已结束
        assert_eq!(first.await.unwrap(), Err(SpeechError::Cancelled));
        assert!(!f.catalog.is_ready());
        assert_eq!(f.controller.state(), SpeechState::AwaitingVoices);

        assert_eq!(second.await.unwrap(), Ok(()));
        let spoken = f.engine.spoken();
        assert_eq!(spoken.len(), 1);
        assert_eq!(spoken[0].text, "B");

        let terminal: Vec<SpeechEvent> = drain(&mut f.events)
            .into_iter()
            .filter(SpeechEvent::is_terminal)
            .collect();
        assert_eq!(terminal.len(), 2);
        assert!(matches!(terminal[0], SpeechEvent::Cancelled { .. }));
        assert!(matches!(terminal[1], SpeechEvent::Completed { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_host_never_settles() {
        let f = fixture(SimulatedEngineConfig::default());
        tokio::spawn(f.catalog.clone().run());

        let waited = tokio::time::timeout(
            Duration::from_secs(5),
            f.controller.speak("hello", SpeechOptions::default()),
        )
        .await;
        assert!(waited.is_err());
        // 被丢弃的调用不会残留登记
        assert_eq!(f.controller.state(), SpeechState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_while_awaiting_voices() {
        let f = fixture(SimulatedEngineConfig::default());

        let pending = {
            let controller = f.controller.clone();
            tokio::spawn(async move { controller.speak("hello", SpeechOptions::default()).await })
        };
        wait_state(&f.controller, SpeechState::AwaitingVoices).await;

        assert!(f.controller.stop());
        assert_eq!(f.controller.state(), SpeechState::Idle);
        assert_eq!(pending.await.unwrap(), Err(SpeechError::Cancelled));
        assert!(f.engine.spoken().is_empty());
    }

    #[tokio::test]
    async fn test_synthesis_failure_surfaces() {
        let config = SimulatedEngineConfig {
            fail_on: Some("boom".to_string()),
            ..scenario_voices()
        };
        let mut f = fixture(config);

        let result = f.controller.speak("boom", SpeechOptions::default()).await;
        assert!(matches!(result, Err(SpeechError::Synthesis(_))));
        assert!(!result.unwrap_err().is_cancellation());
        assert_eq!(f.controller.state(), SpeechState::Idle);

        let events = drain(&mut f.events);
        assert!(matches!(events.last(), Some(SpeechEvent::Failed { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_override() {
        let f = fixture(scenario_voices());

        assert!(!f.controller.select_by_name("Microsoft"));
        assert!(f.controller.selected_voice().is_none());

        assert!(f.controller.select_by_name("Microsoft David"));
        f.controller.speak("Hello", SpeechOptions::default()).await.unwrap();

        // 自动选择不覆盖手动选择
        let spoken = f.engine.spoken();
        assert_eq!(spoken[0].voice.as_ref().unwrap().name(), "Microsoft David");
        assert_eq!(spoken[0].lang, "en-US");
        assert_eq!(spoken[0].prosody.pitch, 0.9);

        assert!(f.controller.select_by_predicate(|v| v.speaks("ru")));
        assert!(!f.controller.select_by_predicate(|v| v.speaks("de")));
        assert_eq!(f.controller.selected_voice().unwrap().name(), "Google ru-RU");
    }
}
