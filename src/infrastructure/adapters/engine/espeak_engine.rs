//! espeak-ng Speech Engine - 基于 espeak-ng 命令行的宿主引擎
//!
//! 音色列表来自 `espeak-ng --voices`，启动后异步加载并发出"音色变化"通知；
//! 朗读时启动子进程，cancel_all 时终止子进程。
//!
//! 参数映射:
//! - rate 1.0 对应 `words_per_minute`（-s，80 - 450）
//! - pitch 0.0 - 2.0 映射到 0 - 99（-p，默认 50）
//! - volume 0.0 - 1.0 映射到 0 - 100（-a）

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::process::Command;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::InFlight;
use crate::application::ports::{EngineError, SpeechEnginePort, Utterance};
use crate::domain::voice::Voice;

/// espeak-ng 引擎配置
#[derive(Debug, Clone)]
pub struct EspeakEngineConfig {
    /// 可执行文件名或路径
    pub binary: String,
    /// 语速 1.0 时每分钟单词数
    pub words_per_minute: u32,
}

impl Default for EspeakEngineConfig {
    fn default() -> Self {
        Self {
            binary: "espeak-ng".to_string(),
            words_per_minute: 175,
        }
    }
}

/// espeak-ng 引擎
pub struct EspeakEngine {
    config: EspeakEngineConfig,
    /// 未找到可执行文件时为 None，引擎视为不支持合成
    binary: Option<PathBuf>,
    voices: RwLock<Vec<Voice>>,
    changes: broadcast::Sender<()>,
    interrupt: Mutex<CancellationToken>,
    in_flight: AtomicUsize,
}

impl EspeakEngine {
    pub fn new(config: EspeakEngineConfig) -> Self {
        let binary = find_binary(&config.binary);
        match &binary {
            Some(path) => tracing::info!(bin = ?path, "Detected espeak-ng binary"),
            None => tracing::warn!(bin = %config.binary, "espeak-ng binary not found"),
        }
        let (changes, _) = broadcast::channel(16);

        Self {
            config,
            binary,
            voices: RwLock::new(Vec::new()),
            changes,
            interrupt: Mutex::new(CancellationToken::new()),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// 后台加载音色列表；不支持合成时返回 None
    pub fn start(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let binary = self.binary.clone()?;
        let engine = Arc::clone(self);
        Some(tokio::spawn(async move {
            match list_espeak_voices(&binary).await {
                Ok(voices) => {
                    tracing::info!(count = voices.len(), "espeak-ng voices loaded");
                    *engine.voices.write().unwrap_or_else(PoisonError::into_inner) = voices;
                    let _ = engine.changes.send(());
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to list espeak-ng voices");
                }
            }
        }))
    }

    fn command_args(&self, utterance: &Utterance) -> Vec<String> {
        let voice = match &utterance.voice {
            Some(voice) => voice.lang().to_string(),
            None => primary_subtag(&utterance.lang),
        };
        let prosody = utterance.prosody;
        let speed = (self.config.words_per_minute as f32 * prosody.rate)
            .round()
            .clamp(80.0, 450.0) as u32;
        let pitch = (prosody.pitch * 50.0).round().clamp(0.0, 99.0) as u32;
        let amplitude = (prosody.volume * 100.0).round().clamp(0.0, 100.0) as u32;

        vec![
            "-v".to_string(),
            voice,
            "-s".to_string(),
            speed.to_string(),
            "-p".to_string(),
            pitch.to_string(),
            "-a".to_string(),
            amplitude.to_string(),
            "--".to_string(),
            utterance.text.clone(),
        ]
    }
}

#[async_trait]
impl SpeechEnginePort for EspeakEngine {
    fn is_supported(&self) -> bool {
        self.binary.is_some()
    }

    fn list_voices(&self) -> Vec<Voice> {
        self.voices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn subscribe_voices_changed(&self) -> Option<broadcast::Receiver<()>> {
        Some(self.changes.subscribe())
    }

    async fn speak(&self, utterance: Utterance) -> Result<(), EngineError> {
        let binary = self.binary.as_ref().ok_or(EngineError::Unsupported)?;
        let interrupt = self
            .interrupt
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let args = self.command_args(&utterance);

        tracing::debug!(args = ?&args[..8], text_len = utterance.text.len(), "Spawning espeak-ng");

        let mut child = Command::new(binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EngineError::ProcessError(e.to_string()))?;

        let in_flight = InFlight::enter(&self.in_flight);
        let status = tokio::select! {
            _ = interrupt.cancelled() => None,
            status = child.wait() => Some(status),
        };
        drop(in_flight);

        match status {
            None => {
                if let Err(e) = child.kill().await {
                    tracing::warn!(error = %e, "Failed to kill espeak-ng");
                }
                Err(EngineError::Interrupted)
            }
            Some(Ok(status)) if status.success() => Ok(()),
            Some(Ok(status)) => Err(EngineError::SynthesisFailed(format!(
                "espeak-ng exited with {}",
                status
            ))),
            Some(Err(e)) => Err(EngineError::ProcessError(e.to_string())),
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

async fn list_espeak_voices(binary: &Path) -> Result<Vec<Voice>, EngineError> {
    let output = Command::new(binary)
        .arg("--voices")
        .output()
        .await
        .map_err(|e| EngineError::ProcessError(e.to_string()))?;
    if !output.status.success() {
        return Err(EngineError::ProcessError(format!(
            "espeak-ng --voices exited with {}",
            output.status
        )));
    }
    Ok(parse_voices(&String::from_utf8_lossy(&output.stdout)))
}

/// 解析 `espeak-ng --voices` 输出
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  ru              --/M      Russian            zle/ru
/// ```
pub fn parse_voices(output: &str) -> Vec<Voice> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let mut columns = line.split_whitespace();
            let _priority = columns.next()?;
            let language = columns.next()?;
            let gender = columns.next()?;
            let name = columns.next()?;
            let name = match gender.rsplit('/').next() {
                Some("M") => format!("espeak-ng {} male", name),
                Some("F") => format!("espeak-ng {} female", name),
                _ => format!("espeak-ng {}", name),
            };
            Some(Voice::new(name, language))
        })
        .collect()
}

/// `ru-RU` -> `ru`
fn primary_subtag(tag: &str) -> String {
    tag.split(['-', '_']).next().unwrap_or(tag).to_lowercase()
}

fn find_binary(bin: &str) -> Option<PathBuf> {
    if bin.contains(std::path::MAIN_SEPARATOR) {
        let path = PathBuf::from(bin);
        return path.exists().then_some(path);
    }
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(bin))
        .find(|candidate| candidate.exists())
}
