//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::time::Duration;

use crate::application::services::SpeechControllerConfig;
use crate::domain::avatar::{default_questions, Question};
use crate::domain::speech::ProsodyDefaults;
use crate::domain::voice::{SelectionPolicy, Voice};
use crate::infrastructure::adapters::{EspeakEngineConfig, SimulatedEngineConfig};

/// 应用主配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// 语音配置
    #[serde(default)]
    pub speech: SpeechConfig,

    /// 宿主引擎配置
    #[serde(default)]
    pub engine: EngineConfig,

    /// 头像配置
    #[serde(default)]
    pub avatar: AvatarConfig,

    /// 问答列表
    #[serde(default = "default_questions")]
    pub questions: Vec<Question>,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            speech: SpeechConfig::default(),
            engine: EngineConfig::default(),
            avatar: AvatarConfig::default(),
            questions: default_questions(),
            log: LogConfig::default(),
        }
    }
}

/// 语音配置
#[derive(Debug, Clone, Deserialize)]
pub struct SpeechConfig {
    /// 目标语言
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// 目标语言没有合适音色时的回退语言
    #[serde(default = "default_fallback_language")]
    pub fallback_language: String,

    /// 未选中音色时的语言标签
    #[serde(default = "default_language_tag")]
    pub default_language_tag: String,

    #[serde(default = "default_rate")]
    pub default_rate: f32,

    #[serde(default = "default_volume")]
    pub default_volume: f32,

    /// 男声音色的默认音调
    #[serde(default = "default_masculine_pitch")]
    pub masculine_pitch: f32,

    /// 其余音色的默认音调
    #[serde(default = "default_neutral_pitch")]
    pub neutral_pitch: f32,

    /// 就绪前轮询宿主音色列表的间隔（毫秒）
    #[serde(default = "default_voice_poll_interval_ms")]
    pub voice_poll_interval_ms: u64,
}

fn default_target_language() -> String {
    "ru".to_string()
}

fn default_fallback_language() -> String {
    "en".to_string()
}

fn default_language_tag() -> String {
    "ru-RU".to_string()
}

fn default_rate() -> f32 {
    0.9
}

fn default_volume() -> f32 {
    0.8
}

fn default_masculine_pitch() -> f32 {
    0.9
}

fn default_neutral_pitch() -> f32 {
    1.1
}

fn default_voice_poll_interval_ms() -> u64 {
    100
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            target_language: default_target_language(),
            fallback_language: default_fallback_language(),
            default_language_tag: default_language_tag(),
            default_rate: default_rate(),
            default_volume: default_volume(),
            masculine_pitch: default_masculine_pitch(),
            neutral_pitch: default_neutral_pitch(),
            voice_poll_interval_ms: default_voice_poll_interval_ms(),
        }
    }
}

impl SpeechConfig {
    pub fn prosody_defaults(&self) -> ProsodyDefaults {
        ProsodyDefaults {
            rate: self.default_rate,
            volume: self.default_volume,
            masculine_pitch: self.masculine_pitch,
            neutral_pitch: self.neutral_pitch,
        }
    }

    pub fn controller_config(&self) -> SpeechControllerConfig {
        SpeechControllerConfig {
            prosody: self.prosody_defaults(),
            default_lang: self.default_language_tag.clone(),
        }
    }

    pub fn selection_policy(&self) -> SelectionPolicy {
        SelectionPolicy::for_languages(
            self.target_language.clone(),
            self.fallback_language.clone(),
        )
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.voice_poll_interval_ms)
    }
}

/// 宿主引擎类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    #[default]
    Simulated,
    Espeak,
}

impl EngineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simulated => "simulated",
            Self::Espeak => "espeak",
        }
    }
}

/// 宿主引擎配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub kind: EngineKind,

    #[serde(default)]
    pub simulated: SimulatedConfig,

    #[serde(default)]
    pub espeak: EspeakConfig,
}

/// 模拟引擎配置
#[derive(Debug, Clone, Deserialize)]
pub struct SimulatedConfig {
    /// 是否模拟具备合成能力的宿主
    #[serde(default = "default_supported")]
    pub supported: bool,

    /// 宿主提供的音色
    #[serde(default = "default_simulated_voices")]
    pub voices: Vec<Voice>,

    /// 音色延迟加载时间（毫秒）
    #[serde(default = "default_voices_delay_ms")]
    pub voices_delay_ms: u64,

    /// 加载音色后是否发出通知
    #[serde(default = "default_supported")]
    pub notify_voices_changed: bool,

    #[serde(default = "default_simulated_wpm")]
    pub words_per_minute: u32,
}

fn default_supported() -> bool {
    true
}

fn default_simulated_voices() -> Vec<Voice> {
    vec![
        Voice::new("Microsoft Irina - Russian (Russia)", "ru-RU"),
        Voice::new("Yandex Filipp", "ru-RU"),
        Voice::new("Microsoft Zira - English (United States)", "en-US"),
        Voice::new("Microsoft David - English (United States)", "en-US"),
    ]
}

fn default_voices_delay_ms() -> u64 {
    300
}

fn default_simulated_wpm() -> u32 {
    150
}

impl Default for SimulatedConfig {
    fn default() -> Self {
        Self {
            supported: default_supported(),
            voices: default_simulated_voices(),
            voices_delay_ms: default_voices_delay_ms(),
            notify_voices_changed: default_supported(),
            words_per_minute: default_simulated_wpm(),
        }
    }
}

impl SimulatedConfig {
    pub fn engine_config(&self) -> SimulatedEngineConfig {
        SimulatedEngineConfig {
            supported: self.supported,
            voices: self.voices.clone(),
            voices_delay_ms: self.voices_delay_ms,
            notify_voices_changed: self.notify_voices_changed,
            words_per_minute: self.words_per_minute,
            fail_on: None,
        }
    }
}

/// espeak-ng 引擎配置
#[derive(Debug, Clone, Deserialize)]
pub struct EspeakConfig {
    /// 可执行文件名或路径
    #[serde(default = "default_espeak_binary")]
    pub binary: String,

    #[serde(default = "default_espeak_wpm")]
    pub words_per_minute: u32,
}

fn default_espeak_binary() -> String {
    "espeak-ng".to_string()
}

fn default_espeak_wpm() -> u32 {
    175
}

impl Default for EspeakConfig {
    fn default() -> Self {
        Self {
            binary: default_espeak_binary(),
            words_per_minute: default_espeak_wpm(),
        }
    }
}

impl EspeakConfig {
    pub fn engine_config(&self) -> EspeakEngineConfig {
        EspeakEngineConfig {
            binary: self.binary.clone(),
            words_per_minute: self.words_per_minute,
        }
    }
}

/// 头像配置
#[derive(Debug, Clone, Deserialize)]
pub struct AvatarConfig {
    #[serde(default = "default_image_url")]
    pub image_url: String,

    /// 基础缩放
    #[serde(default = "default_scale")]
    pub scale: f32,

    /// 说话动画的峰值缩放
    #[serde(default = "default_talking_scale")]
    pub talking_scale: f32,

    /// 静止时的缩放
    #[serde(default = "default_scale")]
    pub idle_scale: f32,

    /// 说话动画一个周期的时长（毫秒）
    #[serde(default = "default_talking_duration_ms")]
    pub talking_duration_ms: u64,

    /// 头像淡入时长（毫秒）
    #[serde(default = "default_fade_in_ms")]
    pub fade_in_ms: u64,

    /// 问题按钮淡入时长（毫秒）
    #[serde(default = "default_button_fade_in_ms")]
    pub button_fade_in_ms: u64,
}

fn default_image_url() -> String {
    "https://placehold.co/300x300/4a00e0/FFFFFF?text=Аватар".to_string()
}

fn default_scale() -> f32 {
    1.0
}

fn default_talking_scale() -> f32 {
    1.05
}

fn default_talking_duration_ms() -> u64 {
    2000
}

fn default_fade_in_ms() -> u64 {
    500
}

fn default_button_fade_in_ms() -> u64 {
    800
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            image_url: default_image_url(),
            scale: default_scale(),
            talking_scale: default_talking_scale(),
            idle_scale: default_scale(),
            talking_duration_ms: default_talking_duration_ms(),
            fade_in_ms: default_fade_in_ms(),
            button_fade_in_ms: default_button_fade_in_ms(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
