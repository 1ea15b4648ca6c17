//! Application Services - 语音核心
//!
//! - VoiceCatalog: 宿主音色列表的就绪视图
//! - SpeechController: 单会话语音编排

mod speech_controller;
mod voice_catalog;

pub use speech_controller::{SpeechController, SpeechControllerConfig};
pub use voice_catalog::{VoiceCatalog, DEFAULT_POLL_INTERVAL};
