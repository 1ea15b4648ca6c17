//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（SpeechEngine、Animator）
//! - services: 音色目录与语音控制器
//! - error: 应用层错误定义

pub mod error;
pub mod ports;
pub mod services;

pub use error::ApplicationError;

pub use ports::{AnimatorPort, EngineError, SpeechEnginePort, Utterance};

pub use services::{SpeechController, SpeechControllerConfig, VoiceCatalog, DEFAULT_POLL_INTERVAL};
