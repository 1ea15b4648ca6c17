//! Avatar Voice - 数字头像语音播报
//!
//! 架构设计: DDD + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Voice Context: 音色与选择策略
//! - Speech Context: 韵律参数、会话状态与错误
//! - Avatar Context: 问答条目与动画描述
//!
//! 应用层 (application/):
//! - Ports: 端口定义（SpeechEngine, Animator）
//! - Services: VoiceCatalog 音色目录, SpeechController 语音控制器
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: 模拟引擎、espeak-ng 引擎、日志动画
//! - Events: 语音事件发布
//! - Widget: 头像问答组件

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
