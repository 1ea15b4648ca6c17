//! Speech Context - 语音会话上下文
//!
//! 职责:
//! - 韵律默认值与覆盖
//! - 会话状态
//! - 结局错误分类

mod errors;
mod prosody;
mod state;

pub use errors::SpeechError;
pub use prosody::{Prosody, ProsodyDefaults, SpeechOptions};
pub use state::{SessionId, SpeechState};
