//! Domain Layer - 领域层
//!
//! 包含三个限界上下文:
//! - Voice Context: 音色与选择规则
//! - Speech Context: 语音会话与韵律
//! - Avatar Context: 头像动画与问答

pub mod avatar;
pub mod speech;
pub mod voice;
