//! Voice Context - 音色限界上下文
//!
//! 职责:
//! - 宿主音色的值对象
//! - 基于名称的性别启发式
//! - 按优先级规则选择音色

pub mod markers;
mod selector;
mod value_objects;

pub use markers::reads_as_masculine;
pub use selector::{SelectionPolicy, VoiceRule, VoiceSelector};
pub use value_objects::Voice;
