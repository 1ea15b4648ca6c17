//! Avatar Context - 头像与问答
//!
//! 职责:
//! - 问答条目
//! - 头像/按钮动画描述

mod animation;
mod question;

pub use animation::{AnimatedProperty, Animation, AnimationTarget, Easing, Keyframe};
pub use question::{default_questions, Question};
