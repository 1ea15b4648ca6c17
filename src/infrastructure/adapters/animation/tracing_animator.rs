//! Tracing Animator - 把动画请求写入日志
//!
//! 控制台环境没有渲染层，动画只以结构化日志的形式输出

use crate::application::ports::AnimatorPort;
use crate::domain::avatar::{Animation, AnimationTarget};

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAnimator;

impl TracingAnimator {
    pub fn new() -> Self {
        Self
    }
}

impl AnimatorPort for TracingAnimator {
    fn animate(&self, target: &AnimationTarget, animation: &Animation) {
        let to = animation.keyframes.last().map(|k| k.value);
        tracing::debug!(
            target_kind = ?target,
            property = ?animation.property,
            from = ?animation.from,
            to = ?to,
            duration_ms = animation.duration_ms,
            looping = animation.looping,
            "Animate"
        );
    }

    fn stop(&self, target: &AnimationTarget) {
        tracing::debug!(target_kind = ?target, "Stop animation");
    }
}
