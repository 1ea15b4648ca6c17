//! Animator Port - 动画播放服务抽象

use crate::domain::avatar::{Animation, AnimationTarget};

/// Animator Port
///
/// 不透明的"在给定时长内把属性变到目标值"服务
pub trait AnimatorPort: Send + Sync {
    /// 在目标上播放动画
    fn animate(&self, target: &AnimationTarget, animation: &Animation);

    /// 移除目标上所有正在播放的动画
    fn stop(&self, target: &AnimationTarget);
}
