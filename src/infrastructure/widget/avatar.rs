//! Avatar - 头像动画状态

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::application::ports::AnimatorPort;
use crate::config::AvatarConfig;
use crate::domain::avatar::{Animation, AnimationTarget};

const FADE_OUT_MS: u64 = 500;

/// 头像
///
/// 创建时淡入；说话时循环缩放，结束后回到静止缩放
pub struct Avatar {
    animator: Arc<dyn AnimatorPort>,
    config: AvatarConfig,
    image_url: RwLock<String>,
    talking: AtomicBool,
    visible: AtomicBool,
}

impl Avatar {
    pub fn new(animator: Arc<dyn AnimatorPort>, config: AvatarConfig) -> Self {
        animator.animate(&AnimationTarget::Avatar, &Animation::fade_in(config.fade_in_ms));
        Self {
            animator,
            image_url: RwLock::new(config.image_url.clone()),
            config,
            talking: AtomicBool::new(false),
            visible: AtomicBool::new(true),
        }
    }

    pub fn start_talking(&self) {
        self.stop_talking();
        self.animator.animate(
            &AnimationTarget::Avatar,
            &Animation::talking(self.config.talking_scale, self.config.talking_duration_ms),
        );
        self.talking.store(true, Ordering::SeqCst);
    }

    pub fn stop_talking(&self) {
        self.talking.store(false, Ordering::SeqCst);
        self.animator.stop(&AnimationTarget::Avatar);
        self.animator
            .animate(&AnimationTarget::Avatar, &Animation::settle(self.config.idle_scale));
    }

    pub fn is_talking(&self) -> bool {
        self.talking.load(Ordering::SeqCst)
    }

    pub fn show(&self) {
        self.visible.store(true, Ordering::SeqCst);
        self.animator
            .animate(&AnimationTarget::Avatar, &Animation::fade_in(self.config.fade_in_ms));
    }

    pub fn hide(&self) {
        self.animator
            .animate(&AnimationTarget::Avatar, &Animation::fade_out(FADE_OUT_MS));
        self.visible.store(false, Ordering::SeqCst);
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    pub fn image_url(&self) -> String {
        self.image_url
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn update_image(&self, url: impl Into<String>) {
        *self.image_url.write().unwrap_or_else(PoisonError::into_inner) = url.into();
    }
}
