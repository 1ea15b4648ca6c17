//! Question Button - 问题按钮

use crate::application::ports::AnimatorPort;
use crate::domain::avatar::{Animation, AnimationTarget, Question};

const ENABLED_OPACITY: f32 = 1.0;
const DISABLED_OPACITY: f32 = 0.6;

#[derive(Debug, Clone)]
pub struct QuestionButton {
    question: Question,
    enabled: bool,
}

impl QuestionButton {
    /// 创建按钮并播放淡入
    pub fn new(question: Question, animator: &dyn AnimatorPort, fade_in_ms: u64) -> Self {
        let button = Self {
            question,
            enabled: true,
        };
        animator.animate(&button.target(), &Animation::fade_in(fade_in_ms));
        button
    }

    pub fn id(&self) -> &str {
        &self.question.id
    }

    pub fn label(&self) -> &str {
        &self.question.text
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn target(&self) -> AnimationTarget {
        AnimationTarget::QuestionButton(self.question.id.clone())
    }

    /// 点击；禁用时返回 None 且没有反馈动画
    pub fn click(&self, animator: &dyn AnimatorPort) -> Option<&Question> {
        if !self.enabled {
            return None;
        }
        animator.animate(&self.target(), &Animation::button_click());
        Some(&self.question)
    }

    pub fn enable(&mut self, animator: &dyn AnimatorPort) {
        self.enabled = true;
        animator.animate(&self.target(), &Animation::opacity(ENABLED_OPACITY));
    }

    pub fn disable(&mut self, animator: &dyn AnimatorPort) {
        self.enabled = false;
        animator.animate(&self.target(), &Animation::opacity(DISABLED_OPACITY));
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn opacity(&self) -> f32 {
        if self.enabled {
            ENABLED_OPACITY
        } else {
            DISABLED_OPACITY
        }
    }
}
