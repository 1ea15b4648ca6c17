//! Avatar Context - 动画描述
//!
//! 动画由外部服务播放，这里只描述"把某属性在多长时间内变到目标值"

use serde::{Deserialize, Serialize};

/// 动画作用对象
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum AnimationTarget {
    Avatar,
    QuestionButton(String),
    QuestionsPanel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimatedProperty {
    Scale,
    Opacity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    EaseInOutSine,
    EaseOutQuad,
    EaseInQuad,
}

/// 关键帧：在 duration_ms 内变到 value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub value: f32,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub property: AnimatedProperty,
    /// 起始值，None 表示从当前值开始
    pub from: Option<f32>,
    pub keyframes: Vec<Keyframe>,
    pub duration_ms: u64,
    pub easing: Easing,
    pub looping: bool,
    /// 往返播放
    pub alternate: bool,
}

impl Animation {
    fn to(property: AnimatedProperty, value: f32, duration_ms: u64, easing: Easing) -> Self {
        Self {
            property,
            from: None,
            keyframes: vec![Keyframe { value, duration_ms }],
            duration_ms,
            easing,
            looping: false,
            alternate: false,
        }
    }

    /// 说话时的循环缩放
    pub fn talking(peak_scale: f32, duration_ms: u64) -> Self {
        let rise = 1.0 + (peak_scale - 1.0) * 0.4;
        Self {
            property: AnimatedProperty::Scale,
            from: None,
            keyframes: vec![
                Keyframe {
                    value: rise,
                    duration_ms: 200,
                },
                Keyframe {
                    value: peak_scale,
                    duration_ms: 300,
                },
            ],
            duration_ms,
            easing: Easing::EaseInOutSine,
            looping: true,
            alternate: true,
        }
    }

    /// 停止说话后回到静止缩放
    pub fn settle(idle_scale: f32) -> Self {
        Self::to(AnimatedProperty::Scale, idle_scale, 300, Easing::EaseOutQuad)
    }

    /// 按钮点击反馈
    pub fn button_click() -> Self {
        let mut animation = Self::to(AnimatedProperty::Scale, 0.95, 100, Easing::EaseInOutSine);
        animation.alternate = true;
        animation
    }

    pub fn fade_in(duration_ms: u64) -> Self {
        let mut animation = Self::to(AnimatedProperty::Opacity, 1.0, duration_ms, Easing::EaseOutQuad);
        animation.from = Some(0.0);
        animation
    }

    pub fn fade_out(duration_ms: u64) -> Self {
        let mut animation = Self::to(AnimatedProperty::Opacity, 0.0, duration_ms, Easing::EaseInQuad);
        animation.from = Some(1.0);
        animation
    }

    /// 立即设置透明度
    pub fn opacity(value: f32) -> Self {
        Self::to(AnimatedProperty::Opacity, value, 0, Easing::EaseOutQuad)
    }
}
