//! Avatar Widget - 问答组件
//!
//! 点击问题 -> 禁用按钮、头像开始说话 -> 朗读回答 -> 任意结算后恢复交互。
//! 取消（被打断或被新的朗读顶替）不显示错误。

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::application::error::ApplicationError;
use crate::application::ports::AnimatorPort;
use crate::application::services::SpeechController;
use crate::config::AvatarConfig;
use crate::domain::avatar::{Animation, AnimationTarget, Question};
use crate::domain::speech::{SpeechError, SpeechOptions};

use super::avatar::Avatar;
use super::question_button::QuestionButton;

pub const STATUS_WELCOME: &str = "Выберите вопрос для начала разговора";
pub const STATUS_NEXT: &str = "Выберите следующий вопрос";
pub const STATUS_ERROR: &str = "Ошибка воспроизведения речи";
pub const STATUS_ANSWERING: &str = "Отвечаю на";

/// 音量低于该值时问题面板变暗
const QUIET_VOLUME: f32 = 0.1;
const PANEL_OPACITY: f32 = 1.0;
const QUIET_PANEL_OPACITY: f32 = 0.7;

/// 一次提问的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AskOutcome {
    /// 回答已完整朗读
    Answered,
    /// 朗读被打断或被顶替
    Interrupted,
    /// 组件忙或按钮已禁用，点击被忽略
    Ignored,
}

struct WidgetState {
    buttons: Vec<QuestionButton>,
    status: String,
    busy: bool,
    volume: f32,
    panel_opacity: f32,
}

/// 头像问答组件
pub struct AvatarWidget {
    controller: Arc<SpeechController>,
    animator: Arc<dyn AnimatorPort>,
    avatar: Avatar,
    state: Mutex<WidgetState>,
}

/// 提问结束时恢复交互，future 被丢弃时同样生效
struct AskGuard<'a> {
    widget: &'a AvatarWidget,
    status: &'static str,
}

impl Drop for AskGuard<'_> {
    fn drop(&mut self) {
        self.widget.finish(self.status);
    }
}

impl AvatarWidget {
    pub fn new(
        controller: Arc<SpeechController>,
        animator: Arc<dyn AnimatorPort>,
        avatar_config: AvatarConfig,
        questions: Vec<Question>,
        volume: f32,
    ) -> Self {
        let button_fade_in_ms = avatar_config.button_fade_in_ms;
        let avatar = Avatar::new(animator.clone(), avatar_config);
        let buttons: Vec<QuestionButton> = questions
            .into_iter()
            .map(|question| QuestionButton::new(question, animator.as_ref(), button_fade_in_ms))
            .collect();

        tracing::info!(questions = buttons.len(), "Avatar widget initialized");

        let widget = Self {
            controller,
            animator,
            avatar,
            state: Mutex::new(WidgetState {
                buttons,
                status: STATUS_WELCOME.to_string(),
                busy: false,
                volume: 1.0,
                panel_opacity: PANEL_OPACITY,
            }),
        };
        widget.set_volume(volume);
        widget
    }

    /// 回答一个问题
    ///
    /// 忙时直接忽略；朗读失败时状态栏保留错误信息并返回 `SpeechFailed`
    pub async fn ask(&self, question_id: &str) -> Result<AskOutcome, ApplicationError> {
        let (question, volume) = {
            let mut state = self.lock();
            let index = state
                .buttons
                .iter()
                .position(|button| button.id() == question_id)
                .ok_or_else(|| ApplicationError::not_found("question", question_id))?;

            if state.busy {
                tracing::debug!(question_id = %question_id, "Widget busy, question ignored");
                return Ok(AskOutcome::Ignored);
            }
            let Some(question) = state.buttons[index].click(self.animator.as_ref()).cloned() else {
                return Ok(AskOutcome::Ignored);
            };

            state.busy = true;
            state.status = format!("{}: \"{}\"", STATUS_ANSWERING, question.text);
            for button in state.buttons.iter_mut() {
                button.disable(self.animator.as_ref());
            }
            (question, state.volume)
        };

        tracing::info!(question_id = %question.id, volume = volume, "Answering question");

        let mut guard = AskGuard {
            widget: self,
            status: STATUS_NEXT,
        };
        self.avatar.start_talking();

        let result = self
            .controller
            .speak(&question.answer, SpeechOptions::default().with_volume(volume))
            .await;

        match result {
            Ok(()) => Ok(AskOutcome::Answered),
            Err(SpeechError::Cancelled) => {
                tracing::info!(question_id = %question.id, "Answer interrupted");
                Ok(AskOutcome::Interrupted)
            }
            Err(e) => {
                tracing::error!(question_id = %question.id, error = %e, "Speech error");
                guard.status = STATUS_ERROR;
                drop(guard);
                Err(ApplicationError::SpeechFailed(e))
            }
        }
    }

    /// 打断当前回答（Escape）
    ///
    /// 返回是否确实打断了朗读；待结算的 ask 以 Interrupted 返回
    pub fn interrupt(&self) -> bool {
        if !self.lock().busy {
            return false;
        }
        tracing::info!(state = self.controller.state().as_str(), "Interrupting answer");
        self.controller.stop()
    }

    /// 设置音量 (0.0 - 1.0)
    pub fn set_volume(&self, volume: f32) {
        let volume = if volume.is_nan() {
            0.0
        } else {
            volume.clamp(0.0, 1.0)
        };
        let panel_opacity = if volume > QUIET_VOLUME {
            PANEL_OPACITY
        } else {
            QUIET_PANEL_OPACITY
        };

        {
            let mut state = self.lock();
            state.volume = volume;
            state.panel_opacity = panel_opacity;
        }
        self.animator.animate(
            &AnimationTarget::QuestionsPanel,
            &Animation::opacity(panel_opacity),
        );
    }

    pub fn status(&self) -> String {
        self.lock().status.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.lock().busy
    }

    pub fn volume(&self) -> f32 {
        self.lock().volume
    }

    pub fn panel_opacity(&self) -> f32 {
        self.lock().panel_opacity
    }

    pub fn buttons(&self) -> Vec<QuestionButton> {
        self.lock().buttons.clone()
    }

    pub fn avatar(&self) -> &Avatar {
        &self.avatar
    }

    pub fn controller(&self) -> &Arc<SpeechController> {
        &self.controller
    }

    fn finish(&self, status: &str) {
        self.avatar.stop_talking();
        let mut state = self.lock();
        for button in state.buttons.iter_mut() {
            button.enable(self.animator.as_ref());
        }
        state.status = status.to_string();
        state.busy = false;
    }

    fn lock(&self) -> MutexGuard<'_, WidgetState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
