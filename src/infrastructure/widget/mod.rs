//! Widget - 头像问答组件
//!
//! 把点击、按键、音量等 UI 事件接到语音控制器，并驱动动画端口

mod app;
mod avatar;
mod question_button;

pub use app::{AskOutcome, AvatarWidget, STATUS_ANSWERING, STATUS_ERROR, STATUS_NEXT, STATUS_WELCOME};
pub use avatar::Avatar;
pub use question_button::QuestionButton;
