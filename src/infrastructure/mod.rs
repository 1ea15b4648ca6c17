//! Infrastructure Layer - 基础设施层
//!
//! 提供所有端口的具体实现

pub mod adapters;
pub mod events;
pub mod widget;

pub use adapters::{EspeakEngine, SimulatedSpeechEngine, TracingAnimator};
pub use events::{EventPublisher, SpeechEvent};
pub use widget::{AskOutcome, AvatarWidget};
