//! Events - 语音事件推送

mod publisher;

pub use publisher::{EventPublisher, SpeechEvent};
