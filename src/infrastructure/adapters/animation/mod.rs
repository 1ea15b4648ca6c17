//! Animation Adapter - 动画执行实现

mod tracing_animator;

pub use tracing_animator::TracingAnimator;
