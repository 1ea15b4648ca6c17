//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod animation;
pub mod engine;

pub use animation::*;
pub use engine::*;
