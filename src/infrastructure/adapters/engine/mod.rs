//! Engine Adapter - 宿主语音合成引擎实现

mod espeak_engine;
mod simulated_engine;

use std::sync::atomic::{AtomicUsize, Ordering};

pub use espeak_engine::{parse_voices, EspeakEngine, EspeakEngineConfig};
pub use simulated_engine::{SimulatedEngineConfig, SimulatedSpeechEngine};

/// 在途计数，future 被丢弃时同样递减
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
