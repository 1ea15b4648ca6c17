//! Speech Context - 韵律参数

use serde::{Deserialize, Serialize};

/// 调用方提供的可选覆盖值
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeechOptions {
    pub rate: Option<f32>,
    pub pitch: Option<f32>,
    pub volume: Option<f32>,
}

impl SpeechOptions {
    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = Some(rate);
        self
    }

    pub fn with_pitch(mut self, pitch: f32) -> Self {
        self.pitch = Some(pitch);
        self
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = Some(volume);
        self
    }

    /// 只校验调用方给出的值
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(rate) = self.rate {
            check_rate(rate)?;
        }
        if let Some(pitch) = self.pitch {
            check_pitch(pitch)?;
        }
        if let Some(volume) = self.volume {
            check_volume(volume)?;
        }
        Ok(())
    }
}

/// 默认韵律
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProsodyDefaults {
    pub rate: f32,
    pub volume: f32,
    /// 选中音色按男声处理时的音调
    pub masculine_pitch: f32,
    /// 其余情况（含未选中音色）的音调
    pub neutral_pitch: f32,
}

impl Default for ProsodyDefaults {
    fn default() -> Self {
        Self {
            rate: 0.9,
            volume: 0.8,
            masculine_pitch: 0.9,
            neutral_pitch: 1.1,
        }
    }
}

/// 最终交给宿主的韵律
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prosody {
    /// 语速 (0.1 - 10.0)
    pub rate: f32,
    /// 音调 (0.0 - 2.0)
    pub pitch: f32,
    /// 音量 (0.0 - 1.0)
    pub volume: f32,
}

impl Prosody {
    pub fn resolve(options: &SpeechOptions, defaults: &ProsodyDefaults, masculine: bool) -> Self {
        let default_pitch = if masculine {
            defaults.masculine_pitch
        } else {
            defaults.neutral_pitch
        };
        Self {
            rate: options.rate.unwrap_or(defaults.rate),
            pitch: options.pitch.unwrap_or(default_pitch),
            volume: options.volume.unwrap_or(defaults.volume),
        }
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        check_rate(self.rate)?;
        check_pitch(self.pitch)?;
        check_volume(self.volume)
    }
}

fn check_rate(rate: f32) -> Result<(), &'static str> {
    if !(0.1..=10.0).contains(&rate) {
        return Err("rate must be between 0.1 and 10.0");
    }
    Ok(())
}

fn check_pitch(pitch: f32) -> Result<(), &'static str> {
    if !(0.0..=2.0).contains(&pitch) {
        return Err("pitch must be between 0.0 and 2.0");
    }
    Ok(())
}

fn check_volume(volume: f32) -> Result<(), &'static str> {
    if !(0.0..=1.0).contains(&volume) {
        return Err("volume must be between 0.0 and 1.0");
    }
    Ok(())
}
