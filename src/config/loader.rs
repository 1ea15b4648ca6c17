//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（avatar.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;
use crate::domain::speech::Prosody;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["avatar", "avatar.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `AVATAR_`，层级分隔符 `__`）
/// 2. 配置文件（avatar.toml 或 avatar.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `AVATAR_ENGINE__KIND=espeak`
/// - `AVATAR_SPEECH__TARGET_LANGUAGE=ru`
/// - `AVATAR_SPEECH__DEFAULT_VOLUME=0.5`
/// - `AVATAR_LOG__LEVEL=debug`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 标量默认值（列表类默认值由 serde 提供）
    builder = builder
        .set_default("speech.target_language", "ru")?
        .set_default("speech.fallback_language", "en")?
        .set_default("speech.default_language_tag", "ru-RU")?
        .set_default("speech.default_rate", 0.9)?
        .set_default("speech.default_volume", 0.8)?
        .set_default("speech.masculine_pitch", 0.9)?
        .set_default("speech.neutral_pitch", 1.1)?
        .set_default("speech.voice_poll_interval_ms", 100)?
        .set_default("engine.kind", "simulated")?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量，例如 AVATAR_ENGINE__KIND=espeak
    builder = builder.add_source(
        Environment::with_prefix("AVATAR")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    let speech = &config.speech;

    if speech.target_language.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Target language cannot be empty".to_string(),
        ));
    }

    if speech.default_rate <= 0.0 || speech.default_volume <= 0.0 {
        return Err(ConfigError::ValidationError(
            "Default rate and volume must be positive".to_string(),
        ));
    }

    for pitch in [speech.masculine_pitch, speech.neutral_pitch] {
        if pitch <= 0.0 {
            return Err(ConfigError::ValidationError(
                "Default pitch must be positive".to_string(),
            ));
        }
        Prosody {
            rate: speech.default_rate,
            pitch,
            volume: speech.default_volume,
        }
        .validate()
        .map_err(|e| ConfigError::ValidationError(format!("Invalid prosody defaults: {}", e)))?;
    }

    if speech.voice_poll_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "Voice poll interval cannot be 0".to_string(),
        ));
    }

    let mut ids = HashSet::new();
    for question in &config.questions {
        if question.id.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Question id cannot be empty".to_string(),
            ));
        }
        if !ids.insert(question.id.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "Duplicate question id: {}",
                question.id
            )));
        }
        if question.answer.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "Question {} has an empty answer",
                question.id
            )));
        }
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!(
        "Languages: target={}, fallback={}, default tag={}",
        config.speech.target_language,
        config.speech.fallback_language,
        config.speech.default_language_tag
    );
    tracing::info!(
        "Prosody Defaults: rate={}, volume={}, pitch={}/{}",
        config.speech.default_rate,
        config.speech.default_volume,
        config.speech.masculine_pitch,
        config.speech.neutral_pitch
    );
    tracing::info!("Voice Poll Interval: {}ms", config.speech.voice_poll_interval_ms);
    tracing::info!("Engine: {}", config.engine.kind.as_str());
    tracing::info!(
        "Avatar: {} (scale {})",
        config.avatar.image_url,
        config.avatar.scale
    );
    tracing::info!("Questions: {}", config.questions.len());
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineKind;
    use crate::domain::avatar::Question;
    use std::io::Write;

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_empty_target_language() {
        let mut config = AppConfig::default();
        config.speech.target_language = " ".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_non_positive_prosody() {
        let mut config = AppConfig::default();
        config.speech.default_volume = 0.0;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.speech.neutral_pitch = 2.5;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_poll_interval() {
        let mut config = AppConfig::default();
        config.speech.voice_poll_interval_ms = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_bad_questions() {
        let mut config = AppConfig::default();
        config.questions.push(Question::new("greeting", "Ещё раз", "Привет"));
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.questions = vec![Question::new("empty", "?", "  ")];
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[speech]
target_language = "en"
default_volume = 0.5

[engine]
kind = "espeak"

[[questions]]
id = "hello"
text = "Hello"
answer = "Hi there!"
"#
        )
        .unwrap();

        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.speech.target_language, "en");
        assert_eq!(config.speech.default_volume, 0.5);
        assert_eq!(config.speech.default_rate, 0.9);
        assert_eq!(config.engine.kind, EngineKind::Espeak);
        assert_eq!(config.questions.len(), 1);
        assert_eq!(config.questions[0].answer, "Hi there!");
    }
}
