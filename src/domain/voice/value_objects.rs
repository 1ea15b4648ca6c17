//! Voice Context - Value Objects

use serde::{Deserialize, Serialize};

/// 宿主提供的合成音色
///
/// 不变量:
/// - 由宿主持有，本系统只读、只过滤
/// - name 不保证唯一，也不保证跨平台稳定
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Voice {
    name: String,
    lang: String,
}

impl Voice {
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 语言标签，如 `ru-RU`
    pub fn lang(&self) -> &str {
        &self.lang
    }

    /// 语言标签是否指示给定语言
    ///
    /// 以小写或大写形式做子串匹配：`ru` 同时匹配 `ru-RU` 与 `RU`
    pub fn speaks(&self, language: &str) -> bool {
        self.lang.contains(&language.to_lowercase()) || self.lang.contains(&language.to_uppercase())
    }

    /// 名称（忽略大小写）是否包含任一标记
    pub fn name_contains_any(&self, markers: &[&str]) -> bool {
        let name = self.name.to_lowercase();
        markers.iter().any(|marker| name.contains(marker))
    }
}

impl std::fmt::Display for Voice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.lang)
    }
}
