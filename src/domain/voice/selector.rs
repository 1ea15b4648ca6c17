//! Voice Context - 音色选择
//!
//! 按优先级依次尝试规则；每条规则按目录顺序扫描，取第一个命中。
//! 第一条有命中的规则即为结果，所有规则都落空时返回 None。

use super::markers::{FALLBACK_MASCULINE_MARKERS, FEMININE_MARKERS, MASCULINE_MARKERS};
use super::Voice;

/// 单条选择规则
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceRule {
    /// 语言匹配，且名称包含任一标记
    LanguageWithAny {
        language: String,
        markers: &'static [&'static str],
    },
    /// 语言匹配，且名称不包含任何标记
    LanguageWithout {
        language: String,
        markers: &'static [&'static str],
    },
    /// 任意音色
    Any,
}

impl VoiceRule {
    pub fn matches(&self, voice: &Voice) -> bool {
        match self {
            VoiceRule::LanguageWithAny { language, markers } => {
                voice.speaks(language) && voice.name_contains_any(markers)
            }
            VoiceRule::LanguageWithout { language, markers } => {
                voice.speaks(language) && !voice.name_contains_any(markers)
            }
            VoiceRule::Any => true,
        }
    }
}

/// 有序规则表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionPolicy {
    rules: Vec<VoiceRule>,
}

impl SelectionPolicy {
    pub fn new(rules: Vec<VoiceRule>) -> Self {
        Self { rules }
    }

    /// 默认偏好：
    /// 1. 目标语言男声
    /// 2. 目标语言非女声
    /// 3. 备选语言男声
    /// 4. 任意音色
    pub fn for_languages(target: impl Into<String>, fallback: impl Into<String>) -> Self {
        let target = target.into();
        Self::new(vec![
            VoiceRule::LanguageWithAny {
                language: target.clone(),
                markers: MASCULINE_MARKERS,
            },
            VoiceRule::LanguageWithout {
                language: target,
                markers: FEMININE_MARKERS,
            },
            VoiceRule::LanguageWithAny {
                language: fallback.into(),
                markers: FALLBACK_MASCULINE_MARKERS,
            },
            VoiceRule::Any,
        ])
    }

    pub fn rules(&self) -> &[VoiceRule] {
        &self.rules
    }
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self::for_languages("ru", "en")
    }
}

/// 音色选择器（纯函数）
#[derive(Debug, Clone, Default)]
pub struct VoiceSelector {
    policy: SelectionPolicy,
}

impl VoiceSelector {
    pub fn new(policy: SelectionPolicy) -> Self {
        Self { policy }
    }

    /// 选出最佳音色
    pub fn select<'a>(&self, voices: &'a [Voice]) -> Option<&'a Voice> {
        self.select_ranked(voices).map(|(_, voice)| voice)
    }

    /// 选出最佳音色，同时返回命中规则的序号（从 0 开始）
    pub fn select_ranked<'a>(&self, voices: &'a [Voice]) -> Option<(usize, &'a Voice)> {
        self.policy
            .rules
            .iter()
            .enumerate()
            .find_map(|(rank, rule)| {
                voices
                    .iter()
                    .find(|voice| rule.matches(voice))
                    .map(|voice| (rank, voice))
            })
    }
}
