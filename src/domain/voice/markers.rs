//! Voice Context - 名称标记
//!
//! 通过音色名称的子串推断性别。启发式依赖宿主命名，各表刻意不合并。

use super::Voice;

/// 目标语言男声标记（优先级 1）
pub const MASCULINE_MARKERS: &[&str] = &["male", "мужск", "microsoft david", "yandex"];

/// 女声标记（优先级 2 排除项）
pub const FEMININE_MARKERS: &[&str] = &["female", "женск", "microsoft zira"];

/// 备选语言男声标记（优先级 3）
pub const FALLBACK_MASCULINE_MARKERS: &[&str] = &["male", "microsoft david"];

/// 决定默认音调时使用的男声标记
pub const PITCH_MASCULINE_MARKERS: &[&str] = &["male", "мужск", "david", "yandex"];

/// 列出男声时使用的标记
pub const LISTING_MASCULINE_MARKERS: &[&str] = &["male", "мужск", "david"];

/// 音色是否按男声处理（影响默认音调）
pub fn reads_as_masculine(voice: &Voice) -> bool {
    voice.name_contains_any(PITCH_MASCULINE_MARKERS)
}
