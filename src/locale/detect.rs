//! 启动时的语言检测
//!
//! 顺序：已保存的偏好 → 环境报告的语言偏好 → 配置的默认语言。

use super::{Locale, LocaleStore, LocaleTable};
use crate::error::helpers::log_error;

/// 环境报告的语言偏好，按优先级从高到低
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguagePreferences {
    tags: Vec<String>,
}

impl LanguagePreferences {
    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags
                .into_iter()
                .map(Into::into)
                .filter(|tag| !tag.trim().is_empty())
                .collect(),
        }
    }

    /// 解析 `Accept-Language` 风格的列表，例如 `zh-TW,zh;q=0.9,en;q=0.8`
    ///
    /// 按 q 值降序排列，q 相同时保持原顺序；`q=0` 和 `*` 会被丢弃。
    pub fn from_accept_language(header: &str) -> Self {
        let mut weighted: Vec<(String, f32)> = header
            .split(',')
            .filter_map(|part| {
                let mut pieces = part.split(';');
                let tag = pieces.next()?.trim();
                if tag.is_empty() || tag == "*" {
                    return None;
                }
                let quality = pieces
                    .filter_map(|param| param.trim().strip_prefix("q="))
                    .find_map(|q| q.trim().parse::<f32>().ok())
                    .unwrap_or(1.0);
                (quality > 0.0).then(|| (tag.to_string(), quality))
            })
            .collect();

        // sort_by 是稳定排序
        weighted.sort_by(|a, b| b.1.total_cmp(&a.1));
        Self::from_tags(weighted.into_iter().map(|(tag, _)| tag))
    }

    /// 读取进程环境：`LC_ALL`、`LC_MESSAGES`、`LANGUAGE`（冒号分隔）、`LANG`
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// 使用给定的变量读取函数，便于测试
    pub fn from_env_with<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut tags = Vec::new();
        for key in ["LC_ALL", "LC_MESSAGES", "LANGUAGE", "LANG"] {
            if let Some(value) = lookup(key) {
                tags.extend(value.split(':').map(|tag| tag.trim().to_string()));
            }
        }
        Self::from_tags(tags)
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// 检测结果来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionSource {
    /// 已保存的偏好
    Stored,
    /// 环境语言偏好中的某个标签
    Environment(String),
    /// 配置的默认语言
    Default,
}

/// 检测结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub locale: Locale,
    pub source: DetectionSource,
}

/// 检测初始语言
///
/// 存储读取失败按"没有偏好"处理；已保存但不在支持列表中的语言同样忽略。
pub fn detect_locale(
    store: &dyn LocaleStore,
    preferences: &LanguagePreferences,
    table: &LocaleTable,
    default: Locale,
) -> Detection {
    match store.load() {
        Ok(Some(locale)) if table.is_supported(locale) => {
            return Detection {
                locale,
                source: DetectionSource::Stored,
            };
        }
        Ok(Some(locale)) => tracing::warn!("已保存的语言 {} 不在支持列表中，忽略", locale),
        Ok(None) => {}
        Err(e) => log_error(&e.with_context("读取语言偏好失败，按无偏好处理")),
    }

    for tag in preferences.tags() {
        if let Some(locale) = table.match_tag(tag) {
            tracing::debug!("根据语言偏好 {} 选择 {}", tag, locale);
            return Detection {
                locale,
                source: DetectionSource::Environment(tag.clone()),
            };
        }
    }

    let locale = if table.is_supported(default) {
        default
    } else {
        table.native()
    };
    Detection {
        locale,
        source: DetectionSource::Default,
    }
}
