//! 语言管理模块
//!
//! - `context`: 当前语言的共享状态与切换代次
//! - `detect`: 启动时的语言检测（存储 → 环境偏好 → 默认）
//! - `store`: 语言偏好的持久化
//! - `selector`: 页面上的语言选择器
//! - `manager`: 语言切换状态机

pub mod context;
pub mod detect;
pub mod manager;
pub mod selector;
pub mod store;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PageError;
use crate::script::ConversionMode;

pub use context::{LocaleContext, PassTicket};
pub use detect::{detect_locale, Detection, DetectionSource, LanguagePreferences};
pub use manager::{Initialized, LocaleManager, ManagerState, SwitchOutcome};
pub use store::{FileLocaleStore, LocaleStore, MemoryLocaleStore};

/// 页面支持的语言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Locale {
    /// 繁体中文（页面原文）
    #[serde(rename = "zh-Hant")]
    ZhHant,
    /// 简体中文
    #[serde(rename = "zh-Hans")]
    ZhHans,
    #[serde(rename = "en")]
    En,
    #[serde(rename = "fr")]
    Fr,
}

impl Locale {
    pub const ALL: [Locale; 4] = [Locale::ZhHant, Locale::ZhHans, Locale::En, Locale::Fr];

    /// 语言代码，同时用作远程翻译的目标语言
    pub fn code(self) -> &'static str {
        match self {
            Locale::ZhHant => "zh-Hant",
            Locale::ZhHans => "zh-Hans",
            Locale::En => "en",
            Locale::Fr => "fr",
        }
    }

    /// 选择器按钮上的短标签
    pub fn label(self) -> &'static str {
        match self {
            Locale::ZhHant => "繁體",
            Locale::ZhHans => "简体",
            Locale::En => "EN",
            Locale::Fr => "FR",
        }
    }

    /// 是否为中文书写体系
    pub fn is_chinese(self) -> bool {
        matches!(self, Locale::ZhHant | Locale::ZhHans)
    }

    fn primary_subtag(self) -> &'static str {
        match self {
            Locale::ZhHant | Locale::ZhHans => "zh",
            Locale::En => "en",
            Locale::Fr => "fr",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = PageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('_', "-").to_ascii_lowercase();
        match normalized.as_str() {
            "zh-hant" => Ok(Locale::ZhHant),
            "zh-hans" => Ok(Locale::ZhHans),
            "en" => Ok(Locale::En),
            "fr" => Ok(Locale::Fr),
            _ => Err(PageError::UnsupportedLocale(s.to_string())),
        }
    }
}

/// 切换到某个语言时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocaleStrategy {
    /// 页面原文语言：整页重新加载
    Native,
    /// 同一文字的另一种书写体：词典 + 简繁转换
    Script(ConversionMode),
    /// 其他语言：词典 + 远程机器翻译
    Remote,
}

/// 语言到处理策略的映射表，在启动时根据配置一次性解析
#[derive(Debug, Clone)]
pub struct LocaleTable {
    native: Locale,
    entries: Vec<(Locale, LocaleStrategy)>,
}

impl LocaleTable {
    /// 根据原文语言与支持列表构建映射表
    pub fn new(native: Locale, supported: &[Locale]) -> Self {
        let mut entries: Vec<(Locale, LocaleStrategy)> = Vec::with_capacity(supported.len() + 1);

        for &locale in std::iter::once(&native).chain(supported.iter()) {
            if entries.iter().any(|(known, _)| *known == locale) {
                continue;
            }
            let strategy = if locale == native {
                LocaleStrategy::Native
            } else if let Some(mode) = ConversionMode::between(native, locale) {
                LocaleStrategy::Script(mode)
            } else {
                LocaleStrategy::Remote
            };
            entries.push((locale, strategy));
        }

        Self { native, entries }
    }

    pub fn native(&self) -> Locale {
        self.native
    }

    /// 支持的语言（原文语言在前）
    pub fn locales(&self) -> impl Iterator<Item = Locale> + '_ {
        self.entries.iter().map(|(locale, _)| *locale)
    }

    pub fn is_supported(&self, locale: Locale) -> bool {
        self.entries.iter().any(|(known, _)| *known == locale)
    }

    pub fn strategy(&self, locale: Locale) -> Option<LocaleStrategy> {
        self.entries
            .iter()
            .find(|(known, _)| *known == locale)
            .map(|(_, strategy)| *strategy)
    }

    /// 把环境报告的语言标签映射到最接近的受支持语言
    ///
    /// 中文按书写体或地区码区分繁简；其他语言按主子标签匹配。
    pub fn match_tag(&self, raw: &str) -> Option<Locale> {
        let mut normalized = raw.trim().replace('_', "-").to_ascii_lowercase();
        if let Some(idx) = normalized.find(['.', '@']) {
            normalized.truncate(idx);
        }
        if normalized.is_empty() || normalized == "c" || normalized == "posix" {
            return None;
        }

        let candidate = if normalized.starts_with("zh-hant")
            || normalized.starts_with("zh-tw")
            || normalized.starts_with("zh-hk")
            || normalized.starts_with("zh-mo")
        {
            Some(Locale::ZhHant)
        } else if normalized.starts_with("zh-hans")
            || normalized.starts_with("zh-cn")
            || normalized.starts_with("zh-sg")
            || normalized == "zh"
        {
            Some(Locale::ZhHans)
        } else {
            let primary = normalized.split('-').next().unwrap_or_default();
            if primary == "zh" {
                // 未知地区的中文落到表中第一个中文项
                self.locales().find(|locale| locale.is_chinese())
            } else {
                Locale::ALL
                    .into_iter()
                    .find(|locale| !locale.is_chinese() && locale.primary_subtag() == primary)
            }
        };

        match candidate {
            Some(locale) if self.is_supported(locale) => Some(locale),
            Some(locale) if locale.is_chinese() => self.locales().find(|l| l.is_chinese()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> LocaleTable {
        LocaleTable::new(Locale::ZhHant, &Locale::ALL)
    }

    #[test]
    fn test_locale_codes_roundtrip() {
        for locale in Locale::ALL {
            assert_eq!(locale.code().parse::<Locale>().unwrap(), locale);
        }
        assert_eq!("zh_hans".parse::<Locale>().unwrap(), Locale::ZhHans);
        assert!("de".parse::<Locale>().is_err());
    }

    #[test]
    fn test_strategy_table() {
        let table = table();
        assert_eq!(table.strategy(Locale::ZhHant), Some(LocaleStrategy::Native));
        assert_eq!(
            table.strategy(Locale::ZhHans),
            Some(LocaleStrategy::Script(ConversionMode::TraditionalToSimplified))
        );
        assert_eq!(table.strategy(Locale::En), Some(LocaleStrategy::Remote));
        assert_eq!(table.strategy(Locale::Fr), Some(LocaleStrategy::Remote));
        assert_eq!(table.locales().next(), Some(Locale::ZhHant));
    }

    #[test]
    fn test_simplified_native_page() {
        let table = LocaleTable::new(Locale::ZhHans, &[Locale::ZhHant, Locale::En]);
        assert_eq!(
            table.strategy(Locale::ZhHant),
            Some(LocaleStrategy::Script(ConversionMode::SimplifiedToTraditional))
        );
        assert_eq!(table.strategy(Locale::Fr), None);
    }

    #[test]
    fn test_match_tag_region_codes() {
        let table = table();
        assert_eq!(table.match_tag("zh-TW"), Some(Locale::ZhHant));
        assert_eq!(table.match_tag("zh_HK.UTF-8"), Some(Locale::ZhHant));
        assert_eq!(table.match_tag("zh-Hant-HK"), Some(Locale::ZhHant));
        assert_eq!(table.match_tag("zh-CN"), Some(Locale::ZhHans));
        assert_eq!(table.match_tag("zh"), Some(Locale::ZhHans));
        assert_eq!(table.match_tag("en-US"), Some(Locale::En));
        assert_eq!(table.match_tag("fr_CA.UTF-8"), Some(Locale::Fr));
        assert_eq!(table.match_tag("de-DE"), None);
        assert_eq!(table.match_tag("C"), None);
    }

    #[test]
    fn test_match_tag_respects_supported_set() {
        let table = LocaleTable::new(Locale::ZhHant, &[Locale::En]);
        assert_eq!(table.match_tag("fr-FR"), None);
        // 简体不在支持列表中时落到繁体
        assert_eq!(table.match_tag("zh-CN"), Some(Locale::ZhHant));
    }
}
