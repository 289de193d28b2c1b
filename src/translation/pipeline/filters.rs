//! 文本过滤器模块
//!
//! 判断收集到的文本是否值得送去远程翻译

use std::sync::OnceLock;

use regex::Regex;

/// 远程翻译的最短文本长度（字符数）
pub const MIN_TEXT_CHARS: usize = 2;

/// 文本过滤器
#[derive(Debug, Clone)]
pub struct TextFilter {
    /// 最短字符数
    pub min_chars: usize,
    /// 是否要求至少含有一个字母类字符（含汉字）
    pub require_alphabetic: bool,
    /// 是否跳过网址与邮箱
    pub skip_addresses: bool,
}

impl Default for TextFilter {
    fn default() -> Self {
        Self {
            min_chars: MIN_TEXT_CHARS,
            require_alphabetic: true,
            skip_addresses: true,
        }
    }
}

fn url_regex() -> Option<&'static Regex> {
    static URL: OnceLock<Option<Regex>> = OnceLock::new();
    URL.get_or_init(|| Regex::new(r"^(?:https?://|www\.)\S+$").ok())
        .as_ref()
}

fn email_regex() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[\w.+-]+@[\w-]+(?:\.[\w-]+)+$").ok())
        .as_ref()
}

impl TextFilter {
    /// 不做任何过滤（简繁转换使用）
    pub fn accept_all() -> Self {
        Self {
            min_chars: 0,
            require_alphabetic: false,
            skip_addresses: false,
        }
    }

    /// 判断文本是否需要处理
    pub fn should_translate(&self, text: &str) -> bool {
        let trimmed = text.trim();

        if trimmed.chars().count() < self.min_chars {
            return false;
        }

        if self.require_alphabetic && !trimmed.chars().any(|c| c.is_alphabetic()) {
            return false;
        }

        if self.skip_addresses && self.is_address(trimmed) {
            return false;
        }

        true
    }

    /// 是否为网址或邮箱
    fn is_address(&self, text: &str) -> bool {
        url_regex().is_some_and(|re| re.is_match(text))
            || email_regex().is_some_and(|re| re.is_match(text))
    }
}
