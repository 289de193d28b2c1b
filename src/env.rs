//! 类型安全的环境变量访问
//!
//! 所有变量以 `PAGE_I18N_` 开头。每个变量是实现 [`EnvVar`] 的单元结构体，
//! 负责解析与校验；[`generate_env_docs`] 由这些定义生成说明文档。

use std::env;
use std::fmt;
use std::time::Duration;

use crate::locale::Locale;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => Self::DEFAULT.ok_or_else(|| EnvError {
                variable: Self::NAME.to_string(),
                message: "Required environment variable not set".to_string(),
            }),
        }
    }

    /// 只在变量被显式设置时返回值，解析失败记录警告
    fn get_override() -> Option<T> {
        let value = env::var(Self::NAME).ok()?;
        match Self::parse(&value) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("忽略无效的环境变量: {}", e);
                None
            }
        }
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }
}

/// 核心环境变量
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "PAGE_I18N_LOG_LEVEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error (default: info)";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                level @ ("trace" | "debug" | "info" | "warn" | "error") => Ok(level.to_string()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!("Invalid log level '{}'. Use: trace, debug, info, warn, error", value),
                }),
            }
        }
    }

    /// 配置文件路径
    pub struct ConfigPath;
    impl EnvVar<String> for ConfigPath {
        const NAME: &'static str = "PAGE_I18N_CONFIG";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Explicit configuration file path (TOML or JSON)";

        fn parse(value: &str) -> EnvResult<String> {
            parse_non_empty(value, Self::NAME).map(|path| shellexpand::tilde(&path).into_owned())
        }
    }
}

/// 语言相关环境变量
pub mod locale {
    use super::*;

    /// 页面原文语言
    pub struct NativeLocale;
    impl EnvVar<Locale> for NativeLocale {
        const NAME: &'static str = "PAGE_I18N_NATIVE_LOCALE";
        const DEFAULT: Option<Locale> = Some(Locale::ZhHant);
        const DESCRIPTION: &'static str = "Language the page source is written in";

        fn parse(value: &str) -> EnvResult<Locale> {
            parse_locale(value, Self::NAME)
        }
    }

    /// 检测不到偏好时使用的语言
    pub struct DefaultLocale;
    impl EnvVar<Locale> for DefaultLocale {
        const NAME: &'static str = "PAGE_I18N_DEFAULT_LOCALE";
        const DEFAULT: Option<Locale> = Some(Locale::ZhHant);
        const DESCRIPTION: &'static str = "Locale used when neither storage nor environment decides";

        fn parse(value: &str) -> EnvResult<Locale> {
            parse_locale(value, Self::NAME)
        }
    }

    /// 支持的语言列表
    pub struct SupportedLocales;
    impl EnvVar<Vec<Locale>> for SupportedLocales {
        const NAME: &'static str = "PAGE_I18N_SUPPORTED_LOCALES";
        const DEFAULT: Option<Vec<Locale>> = None;
        const DESCRIPTION: &'static str = "Supported locales (comma-separated, default: zh-Hant,zh-Hans,en,fr)";

        fn get() -> EnvResult<Vec<Locale>> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(Locale::ALL.to_vec()),
            }
        }

        fn parse(value: &str) -> EnvResult<Vec<Locale>> {
            let locales = value
                .split(',')
                .map(str::trim)
                .filter(|code| !code.is_empty())
                .map(|code| parse_locale(code, Self::NAME))
                .collect::<EnvResult<Vec<_>>>()?;

            if locales.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "At least one locale is required".to_string(),
                });
            }
            Ok(locales)
        }
    }

    /// 语言偏好文件
    pub struct StorePath;
    impl EnvVar<String> for StorePath {
        const NAME: &'static str = "PAGE_I18N_LOCALE_STORE";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Path of the JSON file holding the preferred locale";

        fn parse(value: &str) -> EnvResult<String> {
            parse_non_empty(value, Self::NAME).map(|path| shellexpand::tilde(&path).into_owned())
        }
    }
}

/// 远程翻译环境变量
pub mod translation {
    use super::*;

    /// 是否启用远程翻译
    pub struct Enabled;
    impl EnvVar<bool> for Enabled {
        const NAME: &'static str = "PAGE_I18N_TRANSLATION_ENABLED";
        const DEFAULT: Option<bool> = Some(true);
        const DESCRIPTION: &'static str = "Enable remote machine translation";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }

    /// 翻译接口地址
    pub struct ApiUrl;
    impl EnvVar<String> for ApiUrl {
        const NAME: &'static str = "PAGE_I18N_API_URL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "LibreTranslate compatible endpoint URL";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(crate::translation::DEFAULT_API_URL.to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            parse_http_url(value, Self::NAME)
        }
    }

    /// 接口密钥
    pub struct ApiKey;
    impl EnvVar<String> for ApiKey {
        const NAME: &'static str = "PAGE_I18N_API_KEY";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "API key sent with every translation request";

        fn parse(value: &str) -> EnvResult<String> {
            Ok(value.trim().to_string())
        }
    }

    /// 每批文本条数
    pub struct BatchSize;
    impl EnvVar<usize> for BatchSize {
        const NAME: &'static str = "PAGE_I18N_BATCH_SIZE";
        const DEFAULT: Option<usize> = Some(crate::translation::pipeline::DEFAULT_BATCH_SIZE);
        const DESCRIPTION: &'static str = "Number of text items per translation request";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 200)
        }
    }

    /// 同时在途的批次数
    pub struct MaxConcurrentBatches;
    impl EnvVar<usize> for MaxConcurrentBatches {
        const NAME: &'static str = "PAGE_I18N_MAX_CONCURRENT_BATCHES";
        const DEFAULT: Option<usize> = Some(2);
        const DESCRIPTION: &'static str = "Maximum translation requests in flight during one pass";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 16)
        }
    }

    /// 单次请求超时
    pub struct Timeout;
    impl EnvVar<Duration> for Timeout {
        const NAME: &'static str = "PAGE_I18N_TIMEOUT";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(30));
        const DESCRIPTION: &'static str = "Request timeout in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_positive_usize(value, Self::NAME, 1, 300).map(|secs| Duration::from_secs(secs as u64))
        }
    }
}

/// 简繁转换环境变量
pub mod script {
    use super::*;

    /// 是否尝试加载完整转换引擎
    pub struct EngineEnabled;
    impl EnvVar<bool> for EngineEnabled {
        const NAME: &'static str = "PAGE_I18N_SCRIPT_ENGINE_ENABLED";
        const DEFAULT: Option<bool> = Some(true);
        const DESCRIPTION: &'static str = "Load the phrase-level conversion engine on first use";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }

    /// OpenCC 词典文件所在目录
    pub struct EngineUrl;
    impl EnvVar<String> for EngineUrl {
        const NAME: &'static str = "PAGE_I18N_SCRIPT_ENGINE_URL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Base URL serving OpenCC dictionary files";

        fn parse(value: &str) -> EnvResult<String> {
            parse_http_url(value, Self::NAME)
        }
    }
}

/// 辅助函数
fn parse_bool(value: &str, var_name: &str) -> EnvResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "enabled" => Ok(true),
        "false" | "0" | "no" | "off" | "disabled" => Ok(false),
        _ => Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Invalid boolean value '{}'. Use: true/false, 1/0, yes/no, on/off, enabled/disabled", value),
        }),
    }
}

fn parse_positive_usize(value: &str, var_name: &str, min: usize, max: usize) -> EnvResult<usize> {
    let num: usize = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid positive number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

fn parse_locale(value: &str, var_name: &str) -> EnvResult<Locale> {
    value.parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: format!("Unsupported locale '{}'. Use: zh-Hant, zh-Hans, en, fr", value),
    })
}

fn parse_http_url(value: &str, var_name: &str) -> EnvResult<String> {
    let parsed = url::Url::parse(value.trim()).map_err(|e| EnvError {
        variable: var_name.to_string(),
        message: format!("Invalid URL: {}", e),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(value.trim().to_string()),
        scheme => Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Unsupported URL scheme '{}'", scheme),
        }),
    }
}

fn parse_non_empty(value: &str, var_name: &str) -> EnvResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: "Value must not be empty".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

fn doc_line<T: fmt::Debug>(name: &str, description: &str, default: Option<T>) -> String {
    match default {
        Some(value) => format!("- `{}`: {} (default: {:?})\n", name, description, value),
        None => format!("- `{}`: {}\n", name, description),
    }
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    let mut docs = String::new();
    docs.push_str("# Environment Variables\n\n");

    docs.push_str("## Core\n\n");
    docs.push_str(&doc_line(core::LogLevel::NAME, core::LogLevel::DESCRIPTION, core::LogLevel::DEFAULT));
    docs.push_str(&doc_line(core::ConfigPath::NAME, core::ConfigPath::DESCRIPTION, core::ConfigPath::DEFAULT));

    docs.push_str("\n## Locale\n\n");
    docs.push_str(&doc_line(locale::NativeLocale::NAME, locale::NativeLocale::DESCRIPTION, locale::NativeLocale::DEFAULT));
    docs.push_str(&doc_line(locale::DefaultLocale::NAME, locale::DefaultLocale::DESCRIPTION, locale::DefaultLocale::DEFAULT));
    docs.push_str(&doc_line(locale::SupportedLocales::NAME, locale::SupportedLocales::DESCRIPTION, locale::SupportedLocales::DEFAULT));
    docs.push_str(&doc_line(locale::StorePath::NAME, locale::StorePath::DESCRIPTION, locale::StorePath::DEFAULT));

    docs.push_str("\n## Remote Translation\n\n");
    docs.push_str(&doc_line(translation::Enabled::NAME, translation::Enabled::DESCRIPTION, translation::Enabled::DEFAULT));
    docs.push_str(&doc_line(
        translation::ApiUrl::NAME,
        translation::ApiUrl::DESCRIPTION,
        Some(crate::translation::DEFAULT_API_URL),
    ));
    docs.push_str(&doc_line(translation::ApiKey::NAME, translation::ApiKey::DESCRIPTION, translation::ApiKey::DEFAULT));
    docs.push_str(&doc_line(translation::BatchSize::NAME, translation::BatchSize::DESCRIPTION, translation::BatchSize::DEFAULT));
    docs.push_str(&doc_line(
        translation::MaxConcurrentBatches::NAME,
        translation::MaxConcurrentBatches::DESCRIPTION,
        translation::MaxConcurrentBatches::DEFAULT,
    ));
    docs.push_str(&doc_line(
        translation::Timeout::NAME,
        translation::Timeout::DESCRIPTION,
        translation::Timeout::DEFAULT.map(|timeout| timeout.as_secs()),
    ));

    docs.push_str("\n## Script Conversion\n\n");
    docs.push_str(&doc_line(script::EngineEnabled::NAME, script::EngineEnabled::DESCRIPTION, script::EngineEnabled::DEFAULT));
    docs.push_str(&doc_line(script::EngineUrl::NAME, script::EngineUrl::DESCRIPTION, script::EngineUrl::DEFAULT));

    docs
}
