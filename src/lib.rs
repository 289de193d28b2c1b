//! # page-i18n
//!
//! 静态宣传页面的本地化流程：检测并保存用户语言，按键应用翻译词典，
//! 在简体与繁体中文之间转换，并把剩余的可见文本分批送去远程机器翻译。
//!
//! ## 模块组织
//!
//! - `locale` - 语言检测、持久化、选择器和切换状态机
//! - `dictionary` - 按键的静态翻译词典
//! - `script` - 简繁转换（完整引擎按需加载，内置字表兜底）
//! - `translation` - 批量远程机器翻译
//! - `core` - 正在本地化的页面
//! - `parsers` - HTML 解析、DOM 操作与序列化
//! - `config` / `env` - 配置文件与环境变量
//! - `error` - 统一错误类型

pub mod config;
pub mod core;
pub mod dictionary;
pub mod env;
pub mod error;
pub mod locale;
pub mod parsers;
pub mod script;
pub mod translation;

// Re-export commonly used items for convenience
pub use crate::config::{AppConfig, ConfigManager};
pub use crate::core::Page;
pub use crate::dictionary::TranslationDictionary;
pub use crate::error::{PageError, PageResult};
pub use crate::locale::{Locale, LocaleManager, LocaleStrategy, LocaleTable, SwitchOutcome};
pub use crate::script::{ConversionMode, ScriptConverter};
pub use crate::translation::{RemoteTranslator, TranslationStatus};
