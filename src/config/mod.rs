//! 配置管理模块
//!
//! 配置来源按优先级从低到高：默认值 → 配置文件 → `.env` 文件 → `PAGE_I18N_*` 环境变量。

pub mod manager;

pub use manager::{AppConfig, ConfigManager, LocaleSection, ScriptSection, TranslationSection};

/// 配置常量
pub mod constants {
    /// 默认请求超时（秒）
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// 默认同时在途的批次数
    pub const DEFAULT_MAX_CONCURRENT_BATCHES: usize = 2;

    /// `.env` 文件，按顺序找到第一个即停止
    pub const ENV_FILES: &[&str] = &[".env.local", ".env"];

    // 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &[
        "page-i18n.toml",
        ".page-i18n.toml",
        "~/.config/page-i18n/config.toml",
    ];
}

