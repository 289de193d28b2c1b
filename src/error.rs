//! 统一错误处理
//!
//! 本地化流程中所有可能出现的错误类型。除配置错误外，这些错误都不会中断页面渲染：
//! 调用方记录日志后降级到下一层回退策略。

use std::fmt;

use thiserror::Error;

/// 本地化错误类型
#[derive(Error, Debug, Clone)]
pub enum PageError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 网络错误
    #[error("网络错误: {0}")]
    Network(String),

    /// HTTP 状态错误
    #[error("HTTP错误 {status}: {message}")]
    Http { status: u16, message: String },

    /// 翻译接口返回了无法识别的响应结构
    #[error("无法识别的响应结构: {0}")]
    UnexpectedResponse(String),

    /// 持久化存储错误
    #[error("存储错误: {0}")]
    Storage(String),

    /// 解析错误
    #[error("解析错误: {0}")]
    Parse(String),

    /// 序列化错误
    #[error("序列化错误: {0}")]
    Serialization(String),

    /// 超时错误
    #[error("操作超时: {0}")]
    Timeout(String),

    /// 已有翻译任务在执行
    #[error("已有翻译任务正在进行")]
    PassInFlight,

    /// 语言切换正在进行
    #[error("语言切换正在进行: {0}")]
    SwitchInProgress(String),

    /// 管理器尚未完成初始化
    #[error("语言管理器尚未就绪")]
    NotReady,

    /// 不支持的语言
    #[error("不支持的语言: {0}")]
    UnsupportedLocale(String),

    /// IO 错误
    #[error("IO错误: {0}")]
    Io(String),

    /// 内部错误
    #[error("内部错误: {0}")]
    Internal(String),
}

impl PageError {
    /// 获取错误的严重程度
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            PageError::Config(_) => ErrorSeverity::Critical,
            PageError::Network(_) => ErrorSeverity::Warning,
            PageError::Http { .. } => ErrorSeverity::Warning,
            PageError::UnexpectedResponse(_) => ErrorSeverity::Warning,
            PageError::Storage(_) => ErrorSeverity::Warning,
            PageError::Parse(_) => ErrorSeverity::Error,
            PageError::Serialization(_) => ErrorSeverity::Error,
            PageError::Timeout(_) => ErrorSeverity::Warning,
            PageError::PassInFlight => ErrorSeverity::Info,
            PageError::SwitchInProgress(_) => ErrorSeverity::Info,
            PageError::NotReady => ErrorSeverity::Error,
            PageError::UnsupportedLocale(_) => ErrorSeverity::Info,
            PageError::Io(_) => ErrorSeverity::Error,
            PageError::Internal(_) => ErrorSeverity::Critical,
        }
    }

    /// 创建带上下文的错误
    pub fn with_context<T: fmt::Display>(mut self, context: T) -> Self {
        let current_msg = self.to_string();
        let new_msg = format!("{} (上下文: {})", current_msg, context);

        match &mut self {
            PageError::Config(ref mut msg)
            | PageError::Network(ref mut msg)
            | PageError::UnexpectedResponse(ref mut msg)
            | PageError::Storage(ref mut msg)
            | PageError::Parse(ref mut msg)
            | PageError::Serialization(ref mut msg)
            | PageError::Timeout(ref mut msg)
            | PageError::SwitchInProgress(ref mut msg)
            | PageError::UnsupportedLocale(ref mut msg)
            | PageError::Io(ref mut msg)
            | PageError::Internal(ref mut msg) => *msg = new_msg,
            PageError::Http {
                ref mut message, ..
            } => *message = new_msg,
            PageError::PassInFlight | PageError::NotReady => {}
        }

        self
    }
}

/// 错误严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl From<std::io::Error> for PageError {
    fn from(error: std::io::Error) -> Self {
        PageError::Io(error.to_string())
    }
}

impl From<serde_json::Error> for PageError {
    fn from(error: serde_json::Error) -> Self {
        PageError::Serialization(format!("JSON序列化错误: {}", error))
    }
}

impl From<toml::de::Error> for PageError {
    fn from(error: toml::de::Error) -> Self {
        PageError::Parse(format!("TOML解析错误: {}", error))
    }
}

impl From<url::ParseError> for PageError {
    fn from(error: url::ParseError) -> Self {
        PageError::Config(format!("URL无效: {}", error))
    }
}

impl From<reqwest::Error> for PageError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            PageError::Timeout(error.to_string())
        } else if let Some(status) = error.status() {
            PageError::Http {
                status: status.as_u16(),
                message: error.to_string(),
            }
        } else if error.is_decode() {
            PageError::UnexpectedResponse(format!("响应解码失败: {}", error))
        } else {
            PageError::Network(error.to_string())
        }
    }
}

impl From<crate::env::EnvError> for PageError {
    fn from(error: crate::env::EnvError) -> Self {
        PageError::Config(error.to_string())
    }
}

/// 错误结果类型别名
pub type PageResult<T> = Result<T, PageError>;

/// 错误处理助手函数
pub mod helpers {
    use super::*;

    /// 按严重程度记录错误
    pub fn log_error(error: &PageError) {
        match error.severity() {
            ErrorSeverity::Info => tracing::info!("本地化信息: {}", error),
            ErrorSeverity::Warning => tracing::warn!("本地化警告: {}", error),
            ErrorSeverity::Error => tracing::error!("本地化错误: {}", error),
            ErrorSeverity::Critical => tracing::error!("本地化严重错误: {}", error),
        }
    }

    /// 创建配置错误
    pub fn config_error<T: fmt::Display>(msg: T) -> PageError {
        PageError::Config(msg.to_string())
    }

    /// 创建存储错误
    pub fn storage_error<T: fmt::Display>(msg: T) -> PageError {
        PageError::Storage(msg.to_string())
    }
}
