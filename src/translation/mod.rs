//! 远程机器翻译
//!
//! - **core**: 翻译任务调度（收集 → 分批 → 请求 → 归一化 → 写回）
//! - **pipeline**: 文本收集、过滤和批次切分
//! - **client**: 翻译接口客户端
//! - **response**: 响应形态归一化
//! - **status**: 可订阅的翻译状态
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use page_i18n::locale::{Locale, LocaleContext};
//! use page_i18n::translation::{LibreTranslateClient, RemoteTranslator, RemoteTranslatorConfig};
//!
//! # async fn example(document: markup5ever_rcdom::Handle) -> Result<(), Box<dyn std::error::Error>> {
//! let client = LibreTranslateClient::new("https://libretranslate.de/translate", Duration::from_secs(15))?;
//! let context = LocaleContext::new(Locale::ZhHant);
//! let translator = RemoteTranslator::new(Arc::new(client), context.clone(), RemoteTranslatorConfig::default());
//!
//! let ticket = context.begin_switch(Locale::En);
//! let report = translator.translate_visible_text(&document, ticket).await?;
//! println!("写回 {} 段文本", report.translated);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod core;
pub mod pipeline;
pub mod response;
pub mod status;

pub use client::{LibreTranslateClient, Query, TranslateRequest, TranslationBackend, DEFAULT_API_URL};
pub use core::{PassReport, RemoteTranslator, RemoteTranslatorConfig};
pub use pipeline::{CollectorConfig, TextCollector, TextItem};
pub use response::{normalize_response, TranslationResponse, SPLIT_SEPARATOR};
pub use status::{StatusHandle, TranslationStatus};
