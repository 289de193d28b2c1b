//! 简繁转换
//!
//! 优先使用完整的词组级转换引擎（按需加载，见 [`engine`]），引擎不可用时回退到
//! 内置单字对照表（见 [`table`]）。转换永远不会失败。

pub mod engine;
pub mod table;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use markup5ever_rcdom::Handle;

use crate::error::PageError;
use crate::locale::Locale;
use crate::parsers::html::{set_text_of, text_of};

pub use engine::{
    CapabilityState, ConversionEngine, EngineLoader, EngineProvider, PhraseEngine,
    RemoteDictionaryLoader,
};

/// 转换方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversionMode {
    /// 简体 → 繁体
    SimplifiedToTraditional,
    /// 繁体 → 简体
    TraditionalToSimplified,
}

impl ConversionMode {
    /// 从一种中文书写体切换到另一种时使用的方向
    ///
    /// 两端不是繁简两种不同的书写体时返回 `None`。
    pub fn between(from: Locale, to: Locale) -> Option<Self> {
        match (from, to) {
            (Locale::ZhHant, Locale::ZhHans) => Some(ConversionMode::TraditionalToSimplified),
            (Locale::ZhHans, Locale::ZhHant) => Some(ConversionMode::SimplifiedToTraditional),
            _ => None,
        }
    }

    /// OpenCC 风格的方向代码
    pub fn as_str(self) -> &'static str {
        match self {
            ConversionMode::SimplifiedToTraditional => "s2t",
            ConversionMode::TraditionalToSimplified => "t2s",
        }
    }

}

impl fmt::Display for ConversionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConversionMode {
    type Err = PageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s2t" => Ok(ConversionMode::SimplifiedToTraditional),
            "t2s" => Ok(ConversionMode::TraditionalToSimplified),
            other => Err(PageError::Parse(format!("未知的转换方向: {}", other))),
        }
    }
}

/// 简繁转换器
#[derive(Debug)]
pub struct ScriptConverter {
    provider: EngineProvider,
}

impl ScriptConverter {
    pub fn new(provider: EngineProvider) -> Self {
        Self { provider }
    }

    /// 只使用内置字表
    pub fn table_only() -> Self {
        Self::new(EngineProvider::disabled())
    }

    /// 使用加载器按需加载完整引擎
    pub fn with_loader(loader: Arc<dyn EngineLoader>) -> Self {
        Self::new(EngineProvider::new(loader))
    }

    pub fn provider(&self) -> &EngineProvider {
        &self.provider
    }

    /// 引擎能力状态（不触发加载）
    pub fn state(&self) -> CapabilityState {
        self.provider.state()
    }

    /// 同步转换：引擎已就绪则使用引擎，否则使用内置字表
    pub fn convert(&self, text: &str, mode: ConversionMode) -> String {
        if text.is_empty() {
            return String::new();
        }
        convert_with(self.provider.current().as_deref(), text, mode)
    }

    /// 异步转换：先确保已尝试加载引擎
    pub async fn convert_async(&self, text: &str, mode: ConversionMode) -> String {
        if text.is_empty() {
            return String::new();
        }
        let engine = self.provider.engine().await;
        convert_with(engine.as_deref(), text, mode)
    }

    /// 原地转换一组文本节点，只写回内容有变化的节点，返回写回数量
    pub async fn convert_items(&self, nodes: &[Handle], mode: ConversionMode) -> usize {
        let engine = self.provider.engine().await;
        let mut changed = 0;

        for node in nodes {
            let Some(original) = text_of(node) else {
                continue;
            };
            let converted = convert_with(engine.as_deref(), &original, mode);
            if converted != original && set_text_of(node, &converted) {
                changed += 1;
            }
        }

        tracing::debug!("简繁转换 {}: {}/{} 个节点有变化", mode, changed, nodes.len());
        changed
    }
}

impl Default for ScriptConverter {
    fn default() -> Self {
        Self::table_only()
    }
}

fn convert_with(engine: Option<&dyn ConversionEngine>, text: &str, mode: ConversionMode) -> String {
    if let Some(engine) = engine {
        match engine.convert(text, mode) {
            Ok(converted) => return converted,
            Err(e) => tracing::warn!("引擎 {} 转换失败，回退到内置字表: {}", engine.name(), e),
        }
    }
    table::convert_chars(text, mode)
}
