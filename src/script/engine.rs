//! 完整简繁转换引擎及其按需加载
//!
//! 引擎使用 OpenCC 格式的词典（`词条\t译文 [备选…]`），按最长匹配做词组级转换。
//! 引擎只在第一次需要时加载，且整个进程生命周期内只尝试一次：并发的请求方共享
//! 同一个加载 future，加载失败则固定为 `Unavailable`，调用方回退到内置字表。

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use url::Url;

use super::ConversionMode;
use crate::error::{PageError, PageResult};

/// 完整转换引擎
pub trait ConversionEngine: Send + Sync + fmt::Debug {
    /// 引擎名称，用于日志
    fn name(&self) -> &str;

    /// 转换文本；引擎内部失败时返回错误，由调用方回退
    fn convert(&self, text: &str, mode: ConversionMode) -> PageResult<String>;
}

/// 引擎加载器
#[async_trait]
pub trait EngineLoader: Send + Sync {
    async fn load(&self) -> PageResult<Arc<dyn ConversionEngine>>;
}

/// 引擎能力状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityState {
    Unloaded,
    Loading,
    Available,
    Unavailable,
}

type LoadFuture = Shared<BoxFuture<'static, Option<Arc<dyn ConversionEngine>>>>;

enum Slot {
    Unloaded,
    Loading(LoadFuture),
    Available(Arc<dyn ConversionEngine>),
    Unavailable,
}

/// 引擎能力提供者
///
/// 查询 `state()` / `current()` 不会触发加载；只有 `engine()` 会。
pub struct EngineProvider {
    loader: Option<Arc<dyn EngineLoader>>,
    slot: Mutex<Slot>,
}

impl EngineProvider {
    /// 使用加载器创建，首次请求时加载
    pub fn new(loader: Arc<dyn EngineLoader>) -> Self {
        Self {
            loader: Some(loader),
            slot: Mutex::new(Slot::Unloaded),
        }
    }

    /// 不加载任何引擎，始终使用内置字表
    pub fn disabled() -> Self {
        Self {
            loader: None,
            slot: Mutex::new(Slot::Unavailable),
        }
    }

    /// 使用已就绪的引擎
    pub fn with_engine(engine: Arc<dyn ConversionEngine>) -> Self {
        Self {
            loader: None,
            slot: Mutex::new(Slot::Available(engine)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 当前能力状态
    pub fn state(&self) -> CapabilityState {
        match &*self.lock() {
            Slot::Unloaded => CapabilityState::Unloaded,
            Slot::Loading(_) => CapabilityState::Loading,
            Slot::Available(_) => CapabilityState::Available,
            Slot::Unavailable => CapabilityState::Unavailable,
        }
    }

    /// 已就绪的引擎（不触发加载）
    pub fn current(&self) -> Option<Arc<dyn ConversionEngine>> {
        match &*self.lock() {
            Slot::Available(engine) => Some(Arc::clone(engine)),
            _ => None,
        }
    }

    /// 获取引擎，必要时发起唯一一次加载
    pub async fn engine(&self) -> Option<Arc<dyn ConversionEngine>> {
        let pending = {
            let mut slot = self.lock();
            match &*slot {
                Slot::Available(engine) => return Some(Arc::clone(engine)),
                Slot::Unavailable => return None,
                Slot::Loading(pending) => pending.clone(),
                Slot::Unloaded => {
                    let Some(loader) = self.loader.clone() else {
                        *slot = Slot::Unavailable;
                        return None;
                    };
                    tracing::info!("开始加载完整简繁转换引擎");
                    let pending = async move {
                        match loader.load().await {
                            Ok(engine) => {
                                tracing::info!("简繁转换引擎已加载: {}", engine.name());
                                Some(engine)
                            }
                            Err(e) => {
                                tracing::warn!("简繁转换引擎加载失败，使用内置字表: {}", e);
                                None
                            }
                        }
                    }
                    .boxed()
                    .shared();
                    *slot = Slot::Loading(pending.clone());
                    pending
                }
            }
        };

        let outcome = pending.await;

        let mut slot = self.lock();
        if matches!(*slot, Slot::Loading(_)) {
            *slot = match &outcome {
                Some(engine) => Slot::Available(Arc::clone(engine)),
                None => Slot::Unavailable,
            };
        }
        outcome
    }
}

impl fmt::Debug for EngineProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineProvider")
            .field("state", &self.state())
            .field("has_loader", &self.loader.is_some())
            .finish()
    }
}

/// 单方向的转换词典
#[derive(Debug, Default, Clone)]
struct ConversionDict {
    entries: HashMap<String, String>,
    max_key_chars: usize,
}

impl ConversionDict {
    fn extend_from_opencc(&mut self, source: &str) {
        for line in source.lines() {
            let line = line.trim_end_matches('\r');
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, values)) = line.split_once('\t') else {
                continue;
            };
            let Some(value) = values.split_whitespace().next() else {
                continue;
            };
            self.max_key_chars = self.max_key_chars.max(key.chars().count());
            self.entries.insert(key.to_string(), value.to_string());
        }
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 最长匹配转换
    fn convert(&self, text: &str) -> String {
        let chars: Vec<char> = text.chars().collect();
        let mut out = String::with_capacity(text.len());
        let mut i = 0;

        while i < chars.len() {
            let longest = self.max_key_chars.min(chars.len() - i);
            let mut matched = false;

            for len in (1..=longest).rev() {
                let candidate: String = chars[i..i + len].iter().collect();
                if let Some(value) = self.entries.get(&candidate) {
                    out.push_str(value);
                    i += len;
                    matched = true;
                    break;
                }
            }

            if !matched {
                out.push(chars[i]);
                i += 1;
            }
        }

        out
    }
}

/// 基于 OpenCC 词典的词组级转换引擎
#[derive(Debug, Clone)]
pub struct PhraseEngine {
    s2t: ConversionDict,
    t2s: ConversionDict,
}

impl PhraseEngine {
    /// 由 OpenCC 格式的词典文本构建；每个方向可给出多份（词组、单字）
    pub fn from_opencc(s2t_sources: &[&str], t2s_sources: &[&str]) -> PageResult<Self> {
        let mut s2t = ConversionDict::default();
        for source in s2t_sources {
            s2t.extend_from_opencc(source);
        }
        let mut t2s = ConversionDict::default();
        for source in t2s_sources {
            t2s.extend_from_opencc(source);
        }

        if s2t.is_empty() || t2s.is_empty() {
            return Err(PageError::Parse("简繁词典为空".to_string()));
        }

        Ok(Self { s2t, t2s })
    }

    pub fn entry_count(&self) -> usize {
        self.s2t.entries.len() + self.t2s.entries.len()
    }
}

impl ConversionEngine for PhraseEngine {
    fn name(&self) -> &str {
        "opencc-dictionary"
    }

    fn convert(&self, text: &str, mode: ConversionMode) -> PageResult<String> {
        let dict = match mode {
            ConversionMode::SimplifiedToTraditional => &self.s2t,
            ConversionMode::TraditionalToSimplified => &self.t2s,
        };
        if dict.is_empty() {
            return Err(PageError::Internal(format!("{} 词典未加载", mode)));
        }
        Ok(dict.convert(text))
    }
}

/// OpenCC 词典文件名
pub const ST_PHRASES: &str = "STPhrases.txt";
pub const ST_CHARACTERS: &str = "STCharacters.txt";
pub const TS_PHRASES: &str = "TSPhrases.txt";
pub const TS_CHARACTERS: &str = "TSCharacters.txt";

/// 从远程地址下载 OpenCC 词典并构建引擎
#[derive(Debug, Clone)]
pub struct RemoteDictionaryLoader {
    client: reqwest::Client,
    base_url: Url,
}

impl RemoteDictionaryLoader {
    pub fn new(base_url: &str, timeout: Duration) -> PageResult<Self> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PageError::Config(format!("创建HTTP客户端失败: {}", e)))?;
        Ok(Self { client, base_url })
    }

    async fn fetch(&self, file: &str) -> PageResult<String> {
        let url = self.base_url.join(file)?;
        tracing::debug!("下载简繁词典: {}", url);
        let text = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(text)
    }
}

#[async_trait]
impl EngineLoader for RemoteDictionaryLoader {
    async fn load(&self) -> PageResult<Arc<dyn ConversionEngine>> {
        let (st_phrases, st_chars, ts_phrases, ts_chars) = futures::try_join!(
            self.fetch(ST_PHRASES),
            self.fetch(ST_CHARACTERS),
            self.fetch(TS_PHRASES),
            self.fetch(TS_CHARACTERS),
        )?;

        let engine = PhraseEngine::from_opencc(
            &[st_phrases.as_str(), st_chars.as_str()],
            &[ts_phrases.as_str(), ts_chars.as_str()],
        )?;
        tracing::debug!("简繁词典条目数: {}", engine.entry_count());
        Ok(Arc::new(engine))
    }
}
