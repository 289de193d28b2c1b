//! 远程翻译接口客户端

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::error::{PageError, PageResult};

/// 默认翻译接口
pub const DEFAULT_API_URL: &str = "https://libretranslate.de/translate";

/// 请求文本：逐项数组或拼接后的单个字符串
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Query {
    Batch(Vec<String>),
    Joined(String),
}

/// 翻译请求体
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslateRequest {
    pub q: Query,
    pub source: String,
    pub target: String,
    pub format: String,
    pub api_key: String,
}

impl TranslateRequest {
    pub fn new(q: Query, target: &str, api_key: &str) -> Self {
        Self {
            q,
            source: "auto".to_string(),
            target: target.to_string(),
            format: "text".to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// 请求中的文本条数
    pub fn text_count(&self) -> usize {
        match &self.q {
            Query::Batch(texts) => texts.len(),
            Query::Joined(_) => 1,
        }
    }
}

/// 翻译后端
///
/// 只负责传输：返回原始 JSON，响应形态由调用方归一化。
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    async fn translate(&self, request: &TranslateRequest) -> PageResult<Value>;
}

/// LibreTranslate 兼容接口客户端
#[derive(Debug, Clone)]
pub struct LibreTranslateClient {
    client: reqwest::Client,
    api_url: Url,
}

impl LibreTranslateClient {
    pub fn new(api_url: &str, timeout: Duration) -> PageResult<Self> {
        let api_url = Url::parse(api_url)?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PageError::Config(format!("创建HTTP客户端失败: {}", e)))?;
        Ok(Self { client, api_url })
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }
}

#[async_trait]
impl TranslationBackend for LibreTranslateClient {
    async fn translate(&self, request: &TranslateRequest) -> PageResult<Value> {
        tracing::debug!(
            "POST {} ({} 段文本, 目标语言 {})",
            self.api_url,
            request.text_count(),
            request.target
        );

        let response = self
            .client
            .post(self.api_url.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PageError::Http {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        Ok(response.json::<Value>().await?)
    }
}
