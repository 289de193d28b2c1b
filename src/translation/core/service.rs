//! 远程翻译服务
//!
//! 把页面上剩余的可见文本按批次送去远程翻译接口，并按位置写回。整个流程是尽力而为的：
//!
//! 1. 收集 `<body>` 中可翻译的文本节点（见 [`TextCollector`]）
//! 2. 按固定大小切分批次
//! 3. 以有限并发发送请求，按批次顺序处理结果
//! 4. 归一化响应形态，必要时用分隔符拼接重发
//! 5. 写回译文；单个批次失败只影响该批次
//!
//! 同一时间只允许一次翻译任务，第二次调用直接返回 [`PageError::PassInFlight`]。

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use markup5ever_rcdom::Handle;
use tokio::sync::watch;

use crate::error::{helpers::log_error, PageError, PageResult};
use crate::locale::{Locale, LocaleContext, PassTicket};
use crate::parsers::html::set_text_of;
use crate::translation::client::{Query, TranslateRequest, TranslationBackend};
use crate::translation::pipeline::{
    create_batches, Batch, CollectorConfig, TextCollector, DEFAULT_BATCH_SIZE,
};
use crate::translation::response::{
    contains_marker, join_texts, normalize_response, split_joined, TranslationResponse,
};
use crate::translation::status::{StatusHandle, TranslationStatus};

/// 远程翻译配置
#[derive(Debug, Clone)]
pub struct RemoteTranslatorConfig {
    /// 每批文本条数
    pub batch_size: usize,
    /// 同时进行的请求数
    pub max_concurrent_batches: usize,
    /// 翻译接口密钥，可为空
    pub api_key: String,
}

impl Default for RemoteTranslatorConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_concurrent_batches: 2,
            api_key: String::new(),
        }
    }
}

/// 一次翻译任务的结果汇总
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    /// 目标语言
    pub target: Locale,
    /// 收集到的文本条数
    pub items: usize,
    /// 批次数
    pub batches: usize,
    /// 实际写回的文本条数
    pub translated: usize,
    /// 失败的批次数（传输错误或无法识别的响应）
    pub failed_batches: usize,
    /// 因语言已切换而丢弃的批次数
    pub stale_batches: usize,
}

impl PassReport {
    fn new(target: Locale, items: usize, batches: usize) -> Self {
        Self {
            target,
            items,
            batches,
            translated: 0,
            failed_batches: 0,
            stale_batches: 0,
        }
    }

    /// 有批次且全部失败
    pub fn all_failed(&self) -> bool {
        self.batches > 0 && self.failed_batches == self.batches
    }
}

/// 任务结束前被丢弃时把状态恢复为 `Idle`
struct PassGuard<'a> {
    status: &'a StatusHandle,
    finished: bool,
}

impl PassGuard<'_> {
    fn finish(mut self, status: TranslationStatus) {
        self.finished = true;
        self.status.set(status);
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.status.set(TranslationStatus::Idle);
        }
    }
}

/// 远程翻译器
pub struct RemoteTranslator {
    backend: Arc<dyn TranslationBackend>,
    context: LocaleContext,
    config: RemoteTranslatorConfig,
    status: StatusHandle,
}

impl RemoteTranslator {
    /// 创建远程翻译器
    ///
    /// # 参数
    ///
    /// * `backend` - 翻译接口
    /// * `context` - 与语言管理器共享的当前语言句柄，用于丢弃过期结果
    /// * `config` - 批次大小、并发数与接口密钥
    pub fn new(
        backend: Arc<dyn TranslationBackend>,
        context: LocaleContext,
        config: RemoteTranslatorConfig,
    ) -> Self {
        Self {
            backend,
            context,
            config,
            status: StatusHandle::new(),
        }
    }

    /// 改用另一个语言句柄判断结果是否过期
    pub(crate) fn bind_context(&mut self, context: LocaleContext) {
        self.context = context;
    }

    pub fn config(&self) -> &RemoteTranslatorConfig {
        &self.config
    }

    /// 订阅翻译状态
    pub fn subscribe(&self) -> watch::Receiver<TranslationStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> TranslationStatus {
        self.status.current()
    }

    /// 翻译页面上的可见文本
    ///
    /// 收集 `document` 中未被词典覆盖的文本，按批次请求 `ticket.locale` 的译文并写回。
    /// 单个批次的网络错误或响应形态错误只会被记录并跳过；所有批次都失败时状态为
    /// `Failed`，但仍返回 `Ok(report)`。
    ///
    /// # 错误
    ///
    /// - 已有任务在进行时返回 `PageError::PassInFlight`
    pub async fn translate_visible_text(
        &self,
        document: &Handle,
        ticket: PassTicket,
    ) -> PageResult<PassReport> {
        let target = ticket.locale.code();
        if !self.status.try_begin(target) {
            tracing::info!("已有翻译任务在进行，拒绝新的 {} 翻译请求", target);
            return Err(PageError::PassInFlight);
        }
        let guard = PassGuard {
            status: &self.status,
            finished: false,
        };

        let report = self.run_pass(document, ticket).await;

        if report.all_failed() {
            tracing::error!("远程翻译失败: {} 个批次全部失败", report.batches);
            guard.finish(TranslationStatus::Failed(target.to_string()));
        } else {
            tracing::info!(
                "远程翻译完成: {} 段文本, {} 个批次, 写回 {} 段, 失败 {} 批, 过期 {} 批",
                report.items,
                report.batches,
                report.translated,
                report.failed_batches,
                report.stale_batches
            );
            guard.finish(TranslationStatus::Completed(target.to_string()));
        }

        Ok(report)
    }

    async fn run_pass(&self, document: &Handle, ticket: PassTicket) -> PassReport {
        let mut collector = TextCollector::new(CollectorConfig::remote());
        let items = collector.collect(document);
        let item_count = items.len();
        let batches = create_batches(items, self.config.batch_size);
        let mut report = PassReport::new(ticket.locale, item_count, batches.len());

        if batches.is_empty() {
            tracing::info!("没有需要远程翻译的文本");
            return report;
        }

        tracing::info!(
            "开始远程翻译到 {}: {} 段文本, {} 个批次",
            ticket.locale,
            item_count,
            batches.len()
        );

        let target = ticket.locale.code();
        let requests = batches
            .iter()
            .map(|batch| self.fetch_batch(batch.texts(), target));
        let mut outcomes = stream::iter(requests).buffered(self.config.max_concurrent_batches.max(1));

        let mut pending = batches.iter();
        while let Some(outcome) = outcomes.next().await {
            let Some(batch) = pending.next() else {
                break;
            };

            if !self.context.is_current(&ticket) {
                tracing::debug!("语言已切换，丢弃批次 {} 的结果", batch.id + 1);
                report.stale_batches += 1;
                continue;
            }

            match outcome {
                Ok(translations) => {
                    report.translated += apply_batch(batch, &translations);
                }
                Err(e) => {
                    log_error(&e.with_context(format!("批次 {} 已跳过", batch.id + 1)));
                    report.failed_batches += 1;
                }
            }
        }

        report
    }

    /// 请求一个批次的译文并归一化为逐项结果
    async fn fetch_batch(&self, texts: Vec<String>, target: &str) -> PageResult<Vec<String>> {
        let expected = texts.len();
        let request = TranslateRequest::new(
            Query::Batch(texts.clone()),
            target,
            &self.config.api_key,
        );
        let value = self.backend.translate(&request).await?;

        match normalize_response(&value) {
            Some(TranslationResponse::Items(items)) => Ok(items),
            Some(TranslationResponse::Single(text)) if expected <= 1 => Ok(vec![text]),
            Some(TranslationResponse::Single(text)) if contains_marker(&text) => {
                Ok(split_joined(&text, expected))
            }
            Some(TranslationResponse::Single(_)) => self.fetch_joined(&texts, target).await,
            None => Err(unexpected(&value)),
        }
    }

    /// 用分隔符拼接整批文本重发，再按分隔符拆分
    async fn fetch_joined(&self, texts: &[String], target: &str) -> PageResult<Vec<String>> {
        tracing::debug!("响应为单个字符串，改用拼接方式重发 {} 段文本", texts.len());
        let request = TranslateRequest::new(
            Query::Joined(join_texts(texts)),
            target,
            &self.config.api_key,
        );
        let value = self.backend.translate(&request).await?;

        let parts = match normalize_response(&value) {
            Some(TranslationResponse::Single(text)) => split_joined(&text, texts.len()),
            Some(TranslationResponse::Items(items)) if items.len() == 1 => {
                split_joined(&items[0], texts.len())
            }
            Some(TranslationResponse::Items(items)) => items,
            None => return Err(unexpected(&value)),
        };

        // 拼接译文无法按位置对应时整批作废
        if parts.len() != texts.len() {
            return Err(PageError::UnexpectedResponse(format!(
                "拼接译文拆分后为 {} 段，期望 {} 段",
                parts.len(),
                texts.len()
            )));
        }
        Ok(parts)
    }
}

fn unexpected(value: &serde_json::Value) -> PageError {
    let body: String = value.to_string().chars().take(120).collect();
    PageError::UnexpectedResponse(body)
}

/// 按位置写回，返回写回条数；空译文保留原文
fn apply_batch(batch: &Batch, translations: &[String]) -> usize {
    if translations.len() != batch.len() {
        tracing::warn!(
            "批次 {} 译文数量不一致: 期望 {}，实际 {}，只写回重叠部分",
            batch.id + 1,
            batch.len(),
            translations.len()
        );
    }

    let mut applied = 0;
    for (item, translated) in batch.items.iter().zip(translations) {
        if translated.trim().is_empty() {
            continue;
        }
        if set_text_of(&item.node, translated) {
            applied += 1;
        }
    }

    tracing::debug!("批次 {} 写回 {}/{} 段", batch.id + 1, applied, batch.len());
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::{html_to_dom, text_content};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    /// 按调用顺序返回预设响应
    struct ScriptedBackend {
        responses: Mutex<Vec<PageResult<Value>>>,
        requests: Mutex<Vec<TranslateRequest>>,
    }

    impl ScriptedBackend {
        fn new(responses: Vec<PageResult<Value>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TranslationBackend for ScriptedBackend {
        async fn translate(&self, request: &TranslateRequest) -> PageResult<Value> {
            self.requests.lock().unwrap().push(request.clone());
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Err(PageError::Network("no scripted response".into()));
            }
            responses.remove(0)
        }
    }

    fn translator(backend: Arc<ScriptedBackend>, context: LocaleContext) -> RemoteTranslator {
        RemoteTranslator::new(backend, context, RemoteTranslatorConfig::default())
    }

    #[tokio::test]
    async fn test_single_string_for_multi_item_batch_is_reissued_joined() {
        let dom = html_to_dom(
            "<html><body><p>歡迎光臨</p><p>主日崇拜</p></body></html>".as_bytes(),
            "utf-8",
        )
        .unwrap();
        let backend = Arc::new(ScriptedBackend::new(vec![
            Ok(json!({"translatedText": "Welcome Sunday worship"})),
            Ok(json!({"translatedText": "Welcome\n\n---SPLIT---\n\nSunday worship"})),
        ]));
        let context = LocaleContext::new(Locale::ZhHant);
        let ticket = context.begin_switch(Locale::En);
        let translator = translator(backend.clone(), context);

        let report = translator
            .translate_visible_text(&dom.document, ticket)
            .await
            .unwrap();

        assert_eq!(report.translated, 2);
        let requests = backend.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[1].q,
            Query::Joined("歡迎光臨\n\n---SPLIT---\n\n主日崇拜".to_string())
        );
        assert_eq!(text_content(&dom.document).trim(), "WelcomeSunday worship");
        assert_eq!(
            translator.status(),
            TranslationStatus::Completed("en".to_string())
        );
    }

    #[tokio::test]
    async fn test_count_mismatch_applies_prefix() {
        let dom = html_to_dom(
            "<html><body><p>第一段</p><p>第二段</p></body></html>".as_bytes(),
            "utf-8",
        )
        .unwrap();
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(json!(["First"]))]));
        let context = LocaleContext::new(Locale::ZhHant);
        let ticket = context.begin_switch(Locale::En);

        let report = translator(backend, context)
            .translate_visible_text(&dom.document, ticket)
            .await
            .unwrap();

        assert_eq!(report.translated, 1);
        assert_eq!(report.failed_batches, 0);
        assert_eq!(text_content(&dom.document), "First第二段");
    }

    #[tokio::test]
    async fn test_joined_reissue_without_marker_fails_batch() {
        let dom = html_to_dom(
            "<html><body><p>歡迎光臨</p><p>主日崇拜</p></body></html>".as_bytes(),
            "utf-8",
        )
        .unwrap();
        let backend = Arc::new(ScriptedBackend::new(vec![
            Ok(json!({"translatedText": "Welcome Sunday worship"})),
            Ok(json!({"translatedText": "Welcome to Sunday worship"})),
        ]));
        let context = LocaleContext::new(Locale::ZhHant);
        let ticket = context.begin_switch(Locale::En);
        let translator = translator(backend, context);

        let report = translator
            .translate_visible_text(&dom.document, ticket)
            .await
            .unwrap();

        assert_eq!(report.translated, 0);
        assert_eq!(report.failed_batches, 1);
        assert!(report.all_failed());
        assert_eq!(text_content(&dom.document), "歡迎光臨主日崇拜");
        assert_eq!(translator.status(), TranslationStatus::Failed("en".to_string()));
    }

    #[tokio::test]
    async fn test_empty_page_completes() {
        let dom = html_to_dom("<html><body><p>A</p></body></html>".as_bytes(), "utf-8").unwrap();
        let backend = Arc::new(ScriptedBackend::new(Vec::new()));
        let context = LocaleContext::new(Locale::ZhHant);
        let ticket = context.begin_switch(Locale::Fr);
        let translator = translator(backend.clone(), context);

        let report = translator
            .translate_visible_text(&dom.document, ticket)
            .await
            .unwrap();

        assert_eq!(report.batches, 0);
        assert!(!report.all_failed());
        assert!(backend.requests.lock().unwrap().is_empty());
        assert_eq!(translator.status(), TranslationStatus::Completed("fr".into()));
    }
}
