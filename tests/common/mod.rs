// 集成测试公共模块
//
// 提供可编排的翻译后端、计数的引擎加载器和HTML样例

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Semaphore;

use page_i18n::error::{PageError, PageResult};
use page_i18n::locale::{Locale, LocaleContext};
use page_i18n::script::{ConversionEngine, EngineLoader, PhraseEngine};
use page_i18n::translation::{
    Query, RemoteTranslator, RemoteTranslatorConfig, TranslateRequest, TranslationBackend,
};
use page_i18n::Page;

type Responder = dyn Fn(&TranslateRequest) -> PageResult<Value> + Send + Sync;

/// 记录请求并按规则响应的翻译后端
///
/// 打开闸门（`gated`）后，每个请求在记录之后会等待 [`MockBackend::release`]。
pub struct MockBackend {
    responder: Box<Responder>,
    requests: Mutex<Vec<TranslateRequest>>,
    gate: Option<Semaphore>,
}

impl MockBackend {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&TranslateRequest) -> PageResult<Value> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// 逐项返回 `[目标语言] 原文`
    pub fn echo() -> Self {
        Self::new(|request| Ok(echo_response(request)))
    }

    /// 所有请求都返回网络错误
    pub fn failing() -> Self {
        Self::new(|_| Err(PageError::Network("connection refused".to_string())))
    }

    pub fn gated(mut self) -> Self {
        self.gate = Some(Semaphore::new(0));
        self
    }

    /// 放行所有等待中的请求以及之后的请求
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1024);
        }
    }

    pub fn requests(&self) -> Vec<TranslateRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// 让出执行权，直到至少收到 `count` 个请求
    pub async fn wait_for_requests(&self, count: usize) {
        while self.request_count() < count {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl TranslationBackend for MockBackend {
    async fn translate(&self, request: &TranslateRequest) -> PageResult<Value> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.gate {
            let _permit = gate
                .acquire()
                .await
                .map_err(|e| PageError::Internal(e.to_string()))?;
        }
        (self.responder)(request)
    }
}

/// 按请求形态生成回声译文
pub fn echo_response(request: &TranslateRequest) -> Value {
    match &request.q {
        Query::Batch(texts) => json!({
            "translatedText": texts
                .iter()
                .map(|text| format!("[{}] {}", request.target, text))
                .collect::<Vec<_>>()
        }),
        Query::Joined(text) => json!({ "translatedText": format!("[{}] {}", request.target, text) }),
    }
}

/// 请求中的第一段文本
pub fn first_text(request: &TranslateRequest) -> Option<&str> {
    match &request.q {
        Query::Batch(texts) => texts.first().map(String::as_str),
        Query::Joined(text) => Some(text.as_str()),
    }
}

pub fn translator(
    backend: Arc<MockBackend>,
    context: LocaleContext,
    batch_size: usize,
) -> RemoteTranslator {
    let config = RemoteTranslatorConfig {
        batch_size,
        ..RemoteTranslatorConfig::default()
    };
    RemoteTranslator::new(backend, context, config)
}

/// 记录加载次数的引擎加载器
pub struct CountingLoader {
    loads: AtomicUsize,
    fail: bool,
}

impl CountingLoader {
    pub fn new() -> Self {
        Self {
            loads: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            loads: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

/// 含一条词组规则的小词典：`头发` ↔ `頭髮`
pub const S2T_SAMPLE: &str = "头发\t頭髮\n发\t發 髮\n头\t頭\n";
pub const T2S_SAMPLE: &str = "頭髮\t头发\n發\t发\n髮\t发\n頭\t头\n";

#[async_trait]
impl EngineLoader for CountingLoader {
    async fn load(&self) -> PageResult<Arc<dyn ConversionEngine>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        // 模拟下载耗时，让并发调用方有机会在加载完成前进入
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        if self.fail {
            return Err(PageError::Network("dictionary download failed".to_string()));
        }
        Ok(Arc::new(PhraseEngine::from_opencc(&[S2T_SAMPLE], &[T2S_SAMPLE])?))
    }
}

/// HTML样例
pub struct HtmlFixtures;

impl HtmlFixtures {
    /// 导航、卡片与普通段落混合的首页
    pub fn home_page() -> &'static str {
        r#"<!DOCTYPE html>
<html lang="zh-Hant">
<head><meta charset="utf-8"><title>生命河</title><style>p { color: red; }</style></head>
<body>
  <nav>
    <a href="/" data-i18n="nav.home">首頁</a>
    <a href="/worship" data-i18n="nav.worship">崇拜聚會</a>
  </nav>
  <section>
    <h2 data-i18n="card.worship">崇拜聚會</h2>
    <p>歡迎來到這個教會</p>
    <p>每個主日我們一起敬拜</p>
    <a href="mailto:info@liferiver.ca">info@liferiver.ca</a>
  </section>
  <script>var greeting = "你好";</script>
  <footer><p data-i18n="footer.copyright">© 2024 多倫多生命河靈糧堂 版權所有</p></footer>
</body>
</html>"#
    }

    /// `count` 个编号段落
    pub fn numbered_paragraphs(count: usize) -> String {
        let paragraphs: String = (1..=count)
            .map(|n| format!("<p>Paragraph {}</p>", n))
            .collect();
        format!("<html lang=\"en\"><body>{}</body></html>", paragraphs)
    }

    pub fn page(html: &str) -> Page {
        Page::from_html(html).expect("fixture should parse")
    }
}

/// 当前语言为原文语言的上下文，以及切换到 `target` 的票据
pub fn switched_context(target: Locale) -> (LocaleContext, page_i18n::locale::PassTicket) {
    let context = LocaleContext::new(Locale::ZhHant);
    let ticket = context.begin_switch(target);
    (context, ticket)
}
