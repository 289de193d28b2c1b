//! 语言切换状态机
//!
//! `Uninitialized → Detecting → Ready`，之后每次切换 `Ready → Applying(locale) → Ready`。
//! 管理器是词典、简繁转换和远程翻译的唯一调用方，按 [`LocaleTable`] 中的策略分派。

use std::cell::Cell;

use markup5ever_rcdom::Handle;
use tokio::sync::watch;

use super::detect::{detect_locale, Detection, LanguagePreferences};
use super::selector::{self, BUSY_LABEL, ERROR_LABEL};
use super::{Locale, LocaleContext, LocaleStore, LocaleStrategy, LocaleTable, PassTicket};
use crate::core::Page;
use crate::dictionary::TranslationDictionary;
use crate::error::{helpers::log_error, PageError, PageResult};
use crate::script::{ConversionMode, ScriptConverter};
use crate::translation::{
    CollectorConfig, PassReport, RemoteTranslator, TextCollector, TranslationStatus,
};

/// 管理器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    Uninitialized,
    Detecting,
    Ready,
    Applying(Locale),
}

/// 一次切换的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// 选择的就是当前语言
    Unchanged,
    /// 回到原文语言：页面已重新加载
    Reloaded { dictionary_updates: usize },
    /// 词典 + 简繁转换
    Converted {
        dictionary_updates: usize,
        converted: usize,
    },
    /// 词典 + 远程翻译（至少部分成功）
    Translated {
        dictionary_updates: usize,
        report: PassReport,
    },
    /// 远程翻译失败；词典结果保留
    TranslationFailed {
        dictionary_updates: usize,
        reason: String,
    },
    /// 未配置远程翻译，只应用了词典
    DictionaryOnly { dictionary_updates: usize },
}

/// 初始化结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Initialized {
    pub detection: Detection,
    pub outcome: SwitchOutcome,
}

/// 切换结束（包括中途被丢弃）时回到 `Ready`
struct ApplyingGuard<'a> {
    state: &'a Cell<ManagerState>,
}

impl Drop for ApplyingGuard<'_> {
    fn drop(&mut self) {
        self.state.set(ManagerState::Ready);
    }
}

/// 语言管理器
pub struct LocaleManager {
    table: LocaleTable,
    default_locale: Locale,
    context: LocaleContext,
    store: Box<dyn LocaleStore>,
    dictionary: TranslationDictionary,
    converter: ScriptConverter,
    translator: Option<RemoteTranslator>,
    state: Cell<ManagerState>,
}

impl LocaleManager {
    /// 使用内置词典、内置字表，不做远程翻译
    pub fn new(table: LocaleTable, store: Box<dyn LocaleStore>) -> Self {
        let native = table.native();
        Self {
            default_locale: native,
            context: LocaleContext::new(native),
            table,
            store,
            dictionary: TranslationDictionary::builtin(),
            converter: ScriptConverter::table_only(),
            translator: None,
            state: Cell::new(ManagerState::Uninitialized),
        }
    }

    pub fn with_default_locale(mut self, locale: Locale) -> Self {
        self.default_locale = locale;
        self
    }

    /// 替换语言句柄；已配置的远程翻译器同时改用该句柄
    pub fn with_context(mut self, context: LocaleContext) -> Self {
        if let Some(translator) = self.translator.as_mut() {
            translator.bind_context(context.clone());
        }
        self.context = context;
        self
    }

    pub fn with_dictionary(mut self, dictionary: TranslationDictionary) -> Self {
        self.dictionary = dictionary;
        self
    }

    pub fn with_converter(mut self, converter: ScriptConverter) -> Self {
        self.converter = converter;
        self
    }

    /// 远程翻译器改用管理器的语言句柄，切换票据与过期检查始终基于同一个句柄
    pub fn with_translator(mut self, mut translator: RemoteTranslator) -> Self {
        translator.bind_context(self.context.clone());
        self.translator = Some(translator);
        self
    }

    pub fn state(&self) -> ManagerState {
        self.state.get()
    }

    pub fn active_locale(&self) -> Locale {
        self.context.active()
    }

    pub fn context(&self) -> &LocaleContext {
        &self.context
    }

    pub fn table(&self) -> &LocaleTable {
        &self.table
    }

    pub fn dictionary(&self) -> &TranslationDictionary {
        &self.dictionary
    }

    pub fn converter(&self) -> &ScriptConverter {
        &self.converter
    }

    /// 订阅远程翻译状态；未配置远程翻译时返回 `None`
    pub fn subscribe_status(&self) -> Option<watch::Receiver<TranslationStatus>> {
        self.translator.as_ref().map(RemoteTranslator::subscribe)
    }

    /// 检测初始语言，渲染选择器并应用该语言（不写入存储）
    pub async fn initialize(
        &self,
        page: &Page,
        preferences: &LanguagePreferences,
    ) -> PageResult<Initialized> {
        if let ManagerState::Applying(locale) = self.state.get() {
            return Err(PageError::SwitchInProgress(locale.code().to_string()));
        }

        self.state.set(ManagerState::Detecting);
        let detection = detect_locale(
            self.store.as_ref(),
            preferences,
            &self.table,
            self.default_locale,
        );
        tracing::info!("初始语言: {} ({:?})", detection.locale, detection.source);

        self.state.set(ManagerState::Applying(detection.locale));
        let _guard = ApplyingGuard { state: &self.state };

        let ticket = self.context.begin_switch(detection.locale);
        selector::render_selector(&page.document(), &self.table, detection.locale);
        let outcome = self.apply_strategy(page, ticket, false).await?;

        Ok(Initialized { detection, outcome })
    }

    /// 切换语言
    ///
    /// # 错误
    ///
    /// - 尚未初始化：`PageError::NotReady`
    /// - 正在切换：`PageError::SwitchInProgress`
    /// - 语言不在支持列表中：`PageError::UnsupportedLocale`
    /// - 回到原文语言时页面重新解析失败
    ///
    /// 远程翻译失败不是错误，体现在 `SwitchOutcome::TranslationFailed` 中。
    pub async fn select_locale(&self, page: &Page, locale: Locale) -> PageResult<SwitchOutcome> {
        match self.state.get() {
            ManagerState::Uninitialized | ManagerState::Detecting => {
                return Err(PageError::NotReady)
            }
            ManagerState::Applying(current) => {
                tracing::info!("正在切换到 {}，忽略切换到 {} 的请求", current, locale);
                return Err(PageError::SwitchInProgress(current.code().to_string()));
            }
            ManagerState::Ready => {}
        }

        let strategy = self
            .table
            .strategy(locale)
            .ok_or_else(|| PageError::UnsupportedLocale(locale.code().to_string()))?;

        if locale == self.context.active() && strategy != LocaleStrategy::Native {
            return Ok(SwitchOutcome::Unchanged);
        }

        self.state.set(ManagerState::Applying(locale));
        let _guard = ApplyingGuard { state: &self.state };

        tracing::info!("切换语言: {} -> {}", self.context.active(), locale);
        if let Err(e) = self.store.save(locale) {
            log_error(&e.with_context("保存语言偏好失败"));
        }

        let ticket = self.context.begin_switch(locale);
        self.apply_strategy(page, ticket, true).await
    }

    async fn apply_strategy(
        &self,
        page: &Page,
        ticket: PassTicket,
        reload_native: bool,
    ) -> PageResult<SwitchOutcome> {
        let locale = ticket.locale;
        let strategy = self
            .table
            .strategy(locale)
            .ok_or_else(|| PageError::UnsupportedLocale(locale.code().to_string()))?;

        if strategy == LocaleStrategy::Native && reload_native {
            page.reload()?;
            selector::render_selector(&page.document(), &self.table, locale);
        }

        let document = page.document();
        page.set_lang(locale);
        selector::mark_active(&document, locale);
        selector::set_label(&document, locale.label());
        let dictionary_updates = self.dictionary.apply_locale(&document, locale);

        let outcome = match strategy {
            LocaleStrategy::Native if reload_native => {
                SwitchOutcome::Reloaded { dictionary_updates }
            }
            LocaleStrategy::Native => SwitchOutcome::Unchanged,
            LocaleStrategy::Script(mode) => {
                let converted = self.convert_script(&document, mode).await;
                SwitchOutcome::Converted {
                    dictionary_updates,
                    converted,
                }
            }
            LocaleStrategy::Remote => {
                self.translate_remote(&document, ticket, dictionary_updates)
                    .await
            }
        };

        tracing::debug!("语言 {} 应用完成: {:?}", locale, outcome);
        Ok(outcome)
    }

    async fn convert_script(&self, document: &Handle, mode: ConversionMode) -> usize {
        let mut collector = TextCollector::new(CollectorConfig::script());
        let nodes: Vec<Handle> = collector
            .collect(document)
            .into_iter()
            .map(|item| item.node)
            .collect();
        self.converter.convert_items(&nodes, mode).await
    }

    async fn translate_remote(
        &self,
        document: &Handle,
        ticket: PassTicket,
        dictionary_updates: usize,
    ) -> SwitchOutcome {
        let Some(translator) = self.translator.as_ref() else {
            tracing::debug!("未配置远程翻译，只应用词典");
            return SwitchOutcome::DictionaryOnly { dictionary_updates };
        };

        selector::set_label(document, BUSY_LABEL);
        match translator.translate_visible_text(document, ticket).await {
            Ok(report) if report.all_failed() => {
                selector::set_label(document, ERROR_LABEL);
                SwitchOutcome::TranslationFailed {
                    dictionary_updates,
                    reason: format!("{} 个批次全部失败", report.batches),
                }
            }
            Ok(report) => {
                selector::set_label(document, ticket.locale.label());
                SwitchOutcome::Translated {
                    dictionary_updates,
                    report,
                }
            }
            Err(e) => {
                log_error(&e.clone().with_context("远程翻译未执行"));
                selector::set_label(document, ERROR_LABEL);
                SwitchOutcome::TranslationFailed {
                    dictionary_updates,
                    reason: e.to_string(),
                }
            }
        }
    }
}
