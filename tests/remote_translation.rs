//! 远程翻译集成测试
//!
//! 分批、部分失败、响应形态归一化、并发任务与过期结果

use std::sync::Arc;

use serde_json::json;

use page_i18n::error::PageError;
use page_i18n::locale::selector::{current_label, ERROR_LABEL};
use page_i18n::locale::{
    LanguagePreferences, Locale, LocaleContext, LocaleManager, LocaleTable, MemoryLocaleStore,
    SwitchOutcome,
};
use page_i18n::parsers::html::{find_nodes, text_content};
use page_i18n::translation::{Query, TranslationStatus};

mod common {
    include!("common/mod.rs");
}

use common::{first_text, switched_context, translator, HtmlFixtures, MockBackend};

fn paragraph_texts(document: &markup5ever_rcdom::Handle) -> Vec<String> {
    find_nodes(document, &["p"])
        .iter()
        .map(text_content)
        .collect()
}

#[tokio::test]
async fn test_failed_middle_batch_leaves_others_applied() {
    let page = HtmlFixtures::page(&HtmlFixtures::numbered_paragraphs(25));
    let backend = Arc::new(MockBackend::new(|request| {
        if first_text(request) == Some("Paragraph 11") {
            Err(PageError::Http {
                status: 502,
                message: "bad gateway".to_string(),
            })
        } else {
            Ok(common::echo_response(request))
        }
    }));
    let (context, ticket) = switched_context(Locale::En);
    let translator = translator(backend.clone(), context, 10);

    let report = translator
        .translate_visible_text(&page.document(), ticket)
        .await
        .unwrap();

    assert_eq!(report.items, 25);
    assert_eq!(report.batches, 3);
    assert_eq!(report.failed_batches, 1);
    assert_eq!(report.translated, 20);
    assert!(!report.all_failed());

    let texts = paragraph_texts(&page.document());
    assert_eq!(texts[0], "[en] Paragraph 1");
    assert_eq!(texts[9], "[en] Paragraph 10");
    assert_eq!(texts[10], "Paragraph 11");
    assert_eq!(texts[19], "Paragraph 20");
    assert_eq!(texts[20], "[en] Paragraph 21");
    assert_eq!(texts[24], "[en] Paragraph 25");

    let requests = backend.requests();
    assert_eq!(requests.len(), 3);
    assert!(requests.iter().all(|request| request.target == "en" && request.source == "auto"));
    assert_eq!(translator.status(), TranslationStatus::Completed("en".to_string()));
}

#[tokio::test]
async fn test_joined_request_split_on_separator() {
    let page = HtmlFixtures::page("<html><body><p>第一段文字</p><p>第二段文字</p></body></html>");
    let backend = Arc::new(MockBackend::new(|request| match &request.q {
        Query::Batch(_) => Ok(json!({ "translatedText": "foo bar" })),
        Query::Joined(_) => Ok(json!({ "translatedText": "foo\n\n---SPLIT---\n\nbar" })),
    }));
    let (context, ticket) = switched_context(Locale::En);
    let translator = translator(backend.clone(), context, 10);

    let report = translator
        .translate_visible_text(&page.document(), ticket)
        .await
        .unwrap();

    assert_eq!(report.translated, 2);
    assert_eq!(paragraph_texts(&page.document()), vec!["foo", "bar"]);

    let requests = backend.requests();
    assert_eq!(requests.len(), 2);
    assert!(matches!(&requests[1].q, Query::Joined(joined) if joined.contains("---SPLIT---")));
}

#[tokio::test]
async fn test_translations_array_of_objects() {
    let page = HtmlFixtures::page("<html><body><p>主日崇拜</p><p>查經小組</p></body></html>");
    let backend = Arc::new(MockBackend::new(|_| {
        Ok(json!({
            "translations": [
                { "translatedText": "Culte du dimanche" },
                { "translatedText": "Groupe biblique" }
            ]
        }))
    }));
    let (context, ticket) = switched_context(Locale::Fr);
    let translator = translator(backend, context, 10);

    translator
        .translate_visible_text(&page.document(), ticket)
        .await
        .unwrap();

    assert_eq!(
        paragraph_texts(&page.document()),
        vec!["Culte du dimanche", "Groupe biblique"]
    );
}

#[tokio::test]
async fn test_unrecognized_shape_fails_pass() {
    let page = HtmlFixtures::page("<html><body><p>主日崇拜</p></body></html>");
    let backend = Arc::new(MockBackend::new(|_| Ok(json!({ "error": "quota exceeded" }))));
    let (context, ticket) = switched_context(Locale::Fr);
    let translator = translator(backend, context, 10);

    let report = translator
        .translate_visible_text(&page.document(), ticket)
        .await
        .unwrap();

    assert!(report.all_failed());
    assert_eq!(paragraph_texts(&page.document()), vec!["主日崇拜"]);
    assert_eq!(translator.status(), TranslationStatus::Failed("fr".to_string()));
}

#[tokio::test]
async fn test_second_pass_rejected_while_in_flight() {
    let page = HtmlFixtures::page(&HtmlFixtures::numbered_paragraphs(3));
    let document = page.document();
    let backend = Arc::new(MockBackend::echo().gated());
    let (context, ticket) = switched_context(Locale::En);
    let translator = translator(backend.clone(), context.clone(), 10);

    let (first, second) = tokio::join!(
        translator.translate_visible_text(&document, ticket),
        async {
            backend.wait_for_requests(1).await;
            assert!(translator.status().is_busy());
            let second = translator
                .translate_visible_text(&document, context.ticket())
                .await;
            backend.release();
            second
        }
    );

    assert!(matches!(second, Err(PageError::PassInFlight)));
    assert_eq!(first.unwrap().translated, 3);
    assert_eq!(backend.request_count(), 1);
    assert_eq!(translator.status(), TranslationStatus::Completed("en".to_string()));
}

#[tokio::test]
async fn test_results_discarded_after_locale_changes() {
    let page = HtmlFixtures::page(&HtmlFixtures::numbered_paragraphs(4));
    let document = page.document();
    let backend = Arc::new(MockBackend::echo().gated());
    let (context, ticket) = switched_context(Locale::En);
    let translator = translator(backend.clone(), context.clone(), 2);

    let (report, _) = tokio::join!(
        translator.translate_visible_text(&document, ticket),
        async {
            backend.wait_for_requests(1).await;
            context.begin_switch(Locale::Fr);
            backend.release();
        }
    );

    let report = report.unwrap();
    assert_eq!(report.batches, 2);
    assert_eq!(report.stale_batches, 2);
    assert_eq!(report.translated, 0);
    assert_eq!(
        paragraph_texts(&document),
        vec!["Paragraph 1", "Paragraph 2", "Paragraph 3", "Paragraph 4"]
    );
}

fn remote_manager(backend: Arc<MockBackend>) -> LocaleManager {
    let context = LocaleContext::new(Locale::ZhHant);
    let translator = translator(backend, context.clone(), 12);
    LocaleManager::new(
        LocaleTable::new(Locale::ZhHant, &Locale::ALL),
        Box::new(MemoryLocaleStore::new()),
    )
    .with_context(context)
    .with_translator(translator)
}

#[tokio::test]
async fn test_manager_translates_untagged_text() {
    let page = HtmlFixtures::page(HtmlFixtures::home_page());
    let backend = Arc::new(MockBackend::echo());
    let manager = remote_manager(backend.clone());
    manager
        .initialize(&page, &LanguagePreferences::default())
        .await
        .unwrap();

    let outcome = manager.select_locale(&page, Locale::En).await.unwrap();
    let SwitchOutcome::Translated {
        dictionary_updates,
        report,
    } = outcome
    else {
        panic!("expected a translated outcome, got {:?}", outcome);
    };
    assert_eq!(dictionary_updates, 4);
    assert_eq!(report.items, 2);
    assert_eq!(report.translated, 2);

    let html = page.to_html_string().unwrap();
    assert!(html.contains(">Home</a>"));
    assert!(html.contains("<p>[en] 歡迎來到這個教會</p>"));
    assert!(html.contains("<p>[en] 每個主日我們一起敬拜</p>"));
    assert!(html.contains(">info@liferiver.ca</a>"));
    assert!(html.contains(r#"var greeting = "你好";"#));
    assert!(html.contains("<html lang=\"en\">"));
    assert_eq!(current_label(&page.document()).as_deref(), Some("EN"));

    // 选择器和词典元素都不会送去翻译
    for request in backend.requests() {
        let Query::Batch(texts) = &request.q else {
            panic!("unexpected joined request");
        };
        assert!(texts.iter().all(|text| text != "繁體" && text != "Home"));
    }
}

#[tokio::test]
async fn test_manager_all_batches_failing_shows_error() {
    let page = HtmlFixtures::page(HtmlFixtures::home_page());
    let manager = remote_manager(Arc::new(MockBackend::failing()));
    let status = manager.subscribe_status().unwrap();
    manager
        .initialize(&page, &LanguagePreferences::default())
        .await
        .unwrap();

    let outcome = manager.select_locale(&page, Locale::Fr).await.unwrap();

    assert!(matches!(outcome, SwitchOutcome::TranslationFailed { dictionary_updates: 4, .. }));
    assert_eq!(current_label(&page.document()).as_deref(), Some(ERROR_LABEL));
    assert_eq!(*status.borrow(), TranslationStatus::Failed("fr".to_string()));
    // 词典部分仍然生效
    assert!(page.to_html_string().unwrap().contains(">Accueil</a>"));
    assert_eq!(manager.active_locale(), Locale::Fr);
}

#[tokio::test]
async fn test_curated_text_inside_tagged_element_kept() {
    let page = HtmlFixtures::page(
        r#"<html lang="zh-Hant"><body>
        <nav><a href="/" data-i18n="nav.home"><span>首頁</span></a></nav>
        <p>歡迎來到這個教會</p>
    </body></html>"#,
    );
    let backend = Arc::new(MockBackend::echo());
    let manager = remote_manager(backend.clone());
    manager
        .initialize(&page, &LanguagePreferences::default())
        .await
        .unwrap();

    let outcome = manager.select_locale(&page, Locale::En).await.unwrap();
    assert!(matches!(
        outcome,
        SwitchOutcome::Translated { ref report, .. } if report.items == 1 && report.translated == 1
    ));

    let html = page.to_html_string().unwrap();
    assert!(html.contains(r#"<a href="/" data-i18n="nav.home"><span>Home</span></a>"#));
    assert!(html.contains("<p>[en] 歡迎來到這個教會</p>"));
    let Query::Batch(texts) = &backend.requests()[0].q else {
        panic!("unexpected joined request");
    };
    assert_eq!(texts, &vec!["歡迎來到這個教會".to_string()]);
}

#[tokio::test]
async fn test_translator_follows_manager_context() {
    let table = || LocaleTable::new(Locale::ZhHant, &Locale::ALL);

    // 翻译器用独立句柄构建，或在之后替换管理器的句柄
    let backend = Arc::new(MockBackend::echo());
    let unshared = LocaleManager::new(table(), Box::new(MemoryLocaleStore::new()))
        .with_translator(translator(backend.clone(), LocaleContext::new(Locale::ZhHant), 12));
    let replaced = LocaleManager::new(table(), Box::new(MemoryLocaleStore::new()))
        .with_translator(translator(backend, LocaleContext::new(Locale::ZhHant), 12))
        .with_context(LocaleContext::new(Locale::ZhHant));

    for manager in [unshared, replaced] {
        let page = HtmlFixtures::page("<html lang=\"zh-Hant\"><body><p>主日崇拜</p></body></html>");
        manager
            .initialize(&page, &LanguagePreferences::default())
            .await
            .unwrap();

        let outcome = manager.select_locale(&page, Locale::En).await.unwrap();
        let SwitchOutcome::Translated { report, .. } = outcome else {
            panic!("expected a translated outcome, got {:?}", outcome);
        };
        assert_eq!(report.stale_batches, 0);
        assert_eq!(report.translated, 1);
        assert_eq!(paragraph_texts(&page.document()), vec!["[en] 主日崇拜"]);
    }
}
