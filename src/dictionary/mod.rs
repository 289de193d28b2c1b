//! 键值翻译词典
//!
//! 页面中带 `data-i18n="key"` 的元素由词典直接替换文本。词典在启动时加载一次，
//! 之后只读。

pub mod builtin;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use markup5ever_rcdom::Handle;

use crate::error::{PageError, PageResult};
use crate::locale::Locale;
use crate::parsers::html::{
    find_elements_with_attr, first_text_descendant, get_node_attr, has_element_children,
    set_text_content, set_text_of, text_content, text_of, I18N_ATTR,
};

/// 翻译词典：键 → (语言 → 文本)
#[derive(Debug, Clone, Default)]
pub struct TranslationDictionary {
    entries: HashMap<String, HashMap<Locale, String>>,
}

impl TranslationDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// 内置词典
    pub fn builtin() -> Self {
        let mut dictionary = Self::new();
        for &(key, hant, hans, en, fr) in builtin::ENTRIES {
            dictionary.insert(key, Locale::ZhHant, hant);
            dictionary.insert(key, Locale::ZhHans, hans);
            dictionary.insert(key, Locale::En, en);
            dictionary.insert(key, Locale::Fr, fr);
        }
        dictionary
    }

    /// 从 `{"key": {"zh-Hant": "...", "en": "..."}}` 形式的 JSON 构建
    pub fn from_json_str(json: &str) -> PageResult<Self> {
        let raw: HashMap<String, HashMap<String, String>> = serde_json::from_str(json)?;
        let mut dictionary = Self::new();

        for (key, translations) in raw {
            for (code, text) in translations {
                match code.parse::<Locale>() {
                    Ok(locale) => dictionary.insert(&key, locale, &text),
                    Err(_) => tracing::warn!("词典键 {} 含有不支持的语言 {}，已忽略", key, code),
                }
            }
        }

        Ok(dictionary)
    }

    /// 合并目录下的逐语言文件 `<dir>/<locale>.json`（内容为 `{"key": "text"}`）
    ///
    /// 不存在的文件直接跳过，返回读取到的条目数。
    pub fn load_locale_dir(&mut self, dir: &Path) -> PageResult<usize> {
        let mut loaded = 0;

        for locale in Locale::ALL {
            let path = dir.join(format!("{}.json", locale.code()));
            if !path.is_file() {
                tracing::debug!("词典文件不存在，跳过: {}", path.display());
                continue;
            }

            let content = fs::read_to_string(&path)
                .map_err(|e| PageError::from(e).with_context(path.display()))?;
            let entries: HashMap<String, String> = serde_json::from_str(&content)
                .map_err(|e| PageError::from(e).with_context(path.display()))?;

            loaded += entries.len();
            for (key, text) in entries {
                self.insert(&key, locale, &text);
            }
            tracing::info!("已加载 {} 词典: {}", locale, path.display());
        }

        Ok(loaded)
    }

    pub fn insert(&mut self, key: &str, locale: Locale, text: &str) {
        self.entries
            .entry(key.to_string())
            .or_default()
            .insert(locale, text.to_string());
    }

    pub fn lookup(&self, key: &str, locale: Locale) -> Option<&str> {
        self.entries
            .get(key)
            .and_then(|translations| translations.get(&locale))
            .map(String::as_str)
    }

    /// 查询译文，缺失时返回键本身
    pub fn translate<'a>(&'a self, key: &'a str, locale: Locale) -> &'a str {
        self.lookup(key, locale).unwrap_or(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 把词典应用到文档中所有带 `data-i18n` 的元素
    ///
    /// 没有子元素的元素整体替换为单个文本节点；含子元素的只改第一个非空白文本节点，
    /// 保留子元素结构。缺少译文的元素不变。返回内容有变化的元素数。
    pub fn apply_locale(&self, document: &Handle, locale: Locale) -> usize {
        let mut updated = 0;

        for element in find_elements_with_attr(document, I18N_ATTR) {
            let Some(key) = get_node_attr(&element, I18N_ATTR) else {
                continue;
            };
            let Some(text) = self.lookup(&key, locale) else {
                continue;
            };

            if has_element_children(&element) {
                if let Some(node) = first_text_descendant(&element) {
                    if text_of(&node).as_deref() != Some(text) && set_text_of(&node, text) {
                        updated += 1;
                    }
                }
            } else if text_content(&element) != text {
                set_text_content(&element, text);
                updated += 1;
            }
        }

        tracing::debug!("词典应用 {}: 更新 {} 个元素", locale, updated);
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::{html_to_dom, serialize_document};
    use std::io::Write;

    fn render(document: &Handle) -> String {
        String::from_utf8(serialize_document(document, "utf-8").unwrap()).unwrap()
    }

    #[test]
    fn test_builtin_lookup_and_fallback() {
        let dictionary = TranslationDictionary::builtin();
        assert_eq!(dictionary.translate("nav.home", Locale::Fr), "Accueil");
        assert_eq!(dictionary.translate("nav.home", Locale::ZhHans), "首页");
        assert_eq!(dictionary.translate("nav.unknown", Locale::En), "nav.unknown");
        assert_eq!(dictionary.len(), builtin::ENTRIES.len());
    }

    #[test]
    fn test_apply_locale_is_idempotent() {
        let dom = html_to_dom(
            r#"<html><body><a data-i18n="nav.about">關於我們</a><p data-i18n="button.more">了解更多</p></body></html>"#
                .as_bytes(),
            "utf-8",
        )
        .unwrap();
        let dictionary = TranslationDictionary::builtin();

        assert_eq!(dictionary.apply_locale(&dom.document, Locale::En), 2);
        let once = render(&dom.document);
        assert_eq!(dictionary.apply_locale(&dom.document, Locale::En), 0);
        assert_eq!(render(&dom.document), once);
        assert!(once.contains(r#"<a data-i18n="nav.about">About</a>"#));
    }

    #[test]
    fn test_key_missing_for_locale_leaves_text() {
        let mut dictionary = TranslationDictionary::new();
        dictionary.insert("hero.title", Locale::En, "River of Life");
        let dom = html_to_dom(
            r#"<html><body><h1 data-i18n="hero.title">生命河</h1></body></html>"#.as_bytes(),
            "utf-8",
        )
        .unwrap();

        assert_eq!(dictionary.apply_locale(&dom.document, Locale::Fr), 0);
        assert!(render(&dom.document).contains("<h1 data-i18n=\"hero.title\">生命河</h1>"));
    }

    #[test]
    fn test_first_text_node_replaced_children_kept() {
        let dom = html_to_dom(
            r#"<html><body><h2 data-i18n="card.future">未來聖所<br><small>2025</small></h2></body></html>"#
                .as_bytes(),
            "utf-8",
        )
        .unwrap();
        TranslationDictionary::builtin().apply_locale(&dom.document, Locale::En);

        assert!(render(&dom.document)
            .contains(r#"<h2 data-i18n="card.future">Future Sanctuary<br><small>2025</small></h2>"#));
    }

    #[test]
    fn test_from_json_ignores_unknown_locales() {
        let dictionary = TranslationDictionary::from_json_str(
            r#"{"nav.home": {"zh-Hant": "首頁", "de": "Startseite", "en": "Home"}}"#,
        )
        .unwrap();
        assert_eq!(dictionary.lookup("nav.home", Locale::En), Some("Home"));
        assert_eq!(dictionary.lookup("nav.home", Locale::Fr), None);
        assert!(TranslationDictionary::from_json_str("[1, 2]").is_err());
    }

    #[test]
    fn test_load_locale_dir_merges_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = fs::File::create(dir.path().join("fr.json")).unwrap();
        file.write_all(r#"{"nav.home": "Page d'accueil", "hero.title": "Rivière de Vie"}"#.as_bytes())
            .unwrap();

        let mut dictionary = TranslationDictionary::builtin();
        assert_eq!(dictionary.load_locale_dir(dir.path()).unwrap(), 2);
        assert_eq!(dictionary.translate("nav.home", Locale::Fr), "Page d'accueil");
        assert_eq!(dictionary.translate("nav.home", Locale::En), "Home");
        assert_eq!(dictionary.translate("hero.title", Locale::Fr), "Rivière de Vie");
    }
}
