//! 文本收集器模块
//!
//! 从 `<body>` 中收集"唯一子节点是文本节点"的元素，按文档顺序返回。

use markup5ever_rcdom::{Handle, NodeData};

use crate::parsers::html::{
    get_body, has_node_attr, sole_text_child, text_of, I18N_ATTR, SELECTOR_ATTR,
};
use crate::translation::pipeline::filters::TextFilter;

/// 需要处理的一段文本及其位置
#[derive(Debug, Clone)]
pub struct TextItem {
    /// 元素唯一的文本子节点
    pub node: Handle,
    /// 收集时的文本（按配置可能已去除首尾空白）
    pub text: String,
}

/// 收集器配置
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// 跳过的元素（连同子树）
    pub skip_tags: Vec<&'static str>,
    /// 是否收集带 `data-i18n` 的元素
    pub include_tagged: bool,
    /// 是否去除首尾空白
    pub trim: bool,
    /// 文本过滤规则
    pub filter: TextFilter,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self::remote()
    }
}

impl CollectorConfig {
    /// 远程翻译：排除词典元素，去除空白并过滤短文本
    pub fn remote() -> Self {
        Self {
            skip_tags: vec!["script", "style", "noscript", "template"],
            include_tagged: false,
            trim: true,
            filter: TextFilter::default(),
        }
    }

    /// 简繁转换：包含词典元素，保留原始文本
    pub fn script() -> Self {
        Self {
            include_tagged: true,
            trim: false,
            filter: TextFilter::accept_all(),
            ..Self::remote()
        }
    }
}

/// 收集统计
#[derive(Debug, Default, Clone)]
pub struct CollectionStats {
    pub elements_visited: usize,
    pub subtrees_skipped: usize,
    pub texts_filtered: usize,
    pub texts_collected: usize,
}

/// 文本收集器
#[derive(Debug, Clone, Default)]
pub struct TextCollector {
    config: CollectorConfig,
    stats: CollectionStats,
}

impl TextCollector {
    pub fn new(config: CollectorConfig) -> Self {
        Self {
            config,
            stats: CollectionStats::default(),
        }
    }

    /// 收集文档 `<body>` 中的文本；没有 body 时返回空列表
    pub fn collect(&mut self, document: &Handle) -> Vec<TextItem> {
        self.stats = CollectionStats::default();
        let mut items = Vec::new();

        match get_body(document) {
            Some(body) => self.collect_recursive(&body, &mut items),
            None => tracing::warn!("文档中没有 <body>，跳过文本收集"),
        }

        self.stats.texts_collected = items.len();
        tracing::debug!(
            "文本收集完成: 访问 {} 个元素，收集 {} 段，过滤 {} 段",
            self.stats.elements_visited,
            self.stats.texts_collected,
            self.stats.texts_filtered
        );
        items
    }

    /// 递归收集（body 本身不参与收集）
    fn collect_recursive(&mut self, parent: &Handle, items: &mut Vec<TextItem>) {
        for child in parent.children.borrow().iter() {
            let NodeData::Element { ref name, .. } = child.data else {
                continue;
            };
            self.stats.elements_visited += 1;

            if self.should_skip_element(&name.local) || has_node_attr(child, SELECTOR_ATTR) {
                self.stats.subtrees_skipped += 1;
                continue;
            }

            // 词典元素连同其子树都由词典负责
            if !self.config.include_tagged && has_node_attr(child, I18N_ATTR) {
                self.stats.subtrees_skipped += 1;
                continue;
            }

            self.collect_element(child, items);
            self.collect_recursive(child, items);
        }
    }

    fn collect_element(&mut self, element: &Handle, items: &mut Vec<TextItem>) {
        let Some(node) = sole_text_child(element) else {
            return;
        };
        let Some(raw) = text_of(&node) else {
            return;
        };

        if !self.config.filter.should_translate(&raw) {
            self.stats.texts_filtered += 1;
            return;
        }

        let text = if self.config.trim {
            raw.trim().to_string()
        } else {
            raw
        };

        items.push(TextItem {
            node,
            text,
        });
    }

    fn should_skip_element(&self, tag_name: &str) -> bool {
        self.config.skip_tags.iter().any(|tag| *tag == tag_name)
    }

    pub fn stats(&self) -> &CollectionStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::html_to_dom;
    use markup5ever_rcdom::RcDom;

    fn create_test_dom(html: &str) -> RcDom {
        html_to_dom(html.as_bytes(), "utf-8").expect("fixture parses")
    }

    const PAGE: &str = r#"<html><head><title>Title here</title></head><body>
        <nav data-locale-selector><button><span>繁體</span></button></nav>
        <h1 data-i18n="nav.home">首頁</h1>
        <p>  Welcome to our church  </p>
        <p>A</p>
        <p>Join <a href="/groups">our groups</a> today</p>
        <script>var notText = "script body";</script>
        <div><span>Sunday worship</span><span>2024</span></div>
    </body></html>"#;

    #[test]
    fn test_remote_collection_rules() {
        let dom = create_test_dom(PAGE);
        let mut collector = TextCollector::new(CollectorConfig::remote());
        let items = collector.collect(&dom.document);

        let texts: Vec<&str> = items.iter().map(|item| item.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["Welcome to our church", "our groups", "Sunday worship"]
        );
        assert!(collector.stats().subtrees_skipped >= 2);
    }

    #[test]
    fn test_script_collection_includes_tagged() {
        let dom = create_test_dom(PAGE);
        let mut collector = TextCollector::new(CollectorConfig::script());
        let items = collector.collect(&dom.document);

        let texts: Vec<&str> = items.iter().map(|item| item.text.as_str()).collect();
        assert_eq!(texts[0], "首頁");
        assert!(texts.contains(&"  Welcome to our church  "));
        assert!(texts.contains(&"A"));
        assert!(texts.contains(&"2024"));
        assert!(!texts.contains(&"繁體"));
    }

    #[test]
    fn test_remote_collection_skips_tagged_subtree() {
        let dom = create_test_dom(
            r#"<html><body>
            <a data-i18n="nav.home"><span>首頁</span></a>
            <div data-i18n="card.title"><h3>崇拜聚會</h3><p>主日上午</p></div>
            <p>歡迎來到這個教會</p>
        </body></html>"#,
        );
        let mut collector = TextCollector::new(CollectorConfig::remote());
        let items = collector.collect(&dom.document);

        let texts: Vec<&str> = items.iter().map(|item| item.text.as_str()).collect();
        assert_eq!(texts, vec!["歡迎來到這個教會"]);
        assert_eq!(collector.stats().subtrees_skipped, 2);

        // 简繁转换仍然处理词典元素内部的文本
        let mut script = TextCollector::new(CollectorConfig::script());
        let texts: Vec<String> = script
            .collect(&dom.document)
            .into_iter()
            .map(|item| item.text)
            .collect();
        assert!(texts.contains(&"首頁".to_string()));
        assert!(texts.contains(&"主日上午".to_string()));
    }

    #[test]
    fn test_no_body() {
        let dom = RcDom::default();
        let mut collector = TextCollector::default();
        assert!(collector.collect(&dom.document).is_empty());
    }
}
