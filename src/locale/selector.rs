//! 页面上的语言选择器
//!
//! 结构：
//!
//! ```html
//! <nav class="lang-selector" data-locale-selector="">
//!   <button id="langTrigger" class="lang-trigger" type="button"><span>繁體</span></button>
//!   <ul id="langDropdown" class="lang-dropdown">
//!     <li><a href="#" class="lang-option active" data-lang="zh-Hant">繁體</a></li>
//!     ...
//!   </ul>
//! </nav>
//! ```
//!
//! 已有选择器时原地重建，否则插入为 `<body>` 的第一个子元素。

use markup5ever_rcdom::Handle;

use super::{Locale, LocaleTable};
use crate::parsers::html::{
    append_child, clear_children, create_element_node, create_text_node,
    find_elements_with_attr, get_body, get_node_attr, get_node_name, prepend_child, set_node_attr,
    set_text_content, text_content, SELECTOR_ATTR,
};

pub const TRIGGER_ID: &str = "langTrigger";
pub const DROPDOWN_ID: &str = "langDropdown";
pub const OPTION_CLASS: &str = "lang-option";

/// 翻译进行中时的按钮文字
pub const BUSY_LABEL: &str = "...";
/// 远程翻译全部失败时的按钮文字
pub const ERROR_LABEL: &str = "ERR";

/// 文档中的选择器根元素
pub fn find_selector(document: &Handle) -> Option<Handle> {
    find_elements_with_attr(document, SELECTOR_ATTR)
        .into_iter()
        .next()
}

/// 渲染（或刷新）选择器，返回其根元素；文档没有 `<body>` 时返回 `None`
pub fn render_selector(document: &Handle, table: &LocaleTable, active: Locale) -> Option<Handle> {
    let root = match find_selector(document) {
        Some(existing) => {
            clear_children(&existing);
            existing
        }
        None => {
            let body = get_body(document)?;
            let nav = create_element_node("nav", &[("class", "lang-selector"), (SELECTOR_ATTR, "")]);
            prepend_child(&body, nav.clone());
            nav
        }
    };

    let trigger = create_element_node(
        "button",
        &[("id", TRIGGER_ID), ("class", "lang-trigger"), ("type", "button")],
    );
    let label = create_element_node("span", &[]);
    append_child(&label, create_text_node(active.label()));
    append_child(&trigger, label);
    append_child(&root, trigger);

    let dropdown = create_element_node("ul", &[("id", DROPDOWN_ID), ("class", "lang-dropdown")]);
    for locale in table.locales() {
        let item = create_element_node("li", &[]);
        let option = create_element_node(
            "a",
            &[("href", "#"), ("class", OPTION_CLASS), ("data-lang", locale.code())],
        );
        append_child(&option, create_text_node(locale.label()));
        append_child(&item, option);
        append_child(&dropdown, item);
    }
    append_child(&root, dropdown);

    mark_active(document, active);
    Some(root)
}

/// 选择器按钮上 `<span>` 的元素
fn trigger_label(document: &Handle) -> Option<Handle> {
    let selector = find_selector(document)?;
    let trigger = find_elements_with_attr(&selector, "id")
        .into_iter()
        .find(|node| get_node_attr(node, "id").as_deref() == Some(TRIGGER_ID))?;
    let span = trigger
        .children
        .borrow()
        .iter()
        .find(|child| get_node_name(child) == Some("span"))
        .cloned();
    span
}

/// 设置按钮文字，没有选择器时返回 false
pub fn set_label(document: &Handle, text: &str) -> bool {
    match trigger_label(document) {
        Some(span) => {
            set_text_content(&span, text);
            true
        }
        None => false,
    }
}

/// 当前按钮文字
pub fn current_label(document: &Handle) -> Option<String> {
    trigger_label(document).map(|span| text_content(&span))
}

/// 标记当前语言选项
pub fn mark_active(document: &Handle, active: Locale) {
    let Some(selector) = find_selector(document) else {
        return;
    };

    for option in find_elements_with_attr(&selector, "data-lang") {
        let is_active = get_node_attr(&option, "data-lang").as_deref() == Some(active.code());
        let class = if is_active {
            format!("{} active", OPTION_CLASS)
        } else {
            OPTION_CLASS.to_string()
        };
        set_node_attr(&option, "class", Some(class));
    }
}

/// 当前标记为 active 的语言
pub fn active_option(document: &Handle) -> Option<Locale> {
    let selector = find_selector(document)?;
    find_elements_with_attr(&selector, "data-lang")
        .into_iter()
        .find(|option| {
            get_node_attr(option, "class")
                .is_some_and(|class| class.split_whitespace().any(|c| c == "active"))
        })
        .and_then(|option| get_node_attr(&option, "data-lang"))
        .and_then(|code| code.parse().ok())
}
