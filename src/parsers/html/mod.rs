//! HTML解析和处理模块
//!
//! - `dom`: 基础DOM操作（解析、属性、文本内容、节点创建）
//! - `serializer`: 序列化功能

pub mod dom;
pub mod serializer;

pub use dom::{
    append_child, clear_children, create_element_node, create_text_node, find_elements_with_attr,
    find_nodes, first_text_descendant, get_body, get_charset, get_node_attr,
    get_node_name, has_element_children, has_node_attr, html_to_dom,
    prepend_child, set_node_attr, set_text_content, set_text_of, sole_text_child, text_content, text_of,
};
pub use serializer::serialize_document;

/// 词典标记属性，值为词典键
pub const I18N_ATTR: &str = "data-i18n";

/// 语言选择器子树的标记属性
pub const SELECTOR_ATTR: &str = "data-locale-selector";
