use std::cell::RefCell;
use std::rc::Rc;

use encoding_rs::Encoding;
use html5ever::interface::{Attribute, QualName};
use html5ever::parse_document;
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{namespace_url, ns, LocalName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom};

use crate::error::{PageError, PageResult};

/// 将 HTML 字节转换为 DOM
pub fn html_to_dom(data: &[u8], document_encoding: &str) -> PageResult<RcDom> {
    let s: String = match Encoding::for_label(document_encoding.as_bytes()) {
        Some(encoding) => {
            let (string, _, _) = encoding.decode(data);
            string.to_string()
        }
        None => String::from_utf8_lossy(data).to_string(),
    };

    parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut s.as_bytes())
        .map_err(|e| PageError::Parse(format!("HTML解析失败: {}", e)))
}

/// 查找指定路径的DOM节点
pub fn find_nodes(node: &Handle, node_names: &[&str]) -> Vec<Handle> {
    let mut found_nodes = Vec::new();
    let Some((node_name, rest)) = node_names.split_first() else {
        return found_nodes;
    };

    if let NodeData::Element { ref name, .. } = node.data {
        if &*name.local == *node_name {
            if rest.is_empty() {
                found_nodes.push(node.clone());
            } else {
                for child_node in node.children.borrow().iter() {
                    found_nodes.append(&mut find_nodes(child_node, rest));
                }
                return found_nodes;
            }
        }
    }

    for child_node in node.children.borrow().iter() {
        found_nodes.append(&mut find_nodes(child_node, node_names));
    }

    found_nodes
}

/// 查找带有指定属性的所有元素（文档顺序）
pub fn find_elements_with_attr(node: &Handle, attr_name: &str) -> Vec<Handle> {
    let mut found = Vec::new();
    collect_elements_with_attr(node, attr_name, &mut found);
    found
}

fn collect_elements_with_attr(node: &Handle, attr_name: &str, found: &mut Vec<Handle>) {
    if has_node_attr(node, attr_name) {
        found.push(node.clone());
    }
    for child in node.children.borrow().iter() {
        collect_elements_with_attr(child, attr_name, found);
    }
}

/// 获取文档的 body 元素
pub fn get_body(document: &Handle) -> Option<Handle> {
    find_nodes(document, &["html", "body"]).into_iter().next()
}

/// 读取文档声明的字符集
///
/// 支持 `<meta charset="...">` 和 `<meta http-equiv="content-type" content="...; charset=...">`。
pub fn get_charset(document: &Handle) -> Option<String> {
    for meta in find_nodes(document, &["html", "head", "meta"]) {
        if let Some(charset) = get_node_attr(&meta, "charset") {
            return Some(charset);
        }

        let is_content_type = get_node_attr(&meta, "http-equiv")
            .unwrap_or_default()
            .eq_ignore_ascii_case("content-type");
        if is_content_type {
            if let Some(content) = get_node_attr(&meta, "content") {
                return content
                    .split(';')
                    .skip(1)
                    .filter_map(|part| part.trim().strip_prefix("charset="))
                    .map(|charset| charset.trim_matches('"').to_string())
                    .next();
            }
        }
    }

    None
}

/// 获取节点属性值
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| &*attr.name.local == attr_name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

/// 检查节点是否带有属性
pub fn has_node_attr(node: &Handle, attr_name: &str) -> bool {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .any(|attr| &*attr.name.local == attr_name),
        _ => false,
    }
}

/// 获取节点名称
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// 设置节点属性
pub fn set_node_attr(node: &Handle, attr_name: &str, attr_value: Option<String>) {
    if let NodeData::Element { attrs, .. } = &node.data {
        let attrs_mut = &mut attrs.borrow_mut();
        let mut i = 0;
        let mut found_existing_attr: bool = false;

        while i < attrs_mut.len() {
            if &attrs_mut[i].name.local == attr_name {
                found_existing_attr = true;

                if let Some(attr_value) = attr_value.as_deref() {
                    attrs_mut[i].value.clear();
                    attrs_mut[i].value.push_slice(attr_value);
                } else {
                    // Remove attr completely if attr_value is not defined
                    attrs_mut.remove(i);
                    continue;
                }
            }

            i += 1;
        }

        if !found_existing_attr {
            if let Some(attr_value) = attr_value {
                attrs_mut.push(Attribute {
                    name: QualName::new(None, ns!(), LocalName::from(attr_name)),
                    value: StrTendril::from(attr_value),
                });
            }
        }
    };
}

/// 创建一个游离的 HTML 元素节点
pub fn create_element_node(tag_name: &str, attrs: &[(&str, &str)]) -> Handle {
    let attrs = attrs
        .iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(*name)),
            value: StrTendril::from(*value),
        })
        .collect();

    Node::new(NodeData::Element {
        name: QualName::new(None, ns!(html), LocalName::from(tag_name)),
        attrs: RefCell::new(attrs),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

/// 创建一个游离的文本节点
pub fn create_text_node(text: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from(text)),
    })
}

/// 追加子节点并维护父指针
pub fn append_child(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

/// 插入为第一个子节点
pub fn prepend_child(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().insert(0, child);
}

/// 移除所有子节点
pub fn clear_children(parent: &Handle) {
    for child in parent.children.borrow_mut().drain(..) {
        child.parent.set(None);
    }
}

/// 文本节点的内容
pub fn text_of(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Text { contents } => Some(contents.borrow().to_string()),
        _ => None,
    }
}

/// 覆写文本节点的内容，非文本节点返回 false
pub fn set_text_of(node: &Handle, text: &str) -> bool {
    match &node.data {
        NodeData::Text { contents } => {
            let mut content_ref = contents.borrow_mut();
            content_ref.clear();
            content_ref.push_slice(text);
            true
        }
        _ => false,
    }
}

/// 元素的文本内容（所有后代文本节点拼接）
pub fn text_content(node: &Handle) -> String {
    let mut out = String::new();
    push_text_content(node, &mut out);
    out
}

fn push_text_content(node: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &node.data {
        out.push_str(&contents.borrow());
    }
    for child in node.children.borrow().iter() {
        push_text_content(child, out);
    }
}

/// 用单个文本节点替换元素的全部子节点
pub fn set_text_content(element: &Handle, text: &str) {
    clear_children(element);
    append_child(element, create_text_node(text));
}

/// 元素是否含有子元素
pub fn has_element_children(node: &Handle) -> bool {
    node.children
        .borrow()
        .iter()
        .any(|child| matches!(child.data, NodeData::Element { .. }))
}

/// 如果元素唯一的子节点是文本节点，返回该文本节点
pub fn sole_text_child(element: &Handle) -> Option<Handle> {
    let children = element.children.borrow();
    match children.as_slice() {
        [only] if matches!(only.data, NodeData::Text { .. }) => Some(only.clone()),
        _ => None,
    }
}

/// 文档顺序中第一个非空白文本后代
pub fn first_text_descendant(node: &Handle) -> Option<Handle> {
    for child in node.children.borrow().iter() {
        match &child.data {
            NodeData::Text { contents } if !contents.borrow().trim().is_empty() => {
                return Some(child.clone());
            }
            NodeData::Element { .. } => {
                if let Some(found) = first_text_descendant(child) {
                    return Some(found);
                }
            }
            _ => {}
        }
    }
    None
}
