//! 正在本地化的页面
//!
//! `Page` 保存原始字节和当前 DOM。切回页面原文语言时通过 [`Page::reload`] 重新解析
//! 原始字节，相当于浏览器里的整页刷新。

use std::cell::RefCell;
use std::fs;
use std::path::Path;

use encoding_rs::Encoding;
use markup5ever_rcdom::{Handle, RcDom};

use crate::error::{PageError, PageResult};
use crate::locale::Locale;
use crate::parsers::html::{find_nodes, get_charset, html_to_dom, serialize_document, set_node_attr};

/// 默认文档编码
pub const DEFAULT_ENCODING: &str = "utf-8";

/// 解析文档并确定编码
///
/// 先按 `input_encoding`（缺省 UTF-8）解析；文档内声明了有效字符集时按声明重新解析。
pub fn parse_document(data: &[u8], input_encoding: Option<&str>) -> PageResult<(RcDom, String)> {
    let mut document_encoding = input_encoding.unwrap_or(DEFAULT_ENCODING).to_string();
    let mut dom = html_to_dom(data, &document_encoding)?;

    if let Some(html_charset) = get_charset(&dom.document) {
        if !html_charset.is_empty() && !html_charset.eq_ignore_ascii_case(&document_encoding) {
            if let Some(charset) = Encoding::for_label_no_replacement(html_charset.as_bytes()) {
                tracing::debug!("文档声明字符集 {}，重新解析", charset.name());
                document_encoding = html_charset;
                dom = html_to_dom(data, charset.name())?;
            }
        }
    }

    Ok((dom, document_encoding))
}

/// 页面文档
pub struct Page {
    source: Vec<u8>,
    input_encoding: Option<String>,
    encoding: String,
    dom: RefCell<RcDom>,
}

impl Page {
    /// 由原始字节创建
    pub fn from_bytes(source: Vec<u8>, input_encoding: Option<&str>) -> PageResult<Self> {
        let (dom, encoding) = parse_document(&source, input_encoding)?;
        Ok(Self {
            source,
            input_encoding: input_encoding.map(str::to_string),
            encoding,
            dom: RefCell::new(dom),
        })
    }

    pub fn from_html(html: &str) -> PageResult<Self> {
        Self::from_bytes(html.as_bytes().to_vec(), Some(DEFAULT_ENCODING))
    }

    pub fn from_file(path: &Path, input_encoding: Option<&str>) -> PageResult<Self> {
        let source = fs::read(path)
            .map_err(|e| PageError::from(e).with_context(path.display()))?;
        Self::from_bytes(source, input_encoding)
    }

    /// 当前文档根节点
    pub fn document(&self) -> Handle {
        self.dom.borrow().document.clone()
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    /// 重新解析原始字节，丢弃所有修改
    pub fn reload(&self) -> PageResult<()> {
        let (dom, _) = parse_document(&self.source, self.input_encoding.as_deref())?;
        *self.dom.borrow_mut() = dom;
        tracing::debug!("页面已重新加载");
        Ok(())
    }

    /// 设置 `<html lang="...">`
    pub fn set_lang(&self, locale: Locale) {
        let document = self.document();
        for html in find_nodes(&document, &["html"]) {
            set_node_attr(&html, "lang", Some(locale.code().to_string()));
        }
    }

    /// 按文档编码序列化
    pub fn serialize(&self) -> PageResult<Vec<u8>> {
        serialize_document(&self.document(), &self.encoding)
    }

    pub fn to_html_string(&self) -> PageResult<String> {
        let bytes = serialize_document(&self.document(), DEFAULT_ENCODING)?;
        String::from_utf8(bytes)
            .map_err(|e| PageError::Serialization(format!("输出不是有效的UTF-8: {}", e)))
    }

    pub fn write_to(&self, path: &Path) -> PageResult<()> {
        let bytes = self.serialize()?;
        fs::write(path, bytes).map_err(|e| PageError::from(e).with_context(path.display()))
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("source_len", &self.source.len())
            .field("encoding", &self.encoding)
            .finish()
    }
}
