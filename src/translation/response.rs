//! 翻译接口响应结构归一化
//!
//! 兼容的响应形态：
//! - `["a", "b"]` 或 `[{"translatedText": "a"}, ...]`
//! - `{"translations": [...]}`（元素同上）
//! - `{"translatedText": "a"}`（单个字符串，可能是拼接后的整批译文）
//! - `{"translatedText": ["a", "b"]}`

use serde_json::Value;

/// 拼接整批文本时使用的分隔符
pub const SPLIT_SEPARATOR: &str = "\n\n---SPLIT---\n\n";

/// 分隔符的核心标记，服务端改写了空白时用它兜底
pub const SPLIT_MARKER: &str = "---SPLIT---";

/// 译文字段名
const TRANSLATED_TEXT: &str = "translatedText";

/// 归一化后的响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationResponse {
    /// 逐项译文，按请求顺序
    Items(Vec<String>),
    /// 单个字符串
    Single(String),
}

/// 识别响应形态；无法识别时返回 `None`
pub fn normalize_response(value: &Value) -> Option<TranslationResponse> {
    match value {
        Value::Array(entries) => items_from_array(entries).map(TranslationResponse::Items),
        Value::Object(map) => {
            if let Some(Value::Array(entries)) = map.get("translations") {
                return items_from_array(entries).map(TranslationResponse::Items);
            }
            match map.get(TRANSLATED_TEXT) {
                Some(Value::String(text)) => Some(TranslationResponse::Single(text.clone())),
                Some(Value::Array(entries)) => {
                    items_from_array(entries).map(TranslationResponse::Items)
                }
                _ => None,
            }
        }
        _ => None,
    }
}

fn items_from_array(entries: &[Value]) -> Option<Vec<String>> {
    entries.iter().map(item_text).collect()
}

fn item_text(entry: &Value) -> Option<String> {
    match entry {
        Value::String(text) => Some(text.clone()),
        Value::Object(map) => match map.get(TRANSLATED_TEXT) {
            Some(Value::String(text)) => Some(text.clone()),
            _ => None,
        },
        _ => None,
    }
}

/// 拼接一批文本
pub fn join_texts(texts: &[String]) -> String {
    texts.join(SPLIT_SEPARATOR)
}

/// 是否含有分隔标记
pub fn contains_marker(text: &str) -> bool {
    text.contains(SPLIT_MARKER)
}

/// 将拼接后的译文拆回逐项译文
///
/// 先按完整分隔符切分；数量对不上且文本中仍有标记时，改按核心标记切分并去除首尾空白。
pub fn split_joined(text: &str, expected: usize) -> Vec<String> {
    let parts: Vec<String> = text.split(SPLIT_SEPARATOR).map(str::to_string).collect();
    if parts.len() == expected || !contains_marker(text) {
        return parts;
    }

    text.split(SPLIT_MARKER)
        .map(|part| part.trim().to_string())
        .collect()
}
