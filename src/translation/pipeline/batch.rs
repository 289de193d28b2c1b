//! 翻译批次
//!
//! 将收集到的文本按固定大小切分为批次。每个批次是一次远程请求，也是独立的失败单元；
//! 批次内保持文档顺序，译文按位置写回。

use crate::translation::pipeline::collector::TextItem;

/// 默认批次大小
pub const DEFAULT_BATCH_SIZE: usize = 12;

/// 翻译批次
#[derive(Debug, Clone)]
pub struct Batch {
    /// 批次序号（从 0 开始）
    pub id: usize,
    /// 包含的文本项
    pub items: Vec<TextItem>,
}

impl Batch {
    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    /// 本批次要发送的文本
    pub fn texts(&self) -> Vec<String> {
        self.items.iter().map(|item| item.text.clone()).collect()
    }
}

/// 按固定大小切分；`batch_size` 为 0 时按 1 处理
pub fn create_batches(items: Vec<TextItem>, batch_size: usize) -> Vec<Batch> {
    let batch_size = batch_size.max(1);
    let mut batches = Vec::with_capacity(items.len().div_ceil(batch_size));
    let mut items = items.into_iter().peekable();

    while items.peek().is_some() {
        let chunk: Vec<TextItem> = items.by_ref().take(batch_size).collect();
        batches.push(Batch {
            id: batches.len(),
            items: chunk,
        });
    }

    batches
}
