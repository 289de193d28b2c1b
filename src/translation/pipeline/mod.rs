//! 翻译管道模块
//!
//! 文本收集、过滤和批次切分

pub mod batch;
pub mod collector;
pub mod filters;

pub use batch::{create_batches, Batch, DEFAULT_BATCH_SIZE};
pub use collector::{CollectionStats, CollectorConfig, TextCollector, TextItem};
pub use filters::TextFilter;
