//! 翻译状态
//!
//! 通过 `tokio::sync::watch` 对外广播，选择器标签和调用方都可以订阅。

use tokio::sync::watch;

/// 远程翻译状态
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TranslationStatus {
    #[default]
    Idle,
    /// 正在翻译，附带目标语言代码
    Translating(String),
    /// 至少一个批次成功（或没有需要翻译的文本）
    Completed(String),
    /// 所有批次都失败
    Failed(String),
}

impl TranslationStatus {
    pub fn is_busy(&self) -> bool {
        matches!(self, TranslationStatus::Translating(_))
    }
}

/// 状态发布端
#[derive(Debug)]
pub struct StatusHandle {
    sender: watch::Sender<TranslationStatus>,
}

impl StatusHandle {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(TranslationStatus::Idle);
        Self { sender }
    }

    pub fn subscribe(&self) -> watch::Receiver<TranslationStatus> {
        self.sender.subscribe()
    }

    pub fn current(&self) -> TranslationStatus {
        self.sender.borrow().clone()
    }

    /// 没有订阅者时也会更新当前值
    pub fn set(&self, status: TranslationStatus) {
        self.sender.send_replace(status);
    }

    /// 仅当当前不在翻译中时切换到 `Translating`，返回是否成功
    pub fn try_begin(&self, target: &str) -> bool {
        self.sender.send_if_modified(|status| {
            if status.is_busy() {
                false
            } else {
                *status = TranslationStatus::Translating(target.to_string());
                true
            }
        })
    }
}

impl Default for StatusHandle {
    fn default() -> Self {
        Self::new()
    }
}
