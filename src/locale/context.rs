//! 当前语言的共享状态
//!
//! 组件通过构造参数拿到同一个 `LocaleContext`，不使用全局变量。每次切换语言
//! 代次加一，异步任务在写回结果前用 `PassTicket` 确认自己没有过期。

use std::cell::Cell;
use std::rc::Rc;

use super::Locale;

/// 一次切换的凭据
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassTicket {
    pub locale: Locale,
    pub generation: u64,
}

#[derive(Debug)]
struct ContextInner {
    active: Cell<Locale>,
    generation: Cell<u64>,
}

/// 当前语言句柄，克隆后共享同一状态
#[derive(Debug, Clone)]
pub struct LocaleContext {
    inner: Rc<ContextInner>,
}

impl LocaleContext {
    pub fn new(initial: Locale) -> Self {
        Self {
            inner: Rc::new(ContextInner {
                active: Cell::new(initial),
                generation: Cell::new(0),
            }),
        }
    }

    pub fn active(&self) -> Locale {
        self.inner.active.get()
    }

    pub fn generation(&self) -> u64 {
        self.inner.generation.get()
    }

    /// 切换到新语言，之前发出的凭据全部失效
    pub fn begin_switch(&self, locale: Locale) -> PassTicket {
        let generation = self.inner.generation.get().wrapping_add(1);
        self.inner.generation.set(generation);
        self.inner.active.set(locale);
        PassTicket { locale, generation }
    }

    /// 当前状态对应的凭据
    pub fn ticket(&self) -> PassTicket {
        PassTicket {
            locale: self.active(),
            generation: self.generation(),
        }
    }

    pub fn is_current(&self, ticket: &PassTicket) -> bool {
        self.ticket() == *ticket
    }
}
