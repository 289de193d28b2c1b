//! 语言偏好持久化
//!
//! 只保存一个键 `preferredLang`。读取失败一律视为"没有偏好"，由调用方决定是否记录日志。

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use super::Locale;
use crate::error::{helpers::storage_error, PageResult};

/// 持久化键名
pub const PREFERRED_LANG_KEY: &str = "preferredLang";

/// 语言偏好存储
pub trait LocaleStore {
    /// 读取已保存的语言；没有保存过返回 `Ok(None)`
    fn load(&self) -> PageResult<Option<Locale>>;

    fn save(&self, locale: Locale) -> PageResult<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(rename = "preferredLang", default, skip_serializing_if = "Option::is_none")]
    preferred_lang: Option<String>,
}

/// JSON 文件存储
#[derive(Debug, Clone)]
pub struct FileLocaleStore {
    path: PathBuf,
}

impl FileLocaleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 用户配置目录下的 `locale.json`
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("ca", "LifeRiver", "page-i18n")
            .map(|dirs| dirs.config_dir().join("locale.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LocaleStore for FileLocaleStore {
    fn load(&self) -> PageResult<Option<Locale>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| storage_error(format!("读取 {} 失败: {}", self.path.display(), e)))?;
        let file: StoreFile = serde_json::from_str(&content)
            .map_err(|e| storage_error(format!("解析 {} 失败: {}", self.path.display(), e)))?;

        match file.preferred_lang {
            Some(code) => match code.parse::<Locale>() {
                Ok(locale) => Ok(Some(locale)),
                Err(_) => {
                    tracing::warn!("已保存的语言 {} 不受支持，忽略", code);
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    fn save(&self, locale: Locale) -> PageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    storage_error(format!("创建目录 {} 失败: {}", parent.display(), e))
                })?;
            }
        }

        let file = StoreFile {
            preferred_lang: Some(locale.code().to_string()),
        };
        let content = serde_json::to_string_pretty(&file)?;
        fs::write(&self.path, content)
            .map_err(|e| storage_error(format!("写入 {} 失败: {}", self.path.display(), e)))?;

        tracing::debug!("语言偏好已保存: {} -> {}", locale, self.path.display());
        Ok(())
    }
}

/// 内存存储，可模拟存储不可用
#[derive(Debug, Default)]
pub struct MemoryLocaleStore {
    value: Cell<Option<Locale>>,
    denied: bool,
    saves: RefCell<Vec<Locale>>,
}

impl MemoryLocaleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(locale: Locale) -> Self {
        Self {
            value: Cell::new(Some(locale)),
            ..Self::default()
        }
    }

    /// 所有读写都返回存储错误
    pub fn denied() -> Self {
        Self {
            denied: true,
            ..Self::default()
        }
    }

    pub fn value(&self) -> Option<Locale> {
        self.value.get()
    }

    /// 成功保存过的值，按顺序
    pub fn saves(&self) -> Vec<Locale> {
        self.saves.borrow().clone()
    }
}

impl LocaleStore for MemoryLocaleStore {
    fn load(&self) -> PageResult<Option<Locale>> {
        if self.denied {
            return Err(storage_error("存储访问被拒绝"));
        }
        Ok(self.value.get())
    }

    fn save(&self, locale: Locale) -> PageResult<()> {
        if self.denied {
            return Err(storage_error("存储访问被拒绝"));
        }
        self.value.set(Some(locale));
        self.saves.borrow_mut().push(locale);
        Ok(())
    }
}
