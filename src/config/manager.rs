//! 配置加载、校验与组件构建

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::constants;
use crate::dictionary::TranslationDictionary;
use crate::error::{helpers::config_error, PageError, PageResult};
use crate::locale::{
    FileLocaleStore, Locale, LocaleContext, LocaleManager, LocaleStore, LocaleTable,
    MemoryLocaleStore,
};
use crate::script::{engine::RemoteDictionaryLoader, ScriptConverter};
use crate::translation::{
    pipeline::DEFAULT_BATCH_SIZE, LibreTranslateClient, RemoteTranslator, RemoteTranslatorConfig,
    DEFAULT_API_URL,
};

/// 语言配置
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LocaleSection {
    /// 页面原文语言
    pub native: Locale,
    /// 检测不到偏好时使用的语言
    pub default: Locale,
    pub supported: Vec<Locale>,
    /// 语言偏好文件；不设置时使用用户配置目录
    pub store_path: Option<String>,
    /// 额外的词典目录（`<dir>/<locale>.json`）
    pub dictionary_dir: Option<String>,
}

impl Default for LocaleSection {
    fn default() -> Self {
        Self {
            native: Locale::ZhHant,
            default: Locale::ZhHant,
            supported: Locale::ALL.to_vec(),
            store_path: None,
            dictionary_dir: None,
        }
    }
}

/// 远程翻译配置
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslationSection {
    pub enabled: bool,
    pub api_url: String,
    pub api_key: String,
    pub batch_size: usize,
    pub max_concurrent_batches: usize,
    pub timeout_secs: u64,
}

impl Default for TranslationSection {
    fn default() -> Self {
        Self {
            enabled: true,
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            batch_size: DEFAULT_BATCH_SIZE,
            max_concurrent_batches: constants::DEFAULT_MAX_CONCURRENT_BATCHES,
            timeout_secs: constants::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl TranslationSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 简繁转换配置
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScriptSection {
    pub engine_enabled: bool,
    /// OpenCC 词典文件所在的目录地址；不设置时只用内置字表
    pub engine_base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ScriptSection {
    fn default() -> Self {
        Self {
            engine_enabled: true,
            engine_base_url: None,
            timeout_secs: constants::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub locale: LocaleSection,
    pub translation: TranslationSection,
    pub script: ScriptSection,
}

impl AppConfig {
    /// 从指定文件加载；`.json` 按 JSON 解析，其余按 TOML
    pub fn from_file(path: &Path) -> PageResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| config_error(format!("读取配置文件 {} 失败: {}", path.display(), e)))?;

        if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
            serde_json::from_str(&content)
                .map_err(|e| config_error(format!("解析JSON配置失败: {}", e)))
        } else {
            toml::from_str(&content).map_err(|e| config_error(format!("解析TOML配置失败: {}", e)))
        }
    }

    /// 校验配置
    pub fn validate(&self) -> PageResult<()> {
        if self.locale.supported.is_empty() {
            return Err(config_error("支持的语言列表不能为空"));
        }

        if self.locale.default != self.locale.native
            && !self.locale.supported.contains(&self.locale.default)
        {
            return Err(config_error(format!(
                "默认语言 {} 不在支持列表中",
                self.locale.default
            )));
        }

        if self.translation.batch_size == 0 {
            return Err(config_error("批次大小不能为0"));
        }

        if self.translation.max_concurrent_batches == 0 {
            return Err(config_error("最大并发数不能为0"));
        }

        if self.translation.timeout_secs == 0 || self.script.timeout_secs == 0 {
            return Err(config_error("超时必须大于0"));
        }

        url::Url::parse(&self.translation.api_url)
            .map_err(|e| config_error(format!("翻译接口地址无效: {}", e)))?;

        if let Some(base_url) = &self.script.engine_base_url {
            url::Url::parse(base_url)
                .map_err(|e| config_error(format!("简繁词典地址无效: {}", e)))?;
        }

        Ok(())
    }

    /// 应用环境变量覆盖
    pub fn apply_env_overrides(&mut self) {
        use crate::env::{locale, script, translation, EnvVar};

        if let Some(native) = locale::NativeLocale::get_override() {
            self.locale.native = native;
        }

        if let Some(default) = locale::DefaultLocale::get_override() {
            self.locale.default = default;
        }

        if let Some(supported) = locale::SupportedLocales::get_override() {
            self.locale.supported = supported;
        }

        if let Some(path) = locale::StorePath::get_override() {
            self.locale.store_path = Some(path);
        }

        if let Some(enabled) = translation::Enabled::get_override() {
            self.translation.enabled = enabled;
        }

        if let Some(api_url) = translation::ApiUrl::get_override() {
            tracing::info!("环境变量覆盖翻译接口地址: {}", api_url);
            self.translation.api_url = api_url;
        }

        if let Some(api_key) = translation::ApiKey::get_override() {
            self.translation.api_key = api_key;
        }

        if let Some(batch_size) = translation::BatchSize::get_override() {
            self.translation.batch_size = batch_size;
        }

        if let Some(max_concurrent) = translation::MaxConcurrentBatches::get_override() {
            self.translation.max_concurrent_batches = max_concurrent;
        }

        if let Some(timeout) = translation::Timeout::get_override() {
            self.translation.timeout_secs = timeout.as_secs();
        }

        if let Some(enabled) = script::EngineEnabled::get_override() {
            self.script.engine_enabled = enabled;
        }

        if let Some(base_url) = script::EngineUrl::get_override() {
            self.script.engine_base_url = Some(base_url);
        }
    }

    /// 语言 → 策略映射表
    pub fn locale_table(&self) -> LocaleTable {
        LocaleTable::new(self.locale.native, &self.locale.supported)
    }

    /// 语言偏好存储
    ///
    /// `persist` 为 false 或找不到用户配置目录时使用内存存储。
    pub fn locale_store(&self, persist: bool) -> Box<dyn LocaleStore> {
        if !persist {
            return Box::new(MemoryLocaleStore::new());
        }

        let path = self
            .locale
            .store_path
            .as_deref()
            .map(|path| PathBuf::from(shellexpand::tilde(path).as_ref()))
            .or_else(FileLocaleStore::default_path);

        match path {
            Some(path) => Box::new(FileLocaleStore::new(path)),
            None => {
                tracing::warn!("找不到用户配置目录，语言偏好不会保存");
                Box::new(MemoryLocaleStore::new())
            }
        }
    }

    /// 内置词典加上配置的词典目录
    pub fn dictionary(&self) -> PageResult<TranslationDictionary> {
        let mut dictionary = TranslationDictionary::builtin();
        if let Some(dir) = &self.locale.dictionary_dir {
            let dir = PathBuf::from(shellexpand::tilde(dir).as_ref());
            let loaded = dictionary.load_locale_dir(&dir)?;
            tracing::info!("从 {} 合并 {} 条词典译文", dir.display(), loaded);
        }
        Ok(dictionary)
    }

    /// 简繁转换器；未配置词典地址时只用内置字表
    pub fn script_converter(&self) -> PageResult<ScriptConverter> {
        match (&self.script.engine_base_url, self.script.engine_enabled) {
            (Some(base_url), true) => {
                let loader = RemoteDictionaryLoader::new(
                    base_url,
                    Duration::from_secs(self.script.timeout_secs),
                )?;
                Ok(ScriptConverter::with_loader(Arc::new(loader)))
            }
            _ => Ok(ScriptConverter::table_only()),
        }
    }

    /// 远程翻译器；关闭时返回 `None`
    pub fn remote_translator(&self, context: LocaleContext) -> PageResult<Option<RemoteTranslator>> {
        if !self.translation.enabled {
            return Ok(None);
        }

        let client = LibreTranslateClient::new(&self.translation.api_url, self.translation.timeout())?;
        let config = RemoteTranslatorConfig {
            batch_size: self.translation.batch_size,
            max_concurrent_batches: self.translation.max_concurrent_batches,
            api_key: self.translation.api_key.clone(),
        };
        Ok(Some(RemoteTranslator::new(Arc::new(client), context, config)))
    }

    /// 按配置组装语言管理器
    pub fn build_manager(&self, persist: bool) -> PageResult<LocaleManager> {
        let table = self.locale_table();
        let context = LocaleContext::new(table.native());

        let mut manager = LocaleManager::new(table, self.locale_store(persist))
            .with_default_locale(self.locale.default)
            .with_context(context.clone())
            .with_dictionary(self.dictionary()?)
            .with_converter(self.script_converter()?);

        if let Some(translator) = self.remote_translator(context)? {
            manager = manager.with_translator(translator);
        }

        Ok(manager)
    }
}

/// 配置管理器
#[derive(Debug)]
pub struct ConfigManager {
    config: AppConfig,
    source: Option<PathBuf>,
}

impl ConfigManager {
    /// 搜索配置文件并应用环境变量
    pub fn new() -> PageResult<Self> {
        Self::load(None)
    }

    /// 使用指定配置文件；`None` 时按搜索路径查找
    pub fn load(explicit: Option<&Path>) -> PageResult<Self> {
        Self::load_dotenv();

        let source = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::find_config_file(),
        };

        let mut config = match &source {
            Some(path) => {
                tracing::info!("加载配置文件: {}", path.display());
                AppConfig::from_file(path)?
            }
            None => {
                tracing::info!("未找到配置文件，使用默认配置");
                AppConfig::default()
            }
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(Self { config, source })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn into_config(self) -> AppConfig {
        self.config
    }

    /// 实际加载的配置文件
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    fn find_config_file() -> Option<PathBuf> {
        use crate::env::{core::ConfigPath, EnvVar};

        if let Some(path) = ConfigPath::get_override() {
            return Some(PathBuf::from(path));
        }

        constants::CONFIG_PATHS
            .iter()
            .map(|path| PathBuf::from(shellexpand::tilde(path).as_ref()))
            .find(|path| path.exists())
    }

    /// 加载 .env 文件
    fn load_dotenv() {
        for env_file in constants::ENV_FILES {
            if Path::new(env_file).exists() && dotenv::from_filename(env_file).is_ok() {
                tracing::info!("已加载环境变量文件: {}", env_file);
                break;
            }
        }
    }

    /// 生成示例配置文件
    pub fn generate_example_config(path: &Path) -> PageResult<()> {
        let content = toml::to_string_pretty(&AppConfig::default())
            .map_err(|e| config_error(format!("序列化配置失败: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| PageError::from(e).with_context(path.display()))?;

        Ok(())
    }
}
