//! 控制台配置
//!
//! 定义控制台的配置结构和加载逻辑。

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::bundle::notify::NotifyFlag;
use crate::bundle::sort::{SortDirection, SortField, SortSpec};
use crate::utils::{ConsoleError, Result};

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否输出到文件
    #[serde(default)]
    pub file_output: bool,

    /// 日志文件目录
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// 是否输出 JSON 格式
    #[serde(default)]
    pub json_format: bool,

    /// 日志轮转策略
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_output: false,
            log_dir: None,
            json_format: false,
            rotation: default_rotation(),
        }
    }
}

/// 列表视图配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// 初始排序字段（name, version, state）
    #[serde(default = "default_sort_field")]
    pub sort_field: String,

    /// 初始排序方向（asc, desc）
    #[serde(default = "default_sort_direction")]
    pub sort_direction: String,

    /// 初始过滤字符串
    #[serde(default)]
    pub filter: String,
}

fn default_sort_field() -> String {
    "name".to_string()
}

fn default_sort_direction() -> String {
    "asc".to_string()
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            sort_field: default_sort_field(),
            sort_direction: default_sort_direction(),
            filter: String::new(),
        }
    }
}

impl ViewConfig {
    /// 解析初始排序设置
    pub fn sort_spec(&self) -> Result<SortSpec> {
        let field: SortField =
            self.sort_field
                .parse()
                .map_err(|reason: String| ConsoleError::InvalidConfigValue {
                    key: "view.sort_field".to_string(),
                    reason,
                })?;
        if field == SortField::Available {
            return Err(ConsoleError::InvalidConfigValue {
                key: "view.sort_field".to_string(),
                reason: "已安装模块视图只能按 name、version 或 state 排序".to_string(),
            });
        }
        let direction: SortDirection =
            self.sort_direction
                .parse()
                .map_err(|reason: String| ConsoleError::InvalidConfigValue {
                    key: "view.sort_direction".to_string(),
                    reason,
                })?;
        Ok(SortSpec::new(field, direction))
    }
}

/// 注册中心配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// 注册中心快照文件（YAML）
    #[serde(default)]
    pub snapshot: Option<PathBuf>,
}

/// 通知配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// 显示关闭按钮
    #[serde(default = "default_true")]
    pub close_button: bool,

    /// 不自动关闭
    #[serde(default = "default_true")]
    pub no_automatic_close: bool,
}

fn default_true() -> bool {
    true
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            close_button: true,
            no_automatic_close: true,
        }
    }
}

impl NotificationConfig {
    /// 附加到每条通知上的标志
    pub fn flags(&self) -> Vec<NotifyFlag> {
        let mut flags = Vec::new();
        if self.close_button {
            flags.push(NotifyFlag::CloseButton);
        }
        if self.no_automatic_close {
            flags.push(NotifyFlag::NoAutomaticClose);
        }
        flags
    }
}

/// 控制台配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// 配置文件路径
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// 日志配置
    #[serde(default)]
    pub logging: LogConfig,

    /// 列表视图配置
    #[serde(default)]
    pub view: ViewConfig,

    /// 注册中心配置
    #[serde(default)]
    pub registry: RegistryConfig,

    /// 通知配置
    #[serde(default)]
    pub notifications: NotificationConfig,
}

impl ConsoleConfig {
    /// 创建配置构建器
    pub fn builder() -> ConsoleConfigBuilder {
        ConsoleConfigBuilder::new()
    }

    /// 从文件加载配置（.json 按 JSON 解析，其余按 YAML 解析）
    pub async fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            ConsoleError::ConfigLoadFailed(format!("{}: {}", path.display(), e))
        })?;

        let mut config: ConsoleConfig = if path.extension().map(|e| e == "json").unwrap_or(false) {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };

        config.validate()?;
        config.config_path = Some(path);
        Ok(config)
    }

    /// 校验配置值
    pub fn validate(&self) -> Result<()> {
        self.view.sort_spec()?;
        Ok(())
    }

    /// 合并另一个配置（只覆盖非默认值）
    pub fn merge(&mut self, other: ConsoleConfig) {
        if other.logging.level != default_log_level() {
            self.logging.level = other.logging.level;
        }
        if other.logging.file_output {
            self.logging.file_output = true;
            self.logging.log_dir = other.logging.log_dir;
        }
        if other.logging.json_format {
            self.logging.json_format = true;
        }
        if other.view.sort_field != default_sort_field() {
            self.view.sort_field = other.view.sort_field;
        }
        if other.view.sort_direction != default_sort_direction() {
            self.view.sort_direction = other.view.sort_direction;
        }
        if !other.view.filter.is_empty() {
            self.view.filter = other.view.filter;
        }
        if other.registry.snapshot.is_some() {
            self.registry.snapshot = other.registry.snapshot;
        }
    }
}

/// 配置构建器
#[derive(Debug, Default)]
pub struct ConsoleConfigBuilder {
    config: ConsoleConfig,
}

impl ConsoleConfigBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self {
            config: ConsoleConfig::default(),
        }
    }

    /// 设置日志级别
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    /// 启用文件日志
    pub fn file_logging(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.config.logging.file_output = true;
        self.config.logging.log_dir = Some(log_dir.into());
        self
    }

    /// 设置初始排序
    pub fn sort(mut self, field: SortField, direction: SortDirection) -> Self {
        self.config.view.sort_field = field.to_string();
        self.config.view.sort_direction = direction.to_string();
        self
    }

    /// 设置初始过滤字符串
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.config.view.filter = filter.into();
        self
    }

    /// 设置注册中心快照文件
    pub fn registry_snapshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.registry.snapshot = Some(path.into());
        self
    }

    /// 设置通知标志
    pub fn notifications(mut self, close_button: bool, no_automatic_close: bool) -> Self {
        self.config.notifications = NotificationConfig {
            close_button,
            no_automatic_close,
        };
        self
    }

    /// 构建配置
    pub fn build(self) -> ConsoleConfig {
        self.config
    }
}
