//! # Bundle Console - 模块生命周期控制台
//!
//! 查看和控制已部署 Bundle 的核心库，提供以下功能：
//!
//! - **描述符解析**: 将注册中心返回的 `<name>/<version>:<tail>` 字符串解析为类型化记录
//! - **排序与过滤**: 按字段排序（缺失值有确定顺序），按名称不区分大小写过滤
//! - **生命周期操作**: 对单个 Bundle 执行 start/stop/refresh，操作后从注册中心重新同步
//! - **全部更新**: 一次批量变更，之后重新获取已安装模块和可用更新
//! - **配置管理**: YAML/JSON 配置文件
//! - **日志系统**: 结构化日志记录
//!
//! ## 快速开始
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use bundle_console::{BundleConsole, ConsoleConfig, InMemoryRegistry, TracingNotifier};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = InMemoryRegistry::from_snapshot_file("registry.yaml".as_ref()).await?;
//!     let mut console = BundleConsole::new(
//!         ConsoleConfig::default(),
//!         Arc::new(registry),
//!         Arc::new(TracingNotifier),
//!     )?;
//!
//!     console.load().await?;
//!     console.load_rows().await;
//!     console.start("mod-b").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## 模块结构
//!
//! - `bundle` - 记录类型、解析、排序过滤、网关契约、生命周期与更新
//! - `api` - 控制台门面
//! - `core` - 配置
//! - `utils` - 错误类型和日志

#![warn(rustdoc::missing_crate_level_docs)]

pub mod api;
pub mod bundle;
pub mod core;
pub mod utils;

// 重导出常用类型，方便使用
pub use bundle::{
    messages, AvailableUpdates, BundleDetail, BundleId, BundleOperation, BundleRow, BundleState,
    CollectingNotifier, DescriptorParser, FailurePoint, InMemoryRegistry, LifecycleController,
    ManifestEntry, ModuleRecord, Notification, Notifier, NotifyFlag, OperationOutcome,
    ParseMode, ParsedDescriptor, RawAvailableUpdates, RegistryGateway, RegistrySnapshot,
    RowStatus, SortDirection, SortField, SortSpec, TracingNotifier, UpdateAllOutcome,
    UpdateCoordinator, UpdateRecord, ViewState,
};

pub use utils::{error_code, status_code, ConsoleError, Result};
pub use utils::logger::{LogGuard, Logger, LoggerConfig, LoggerConfigBuilder, RotationStrategy};

pub use core::config::{
    ConsoleConfig, ConsoleConfigBuilder, LogConfig, NotificationConfig, RegistryConfig, ViewConfig,
};
pub use api::console::BundleConsole;

/// 库版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
