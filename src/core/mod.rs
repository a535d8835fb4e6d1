//! 核心模块
//!
//! 包含控制台配置。

pub mod config;

pub use config::{
    ConsoleConfig, ConsoleConfigBuilder, LogConfig, NotificationConfig, RegistryConfig,
    ViewConfig,
};
