//! API 模块
//!
//! 对外提供的控制台门面。
//!
//! # 模块概览
//!
//! - `console`: BundleConsole，一个视图会话的全部操作入口

pub mod console;

// 重导出主要类型
pub use console::BundleConsole;
