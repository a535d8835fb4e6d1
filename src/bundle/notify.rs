//! 操作员通知
//!
//! 通知是发出即忘的，控制台核心不消费任何返回值。

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tracing::info;

/// 通知标志
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotifyFlag {
    /// 显示关闭按钮
    CloseButton,
    /// 不自动关闭
    NoAutomaticClose,
}

impl NotifyFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotifyFlag::CloseButton => "closeButton",
            NotifyFlag::NoAutomaticClose => "noAutomaticClose",
        }
    }
}

/// 通知消息键
pub mod messages {
    pub const START_BUNDLE_SUCCESS: &str = "label.startBundleSuccess";
    pub const START_BUNDLE_ERROR: &str = "label.startBundleError";
    pub const STOP_BUNDLE_SUCCESS: &str = "label.stopBundleSuccess";
    pub const STOP_BUNDLE_ERROR: &str = "label.stopBundleError";
    pub const REFRESH_BUNDLE_SUCCESS: &str = "label.refreshBundleSuccess";
    pub const REFRESH_BUNDLE_ERROR: &str = "label.refreshBundleError";
    pub const UPDATE_ALL_SUCCESS: &str = "label.updateAllSuccess";
    pub const UPDATE_ALL_ERROR: &str = "label.updateAllError";
    pub const FETCH_UPDATES: &str = "label.fetchUpdates";
    pub const ERROR_LOADING_DATA: &str = "label.errors.loadingData";
    pub const ERROR_LOADING_MODULE_DATA: &str = "label.errors.loadingModuleData";
    pub const ERROR_MODULE_NOT_FOUND: &str = "label.errors.moduleNotFound";
}

/// 通知协作者
pub trait Notifier: Send + Sync {
    /// 发出通知
    fn notify(&self, message: &str, flags: &[NotifyFlag]);
}

/// 只写日志的通知器
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str, flags: &[NotifyFlag]) {
        let flags: Vec<_> = flags.iter().map(NotifyFlag::as_str).collect();
        info!(notification = message, flags = ?flags, "通知");
    }
}

/// 已发出的通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub flags: Vec<NotifyFlag>,
    pub issued_at: DateTime<Utc>,
}

/// 收集所有通知的通知器（CLI 输出与测试使用）
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    received: Mutex<Vec<Notification>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn received(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.received.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 取出并清空已收集的通知
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.received())
    }

    /// 已收集通知的消息键
    pub fn messages(&self) -> Vec<String> {
        self.received().iter().map(|n| n.message.clone()).collect()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, message: &str, flags: &[NotifyFlag]) {
        let notification = Notification {
            message: message.to_string(),
            flags: flags.to_vec(),
            issued_at: Utc::now(),
        };
        self.received().push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_notifier() {
        let notifier = CollectingNotifier::new();
        notifier.notify(messages::START_BUNDLE_SUCCESS, &[NotifyFlag::CloseButton]);
        notifier.notify(messages::FETCH_UPDATES, &[]);

        assert_eq!(
            notifier.messages(),
            vec!["label.startBundleSuccess", "label.fetchUpdates"]
        );

        let drained = notifier.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].flags, vec![NotifyFlag::CloseButton]);
        assert!(notifier.messages().is_empty());
    }

    #[test]
    fn test_tracing_notifier_as_trait_object() {
        let notifier: Box<dyn Notifier> = Box::new(TracingNotifier);
        notifier.notify(messages::UPDATE_ALL_SUCCESS, &[NotifyFlag::NoAutomaticClose]);
    }

    #[test]
    fn test_flag_names() {
        assert_eq!(NotifyFlag::CloseButton.as_str(), "closeButton");
        assert_eq!(NotifyFlag::NoAutomaticClose.as_str(), "noAutomaticClose");
    }
}
