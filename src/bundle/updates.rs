//! 更新协调器
//!
//! 列出可用更新并执行“全部更新”批量操作。已安装集合与可用更新集合
//! 只通过重新获取来对齐，不在本地做合并。

use std::sync::Arc;

use tracing::{debug, error, info, Instrument};

use super::descriptor::DescriptorParser;
use super::gateway::RegistryGateway;
use super::notify::{messages, Notifier, NotifyFlag};
use super::record::ModuleRecord;
use super::view::{AvailableUpdates, ViewState};
use crate::utils::Result;

/// 全部更新的结果
#[derive(Debug)]
pub enum UpdateAllOutcome {
    /// 没有可用更新，未发出任何调用
    Unavailable,
    /// 已发出批量变更
    Completed {
        /// 变更结果，成功时为已更新的模块数量
        mutation: Result<usize>,
        /// 已安装集合的重新获取结果
        installed_resync: Result<()>,
        /// 可用更新集合的重新获取结果
        updates_resync: Result<()>,
    },
}

impl UpdateAllOutcome {
    /// 批量变更是否成功
    pub fn succeeded(&self) -> bool {
        matches!(self, UpdateAllOutcome::Completed { mutation: Ok(_), .. })
    }

    /// 已更新的模块数量
    pub fn updated_count(&self) -> Option<usize> {
        match self {
            UpdateAllOutcome::Completed { mutation: Ok(count), .. } => Some(*count),
            _ => None,
        }
    }
}

/// 更新协调器
pub struct UpdateCoordinator {
    gateway: Arc<dyn RegistryGateway>,
    notifier: Arc<dyn Notifier>,
    flags: Vec<NotifyFlag>,
}

impl UpdateCoordinator {
    pub fn new(
        gateway: Arc<dyn RegistryGateway>,
        notifier: Arc<dyn Notifier>,
        flags: Vec<NotifyFlag>,
    ) -> Self {
        Self {
            gateway,
            notifier,
            flags,
        }
    }

    /// 获取并解析已安装模块
    pub async fn list_installed(&self) -> Result<Vec<ModuleRecord>> {
        let raw = self.gateway.query_installed_modules().await?;
        let modules = DescriptorParser::parse_installed_all(&raw);
        debug!(count = modules.len(), "已解析已安装模块");
        Ok(modules)
    }

    /// 获取并解析可用更新
    pub async fn list_available_updates(&self) -> Result<AvailableUpdates> {
        let raw = self.gateway.query_available_updates().await?;
        let updates = DescriptorParser::parse_update_all(&raw.updates);
        debug!(count = updates.len(), "已解析可用更新");
        Ok(AvailableUpdates {
            updates,
            last_update_time: raw.last_update_time,
        })
    }

    /// 重新获取已安装集合；失败时通知操作员并保留视图中原有集合
    pub async fn refresh_installed(&self, view: &mut ViewState) -> Result<()> {
        match self.list_installed().await {
            Ok(modules) => {
                view.set_modules(modules);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, error_code = e.error_code(), status = e.status_code(), "获取已安装模块失败");
                self.notifier.notify(messages::ERROR_LOADING_DATA, &self.flags);
                Err(e)
            }
        }
    }

    /// 重新获取可用更新集合；失败时通知操作员并保留视图中原有集合
    pub async fn refresh_updates(&self, view: &mut ViewState) -> Result<()> {
        match self.list_available_updates().await {
            Ok(updates) => {
                view.set_updates(updates);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, error_code = e.error_code(), status = e.status_code(), "获取可用更新失败");
                self.notifier.notify(messages::ERROR_LOADING_DATA, &self.flags);
                Err(e)
            }
        }
    }

    /// 手动检查更新
    pub async fn check_for_updates(&self, view: &mut ViewState) -> Result<()> {
        self.notifier.notify(messages::FETCH_UPDATES, &self.flags);
        self.refresh_updates(view).await
    }

    /// 全部更新
    ///
    /// 可用更新为空时不发出任何调用。否则发出一次无参数的批量变更，
    /// 之后无论成功与否都重新获取已安装集合和可用更新集合。
    pub async fn update_all(&self, view: &mut ViewState) -> UpdateAllOutcome {
        if !view.update_all_available() {
            debug!("没有可用更新，跳过全部更新");
            return UpdateAllOutcome::Unavailable;
        }

        let span = tracing::info_span!("update_all", pending = view.updates().len());
        let mutation = self.mutate().instrument(span.clone()).await;

        let installed_resync = self.refresh_installed(view).instrument(span.clone()).await;
        let updates_resync = self.refresh_updates(view).instrument(span).await;

        UpdateAllOutcome::Completed {
            mutation,
            installed_resync,
            updates_resync,
        }
    }

    async fn mutate(&self) -> Result<usize> {
        info!("发出全部更新");
        match self.gateway.mutate_update_all_modules().await {
            Ok(updated) => {
                info!(count = updated.len(), "全部更新成功");
                self.notifier.notify(messages::UPDATE_ALL_SUCCESS, &self.flags);
                Ok(updated.len())
            }
            Err(e) => {
                error!(error = %e, error_code = e.error_code(), status = e.status_code(), "全部更新失败");
                self.notifier.notify(messages::UPDATE_ALL_ERROR, &self.flags);
                Err(e)
            }
        }
    }
}
