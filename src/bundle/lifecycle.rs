//! 生命周期控制器
//!
//! 针对单个 Bundle 发起 start/stop/refresh 操作，并在操作完成后（无论成功与否）
//! 重新获取该 Bundle 的详情，使显示状态始终来自注册中心而不是乐观推测。

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, error, info, warn, Instrument};

use super::gateway::RegistryGateway;
use super::notify::{messages, Notifier, NotifyFlag};
use super::record::{BundleDetail, BundleId, BundleOperation};
use crate::utils::{ConsoleError, Result};

/// 行详情状态
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RowStatus {
    /// 尚未获取
    #[default]
    Unloaded,
    /// 注册中心返回了详情
    Present(BundleDetail),
    /// 注册中心没有该名称的 Bundle
    Absent,
    /// 获取失败（保留错误描述）
    Failed(String),
}

/// 列表中的一行：模块名称及其最近一次获取的详情
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleRow {
    module_name: String,
    status: RowStatus,
}

impl BundleRow {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            status: RowStatus::Unloaded,
        }
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn status(&self) -> &RowStatus {
        &self.status
    }

    /// 最近一次成功获取的详情
    pub fn detail(&self) -> Option<&BundleDetail> {
        match &self.status {
            RowStatus::Present(detail) => Some(detail),
            _ => None,
        }
    }

    /// 当前提供的操作；没有详情时不提供任何操作
    pub fn offered_operations(&self) -> &'static [BundleOperation] {
        self.detail()
            .map(|detail| detail.state.offered_operations())
            .unwrap_or(&[])
    }
}

/// 一次操作的结果
///
/// 变更结果与重新同步结果分别记录，重新同步失败不掩盖变更结果。
#[derive(Debug)]
pub struct OperationOutcome {
    pub operation: BundleOperation,
    pub bundle_id: BundleId,
    pub mutation: Result<()>,
    pub resync: Result<()>,
}

impl OperationOutcome {
    /// 变更是否成功
    pub fn succeeded(&self) -> bool {
        self.mutation.is_ok()
    }
}

/// 进行中标记，丢弃时释放（包括操作 future 被取消的情况）
struct InFlightGuard<'a> {
    in_flight: &'a Mutex<HashSet<BundleId>>,
    bundle_id: BundleId,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.bundle_id);
    }
}

/// 生命周期控制器
pub struct LifecycleController {
    gateway: Arc<dyn RegistryGateway>,
    notifier: Arc<dyn Notifier>,
    flags: Vec<NotifyFlag>,
    in_flight: Mutex<HashSet<BundleId>>,
}

impl LifecycleController {
    pub fn new(
        gateway: Arc<dyn RegistryGateway>,
        notifier: Arc<dyn Notifier>,
        flags: Vec<NotifyFlag>,
    ) -> Self {
        Self {
            gateway,
            notifier,
            flags,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// 获取行详情
    ///
    /// 不存在的名称得到 `RowStatus::Absent`（不是错误，但会通知操作员）。
    /// 获取失败时保留上一次的详情，返回 `FetchFailed`。
    pub async fn load(&self, row: &mut BundleRow) -> Result<()> {
        match self.gateway.query_bundle_detail(&row.module_name).await {
            Ok(Some(detail)) => {
                debug!(module = %row.module_name, bundle_id = detail.bundle_id, state = %detail.state, "已获取 Bundle 详情");
                row.status = RowStatus::Present(detail);
                Ok(())
            }
            Ok(None) => {
                warn!(module = %row.module_name, "注册中心中未找到 Bundle");
                self.notifier.notify(messages::ERROR_MODULE_NOT_FOUND, &self.flags);
                row.status = RowStatus::Absent;
                Ok(())
            }
            Err(e) => {
                error!(module = %row.module_name, error = %e, "获取 Bundle 详情失败");
                self.notifier.notify(messages::ERROR_LOADING_MODULE_DATA, &self.flags);
                if row.detail().is_none() {
                    row.status = RowStatus::Failed(e.to_string());
                }
                Err(e)
            }
        }
    }

    /// 启动 Bundle（仅 RESOLVED）
    pub async fn start(&self, row: &mut BundleRow) -> Result<OperationOutcome> {
        self.execute(row, BundleOperation::Start).await
    }

    /// 停止 Bundle（仅 ACTIVE）
    pub async fn stop(&self, row: &mut BundleRow) -> Result<OperationOutcome> {
        self.execute(row, BundleOperation::Stop).await
    }

    /// 刷新 Bundle（仅 ACTIVE）
    pub async fn refresh(&self, row: &mut BundleRow) -> Result<OperationOutcome> {
        self.execute(row, BundleOperation::Refresh).await
    }

    /// 执行生命周期操作
    ///
    /// Bundle ID 取自该行最近一次成功获取的详情。
    /// 以下情况直接拒绝，不发出变更：详情未加载、当前状态不提供该操作、
    /// 同一 Bundle 的操作仍在进行中。
    pub async fn execute(&self, row: &mut BundleRow, operation: BundleOperation) -> Result<OperationOutcome> {
        let detail = row.detail().ok_or_else(|| {
            warn!(module = %row.module_name, operation = %operation, "详情未加载，拒绝操作");
            ConsoleError::DetailNotLoaded(row.module_name.clone())
        })?;
        let bundle_id = detail.bundle_id;

        if !detail.state.offers(operation) {
            warn!(bundle_id, operation = %operation, state = %detail.state, "当前状态不提供该操作");
            return Err(ConsoleError::OperationNotOffered {
                operation: operation.to_string(),
                state: detail.state.to_string(),
            });
        }

        let _guard = self.acquire(bundle_id).ok_or_else(|| {
            warn!(bundle_id, operation = %operation, "操作仍在进行中，忽略重复调用");
            ConsoleError::OperationInFlight {
                operation: operation.to_string(),
                bundle_id,
            }
        })?;

        let span = crate::operation_span!(operation, bundle_id);
        let mutation = self.mutate(bundle_id, operation).instrument(span.clone()).await;
        let resync = self.load(row).instrument(span).await;

        Ok(OperationOutcome {
            operation,
            bundle_id,
            mutation,
            resync,
        })
    }

    /// 指定 Bundle 是否有操作在进行中
    pub fn is_in_flight(&self, bundle_id: BundleId) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&bundle_id)
    }

    fn acquire(&self, bundle_id: BundleId) -> Option<InFlightGuard<'_>> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if !in_flight.insert(bundle_id) {
            return None;
        }
        Some(InFlightGuard {
            in_flight: &self.in_flight,
            bundle_id,
        })
    }

    async fn mutate(&self, bundle_id: BundleId, operation: BundleOperation) -> Result<()> {
        info!("发出 Bundle 操作");
        let (success, failure) = Self::message_keys(operation);

        match self.gateway.mutate_bundle(bundle_id, operation).await {
            Ok(()) => {
                info!("Bundle 操作成功");
                self.notifier.notify(success, &self.flags);
                Ok(())
            }
            Err(e) => {
                // 不重试
                error!(error = %e, error_code = e.error_code(), status = e.status_code(), "Bundle 操作失败");
                self.notifier.notify(failure, &self.flags);
                Err(e)
            }
        }
    }

    fn message_keys(operation: BundleOperation) -> (&'static str, &'static str) {
        match operation {
            BundleOperation::Start => (messages::START_BUNDLE_SUCCESS, messages::START_BUNDLE_ERROR),
            BundleOperation::Stop => (messages::STOP_BUNDLE_SUCCESS, messages::STOP_BUNDLE_ERROR),
            BundleOperation::Refresh => {
                (messages::REFRESH_BUNDLE_SUCCESS, messages::REFRESH_BUNDLE_ERROR)
            }
        }
    }
}
