//! 注册中心网关
//!
//! 定义控制台与模块注册中心之间的查询/变更契约，以及一个基于快照的内存实现。
//! 超时完全交由网关实现负责，控制台核心不设置任何超时。

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::descriptor::DescriptorParser;
use super::record::{BundleDetail, BundleId, BundleOperation, BundleState};
use crate::utils::{ConsoleError, Result};

/// 可用更新查询的原始响应
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAvailableUpdates {
    /// `<name>/<version>:<availableVersion>` 描述符
    #[serde(default)]
    pub updates: Vec<String>,
    /// 最近一次检查更新的时间（原样传递）
    #[serde(default)]
    pub last_update_time: Option<String>,
}

/// 注册中心网关
#[async_trait]
pub trait RegistryGateway: Send + Sync {
    /// 查询已安装模块，每项为 `<name>/<version>:<state>`
    async fn query_installed_modules(&self) -> Result<Vec<String>>;

    /// 查询可用更新
    async fn query_available_updates(&self) -> Result<RawAvailableUpdates>;

    /// 按名称查询 Bundle 详情，不存在时返回 `None`
    async fn query_bundle_detail(&self, name: &str) -> Result<Option<BundleDetail>>;

    /// 对指定 Bundle 执行生命周期操作
    async fn mutate_bundle(&self, bundle_id: BundleId, operation: BundleOperation) -> Result<()>;

    /// 更新全部模块，返回已更新的模块
    async fn mutate_update_all_modules(&self) -> Result<Vec<String>>;
}

// ============================================================================
// 内存注册中心
// ============================================================================

/// 注册中心快照（YAML/JSON）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrySnapshot {
    /// 已安装的 Bundle
    #[serde(default)]
    pub bundles: Vec<BundleDetail>,
    /// 可用更新描述符
    #[serde(default)]
    pub available_updates: Vec<String>,
    /// 最近一次检查更新的时间
    #[serde(default)]
    pub last_update_time: Option<String>,
}

/// 故障注入点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailurePoint {
    InstalledModules,
    AvailableUpdates,
    BundleDetail,
    Mutation(BundleOperation),
    UpdateAll,
}

/// 基于快照的内存注册中心
///
/// 按注册中心语义执行操作：start 使 RESOLVED/INSTALLED 变为 ACTIVE，
/// stop 使 ACTIVE 变为 RESOLVED，refresh 不改变状态，
/// 全部更新将可用版本写入对应 Bundle 并清空可用更新。
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    state: RwLock<RegistrySnapshot>,
    failures: RwLock<HashSet<FailurePoint>>,
}

impl InMemoryRegistry {
    pub fn new(snapshot: RegistrySnapshot) -> Self {
        Self {
            state: RwLock::new(snapshot),
            failures: RwLock::new(HashSet::new()),
        }
    }

    /// 从 YAML 快照文件加载
    pub async fn from_snapshot_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let snapshot: RegistrySnapshot = serde_yaml::from_str(&content)?;
        tracing::debug!(path = %path.display(), bundles = snapshot.bundles.len(), "已加载注册中心快照");
        Ok(Self::new(snapshot))
    }

    /// 将当前快照写回 YAML 文件
    pub async fn save_snapshot_file(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(&*self.state.read().await)?;
        tokio::fs::write(path, content).await?;
        tracing::debug!(path = %path.display(), "已保存注册中心快照");
        Ok(())
    }

    /// 当前快照副本
    pub async fn snapshot(&self) -> RegistrySnapshot {
        self.state.read().await.clone()
    }

    /// 使指定调用失败
    pub async fn fail_on(&self, point: FailurePoint) {
        self.failures.write().await.insert(point);
    }

    /// 清除所有故障注入
    pub async fn clear_failures(&self) {
        self.failures.write().await.clear();
    }

    async fn check(&self, point: FailurePoint, what: &str) -> std::result::Result<(), String> {
        if self.failures.read().await.contains(&point) {
            Err(format!("注册中心拒绝了 {}", what))
        } else {
            Ok(())
        }
    }

    fn descriptor(bundle: &BundleDetail) -> String {
        format!("{}/{}:{}", bundle.symbolic_name, bundle.version, bundle.state)
    }
}

#[async_trait]
impl RegistryGateway for InMemoryRegistry {
    async fn query_installed_modules(&self) -> Result<Vec<String>> {
        self.check(FailurePoint::InstalledModules, "installedModules")
            .await
            .map_err(|reason| ConsoleError::fetch("installedModules", reason))?;

        let state = self.state.read().await;
        Ok(state.bundles.iter().map(Self::descriptor).collect())
    }

    async fn query_available_updates(&self) -> Result<RawAvailableUpdates> {
        self.check(FailurePoint::AvailableUpdates, "availableUpdates")
            .await
            .map_err(|reason| ConsoleError::fetch("availableUpdates", reason))?;

        let state = self.state.read().await;
        Ok(RawAvailableUpdates {
            updates: state.available_updates.clone(),
            last_update_time: state.last_update_time.clone(),
        })
    }

    async fn query_bundle_detail(&self, name: &str) -> Result<Option<BundleDetail>> {
        self.check(FailurePoint::BundleDetail, "bundle")
            .await
            .map_err(|reason| ConsoleError::fetch(format!("bundle({})", name), reason))?;

        let state = self.state.read().await;
        Ok(state
            .bundles
            .iter()
            .find(|bundle| bundle.symbolic_name == name)
            .cloned())
    }

    async fn mutate_bundle(&self, bundle_id: BundleId, operation: BundleOperation) -> Result<()> {
        self.check(FailurePoint::Mutation(operation), operation.as_str())
            .await
            .map_err(|reason| ConsoleError::mutation(operation.as_str(), Some(bundle_id), reason))?;

        let mut state = self.state.write().await;
        let bundle = state
            .bundles
            .iter_mut()
            .find(|bundle| bundle.bundle_id == bundle_id)
            .ok_or_else(|| {
                ConsoleError::mutation(operation.as_str(), Some(bundle_id), "未知的 bundle id")
            })?;

        let next = match (operation, &bundle.state) {
            (BundleOperation::Start, BundleState::Active) => BundleState::Active,
            (BundleOperation::Start, BundleState::Resolved) => BundleState::Active,
            (BundleOperation::Start, BundleState::Other(raw)) if raw == "INSTALLED" => {
                BundleState::Active
            }
            (BundleOperation::Stop, BundleState::Active) => BundleState::Resolved,
            (BundleOperation::Stop, BundleState::Resolved) => BundleState::Resolved,
            (BundleOperation::Refresh, current) => current.clone(),
            (_, current) => {
                return Err(ConsoleError::mutation(
                    operation.as_str(),
                    Some(bundle_id),
                    format!("状态 {} 下无法执行", current),
                ))
            }
        };

        tracing::debug!(bundle_id, operation = %operation, from = %bundle.state, to = %next, "注册中心状态变更");
        bundle.state = next;
        Ok(())
    }

    async fn mutate_update_all_modules(&self) -> Result<Vec<String>> {
        self.check(FailurePoint::UpdateAll, "updateModules")
            .await
            .map_err(|reason| ConsoleError::mutation("updateModules", None, reason))?;

        let mut state = self.state.write().await;
        let updates = DescriptorParser::parse_update_all(&state.available_updates);
        let mut updated = Vec::new();

        for update in &updates {
            for bundle in state
                .bundles
                .iter_mut()
                .filter(|bundle| bundle.symbolic_name == update.name)
            {
                bundle.version = update.available_version.clone();
                updated.push(format!("{}/{}", update.name, update.available_version));
            }
        }

        state.available_updates.clear();
        Ok(updated)
    }
}
