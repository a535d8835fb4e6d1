//! Bundle 数据模型
//!
//! 定义注册中心边界上的类型化记录：已安装模块、可用更新和 Bundle 详情。

use serde::{Deserialize, Serialize};

use super::sort::SortField;

/// Bundle 标识符（注册中心分配，生命周期操作唯一接受的键）
pub type BundleId = i64;

/// Bundle 状态
///
/// 只有 `RESOLVED` 和 `ACTIVE` 驱动可用操作，其他上报状态原样保留。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BundleState {
    /// 已解析（可启动）
    Resolved,
    /// 运行中（可停止、可刷新）
    Active,
    /// 其他状态（INSTALLED, STARTING, STOPPING, 空字符串等）
    Other(String),
}

impl BundleState {
    /// 从注册中心上报的字符串解析，区分大小写，永不失败
    pub fn parse(raw: &str) -> Self {
        match raw {
            "RESOLVED" => BundleState::Resolved,
            "ACTIVE" => BundleState::Active,
            other => BundleState::Other(other.to_string()),
        }
    }

    /// 原始字符串表示
    pub fn as_str(&self) -> &str {
        match self {
            BundleState::Resolved => "RESOLVED",
            BundleState::Active => "ACTIVE",
            BundleState::Other(raw) => raw,
        }
    }

    /// 当前状态下提供给操作员的操作
    pub fn offered_operations(&self) -> &'static [BundleOperation] {
        match self {
            BundleState::Resolved => &[BundleOperation::Start],
            BundleState::Active => &[BundleOperation::Stop, BundleOperation::Refresh],
            BundleState::Other(_) => &[],
        }
    }

    /// 是否提供指定操作
    pub fn offers(&self, operation: BundleOperation) -> bool {
        self.offered_operations().contains(&operation)
    }

    /// 是否运行中
    pub fn is_active(&self) -> bool {
        matches!(self, BundleState::Active)
    }
}

impl Default for BundleState {
    fn default() -> Self {
        BundleState::Other(String::new())
    }
}

impl From<String> for BundleState {
    fn from(raw: String) -> Self {
        BundleState::parse(&raw)
    }
}

impl From<BundleState> for String {
    fn from(state: BundleState) -> Self {
        state.as_str().to_string()
    }
}

impl std::fmt::Display for BundleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 针对单个 Bundle 的生命周期操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleOperation {
    /// 启动
    Start,
    /// 停止
    Stop,
    /// 刷新（重新加载类和连线，成功时状态不变）
    Refresh,
}

impl BundleOperation {
    /// 操作名称
    pub fn as_str(&self) -> &'static str {
        match self {
            BundleOperation::Start => "start",
            BundleOperation::Stop => "stop",
            BundleOperation::Refresh => "refresh",
        }
    }
}

impl std::fmt::Display for BundleOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 可排序、可过滤的记录
pub trait RecordFields {
    /// 名称（过滤只匹配此字段）
    fn name(&self) -> &str;

    /// 指定字段的值，记录没有该字段时返回 None
    fn field_value(&self, field: SortField) -> Option<&str>;
}

/// 已安装模块记录（由 `<name>/<version>:<state>` 解析）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRecord {
    /// 模块名称
    pub name: String,
    /// 已安装版本
    pub version: String,
    /// 状态
    pub state: BundleState,
}

impl ModuleRecord {
    pub fn new(name: impl Into<String>, version: impl Into<String>, state: impl AsRef<str>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            state: BundleState::parse(state.as_ref()),
        }
    }
}

impl RecordFields for ModuleRecord {
    fn name(&self) -> &str {
        &self.name
    }

    fn field_value(&self, field: SortField) -> Option<&str> {
        match field {
            SortField::Name => Some(&self.name),
            SortField::Version => Some(&self.version),
            SortField::State => Some(self.state.as_str()),
            SortField::Available => None,
        }
    }
}

/// 可用更新记录（由 `<name>/<version>:<availableVersion>` 解析）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecord {
    /// 模块名称
    pub name: String,
    /// 当前版本
    pub current_version: String,
    /// 可用版本
    pub available_version: String,
}

impl UpdateRecord {
    pub fn new(
        name: impl Into<String>,
        current_version: impl Into<String>,
        available_version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            current_version: current_version.into(),
            available_version: available_version.into(),
        }
    }
}

impl RecordFields for UpdateRecord {
    fn name(&self) -> &str {
        &self.name
    }

    fn field_value(&self, field: SortField) -> Option<&str> {
        match field {
            SortField::Name => Some(&self.name),
            SortField::Version => Some(&self.current_version),
            SortField::Available => Some(&self.available_version),
            SortField::State => None,
        }
    }
}

/// 清单键值对
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub key: String,
    pub value: String,
}

/// Bundle 详情
///
/// 按行懒加载，不跨行缓存。`symbolic_name` 仅用于展示，
/// 同名的多个版本可以并存，操作必须使用 `bundle_id`。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleDetail {
    pub bundle_id: BundleId,
    pub symbolic_name: String,
    #[serde(default)]
    pub state: BundleState,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub manifest: Vec<ManifestEntry>,
    /// 依赖的 Bundle 名称
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// 依赖图（mermaid 编码）
    #[serde(default)]
    pub dependencies_graph: String,
    /// 依赖的模块名称
    #[serde(default)]
    pub module_dependencies: Vec<String>,
    /// 模块依赖图（mermaid 编码）
    #[serde(default)]
    pub module_dependencies_graph: String,
    /// 需要的节点类型
    #[serde(default)]
    pub node_types_dependencies: Vec<String>,
    #[serde(default)]
    pub license: String,
    /// 提供的服务
    #[serde(default)]
    pub services: Vec<String>,
    /// 使用中的服务
    #[serde(default)]
    pub services_in_use: Vec<String>,
    /// 部署的站点
    #[serde(default)]
    pub sites_deployment: Vec<String>,
}

impl BundleDetail {
    pub fn new(bundle_id: BundleId, symbolic_name: impl Into<String>, version: impl Into<String>, state: BundleState) -> Self {
        Self {
            bundle_id,
            symbolic_name: symbolic_name.into(),
            version: version.into(),
            state,
            ..Default::default()
        }
    }

    /// 展示标签：`<symbolicName> [<bundleId>]`
    pub fn display_label(&self) -> String {
        format!("{} [{}]", self.symbolic_name, self.bundle_id)
    }

    /// 查找清单值
    pub fn manifest_value(&self, key: &str) -> Option<&str> {
        self.manifest
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value.as_str())
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn has_site_deployments(&self) -> bool {
        !self.sites_deployment.is_empty()
    }

    pub fn has_dependency_graph(&self) -> bool {
        !self.dependencies_graph.is_empty()
    }

    pub fn has_module_dependencies(&self) -> bool {
        !self.module_dependencies.is_empty()
    }
}
