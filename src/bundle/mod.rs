//! Bundle 管理模块
//!
//! 包含控制台的核心组件：
//! - 描述符解析与记录类型
//! - 排序与过滤
//! - 视图状态
//! - 注册中心网关契约
//! - 生命周期操作与全部更新

pub mod descriptor;
pub mod filter;
pub mod gateway;
pub mod lifecycle;
pub mod notify;
pub mod record;
pub mod sort;
pub mod updates;
pub mod view;

// 重导出常用类型
pub use descriptor::{DescriptorParser, ParseMode, ParsedDescriptor};
pub use filter::filter_records;
pub use gateway::{FailurePoint, InMemoryRegistry, RawAvailableUpdates, RegistryGateway, RegistrySnapshot};
pub use lifecycle::{BundleRow, LifecycleController, OperationOutcome, RowStatus};
pub use notify::{messages, CollectingNotifier, Notification, Notifier, NotifyFlag, TracingNotifier};
pub use record::{
    BundleDetail, BundleId, BundleOperation, BundleState, ManifestEntry, ModuleRecord,
    RecordFields, UpdateRecord,
};
pub use sort::{compare, sort_records, SortDirection, SortField, SortSpec};
pub use updates::{UpdateAllOutcome, UpdateCoordinator};
pub use view::{AvailableUpdates, ViewState};
