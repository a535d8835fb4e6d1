//! 视图状态容器
//!
//! 单个视图会话拥有的已安装模块集合、可用更新集合、过滤和排序设置。
//! 集合在每次成功获取后整体替换，不做增量合并。

use super::filter::filter_records;
use super::record::{ModuleRecord, UpdateRecord};
use super::sort::{sort_records, SortField, SortSpec};

/// 可用更新快照
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailableUpdates {
    /// 可用更新记录
    pub updates: Vec<UpdateRecord>,
    /// 注册中心上报的最近检查时间（原样保存）
    pub last_update_time: Option<String>,
}

/// 视图状态
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    modules: Vec<ModuleRecord>,
    updates: AvailableUpdates,
    filter: String,
    sort: SortSpec,
}

impl ViewState {
    pub fn new(sort: SortSpec, filter: impl Into<String>) -> Self {
        Self {
            sort,
            filter: filter.into(),
            ..Default::default()
        }
    }

    /// 替换已安装模块集合，并按当前排序设置排序
    pub fn set_modules(&mut self, mut modules: Vec<ModuleRecord>) {
        sort_records(&mut modules, self.sort);
        self.modules = modules;
    }

    /// 替换可用更新集合
    pub fn set_updates(&mut self, updates: AvailableUpdates) {
        self.updates = updates;
    }

    /// 设置过滤字符串（原样保存，匹配时再规范化）
    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    /// 设置排序并重新排序
    pub fn set_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
        sort_records(&mut self.modules, sort);
    }

    /// 切换列头排序
    pub fn toggle_sort(&mut self, field: SortField) -> SortSpec {
        let sort = self.sort.toggled(field);
        self.set_sort(sort);
        sort
    }

    pub fn modules(&self) -> &[ModuleRecord] {
        &self.modules
    }

    pub fn updates(&self) -> &[UpdateRecord] {
        &self.updates.updates
    }

    pub fn last_update_time(&self) -> Option<&str> {
        self.updates.last_update_time.as_deref()
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    /// 当前可见的（已排序、已过滤的）模块
    pub fn visible_modules(&self) -> Vec<ModuleRecord> {
        filter_records(&self.modules, &self.filter)
    }

    /// 是否提供“全部更新”操作
    pub fn update_all_available(&self) -> bool {
        !self.updates.updates.is_empty()
    }
}
