//! BundleConsole 控制台门面
//!
//! 一个 `BundleConsole` 对应一个视图会话：持有已安装模块集合、可用更新集合、
//! 过滤与排序设置，以及已加载详情的行。所有注册中心交互都经由
//! [`RegistryGateway`]。
//!
//! # 示例
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use bundle_console::{BundleConsole, ConsoleConfig, InMemoryRegistry, TracingNotifier};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Arc::new(InMemoryRegistry::default());
//!     let mut console = BundleConsole::new(
//!         ConsoleConfig::default(),
//!         registry,
//!         Arc::new(TracingNotifier),
//!     )?;
//!
//!     console.load().await?;
//!     console.set_filter("mod-a");
//!     for module in console.visible_modules() {
//!         println!("{} {} {}", module.name, module.version, module.state);
//!     }
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::bundle::{
    messages, BundleDetail, BundleOperation, BundleRow, LifecycleController, ModuleRecord,
    Notifier, NotifyFlag, OperationOutcome, RegistryGateway, SortField, SortSpec,
    UpdateAllOutcome, UpdateCoordinator, UpdateRecord, ViewState,
};
use crate::core::config::ConsoleConfig;
use crate::utils::{ConsoleError, Result};

/// 控制台门面
pub struct BundleConsole {
    /// 控制台配置
    config: ConsoleConfig,

    /// 视图状态
    view: ViewState,

    /// 已加载详情的行（按模块名称）
    rows: HashMap<String, BundleRow>,

    /// 生命周期控制器
    lifecycle: LifecycleController,

    /// 更新协调器
    updates: UpdateCoordinator,

    notifier: Arc<dyn Notifier>,
    flags: Vec<NotifyFlag>,
}

impl BundleConsole {
    // ========================================================================
    // 初始化
    // ========================================================================

    /// 创建控制台
    ///
    /// # Errors
    ///
    /// 配置中的排序字段或方向无效时返回 `InvalidConfigValue`
    pub fn new(
        config: ConsoleConfig,
        gateway: Arc<dyn RegistryGateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        config.validate()?;
        let sort = config.view.sort_spec()?;
        let flags = config.notifications.flags();

        let lifecycle = LifecycleController::new(gateway.clone(), notifier.clone(), flags.clone());
        let updates = UpdateCoordinator::new(gateway, notifier.clone(), flags.clone());
        let view = ViewState::new(sort, config.view.filter.clone());

        debug!(sort_field = %sort.field, sort_direction = %sort.direction, "控制台初始化完成");
        Ok(Self {
            config,
            view,
            rows: HashMap::new(),
            lifecycle,
            updates,
            notifier,
            flags,
        })
    }

    /// 加载已安装模块和可用更新
    ///
    /// 两个集合独立获取。任一获取失败时通知操作员并返回错误，
    /// 获取成功的集合仍会替换，失败的集合保留原值。
    pub async fn load(&mut self) -> Result<()> {
        info!("加载模块数据");
        let (installed, updates) = tokio::join!(
            self.updates.list_installed(),
            self.updates.list_available_updates()
        );

        let mut failure = None;
        match installed {
            Ok(modules) => self.view.set_modules(modules),
            Err(e) => failure = Some(e),
        }
        match updates {
            Ok(updates) => self.view.set_updates(updates),
            Err(e) => {
                failure.get_or_insert(e);
            }
        }

        match failure {
            None => {
                info!(
                    modules = self.view.modules().len(),
                    updates = self.view.updates().len(),
                    "模块数据加载完成"
                );
                Ok(())
            }
            Some(e) => {
                warn!(error = %e, "模块数据加载失败");
                self.notifier.notify(messages::ERROR_LOADING_DATA, &self.flags);
                Err(e)
            }
        }
    }

    // ========================================================================
    // 视图
    // ========================================================================

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.view.set_filter(filter);
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.view.set_sort(sort);
    }

    /// 切换列头排序
    pub fn toggle_sort(&mut self, field: SortField) -> SortSpec {
        self.view.toggle_sort(field)
    }

    /// 当前可见的模块
    pub fn visible_modules(&self) -> Vec<ModuleRecord> {
        self.view.visible_modules()
    }

    pub fn available_updates(&self) -> &[UpdateRecord] {
        self.view.updates()
    }

    /// 是否提供“全部更新”
    pub fn update_all_available(&self) -> bool {
        self.view.update_all_available()
    }

    // ========================================================================
    // 行详情
    // ========================================================================

    pub fn row(&self, name: &str) -> Option<&BundleRow> {
        self.rows.get(name)
    }

    /// 加载单行详情
    pub async fn load_row(&mut self, name: &str) -> Result<&BundleRow> {
        let row = self
            .rows
            .entry(name.to_string())
            .or_insert_with(|| BundleRow::new(name));
        self.lifecycle.load(row).await?;
        Ok(row)
    }

    /// 加载并返回 Bundle 详情
    ///
    /// 注册中心没有该名称时返回 `BundleNotFound`
    pub async fn detail(&mut self, name: &str) -> Result<&BundleDetail> {
        let row = self.load_row(name).await?;
        row.detail()
            .ok_or_else(|| ConsoleError::BundleNotFound(name.to_string()))
    }

    /// 并发加载所有可见行的详情
    ///
    /// 每行独立结束于 Present/Absent/Failed，一行失败不影响其他行。
    /// 返回加载失败的行数。
    pub async fn load_rows(&mut self) -> usize {
        let mut rows: Vec<BundleRow> = self
            .view
            .visible_modules()
            .into_iter()
            .map(|module| {
                self.rows
                    .remove(&module.name)
                    .unwrap_or_else(|| BundleRow::new(module.name))
            })
            .collect();

        let lifecycle = &self.lifecycle;
        let results = join_all(rows.iter_mut().map(|row| lifecycle.load(row))).await;
        let failed = results.iter().filter(|result| result.is_err()).count();

        for row in rows {
            self.rows.insert(row.module_name().to_string(), row);
        }

        debug!(rows = self.rows.len(), failed, "行详情加载完成");
        failed
    }

    // ========================================================================
    // 生命周期操作
    // ========================================================================

    pub async fn start(&mut self, name: &str) -> Result<OperationOutcome> {
        self.execute(name, BundleOperation::Start).await
    }

    pub async fn stop(&mut self, name: &str) -> Result<OperationOutcome> {
        self.execute(name, BundleOperation::Stop).await
    }

    pub async fn refresh(&mut self, name: &str) -> Result<OperationOutcome> {
        self.execute(name, BundleOperation::Refresh).await
    }

    /// 对已加载详情的行执行操作
    pub async fn execute(&mut self, name: &str, operation: BundleOperation) -> Result<OperationOutcome> {
        let row = self.rows.get_mut(name).ok_or_else(|| {
            warn!(module = %name, operation = %operation, "详情未加载，拒绝操作");
            ConsoleError::DetailNotLoaded(name.to_string())
        })?;
        self.lifecycle.execute(row, operation).await
    }

    // ========================================================================
    // 更新
    // ========================================================================

    /// 全部更新
    pub async fn update_all(&mut self) -> UpdateAllOutcome {
        self.updates.update_all(&mut self.view).await
    }

    /// 手动检查更新
    pub async fn check_for_updates(&mut self) -> Result<()> {
        self.updates.check_for_updates(&mut self.view).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::{
        BundleState, CollectingNotifier, FailurePoint, InMemoryRegistry,
        RegistrySnapshot, RowStatus, SortDirection,
    };

    fn registry() -> Arc<InMemoryRegistry> {
        Arc::new(InMemoryRegistry::new(RegistrySnapshot {
            bundles: vec![
                BundleDetail::new(10, "mod-b", "2.1", BundleState::Resolved),
                BundleDetail::new(11, "mod-a", "1.0", BundleState::Active),
            ],
            available_updates: vec!["mod-a/1.0:1.1".to_string()],
            last_update_time: None,
        }))
    }

    fn console(registry: Arc<InMemoryRegistry>) -> (BundleConsole, Arc<CollectingNotifier>) {
        let notifier = Arc::new(CollectingNotifier::new());
        let console =
            BundleConsole::new(ConsoleConfig::default(), registry, notifier.clone()).unwrap();
        (console, notifier)
    }

    #[tokio::test]
    async fn test_load_and_view() {
        let (mut console, _) = console(registry());
        console.load().await.unwrap();

        let names: Vec<_> = console.visible_modules().into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["mod-a", "mod-b"]);
        assert!(console.update_all_available());

        let sort = console.toggle_sort(SortField::Name);
        assert_eq!(sort.direction, SortDirection::Desc);
        assert_eq!(console.visible_modules()[0].name, "mod-b");
    }

    #[tokio::test]
    async fn test_load_failure_notifies_and_keeps_other_collection() {
        let registry = registry();
        registry.fail_on(FailurePoint::AvailableUpdates).await;
        let (mut console, notifier) = console(registry);

        let err = console.load().await.unwrap_err();
        assert!(matches!(err, ConsoleError::FetchFailed { .. }));
        assert_eq!(console.view().modules().len(), 2);
        assert!(!console.update_all_available());
        assert_eq!(notifier.messages(), vec![messages::ERROR_LOADING_DATA]);
    }

    #[tokio::test]
    async fn test_load_rows_and_start() {
        let (mut console, _) = console(registry());
        console.load().await.unwrap();
        assert_eq!(console.load_rows().await, 0);

        let outcome = console.start("mod-b").await.unwrap();
        assert!(outcome.succeeded());
        let detail = console.row("mod-b").unwrap().detail().unwrap();
        assert_eq!(detail.state, BundleState::Active);
    }

    #[tokio::test]
    async fn test_operation_requires_loaded_row() {
        let (mut console, _) = console(registry());
        let err = console.stop("mod-a").await.unwrap_err();
        assert!(matches!(err, ConsoleError::DetailNotLoaded(_)));
    }

    #[tokio::test]
    async fn test_load_row_absent() {
        let (mut console, _) = console(registry());
        let row = console.load_row("ghost").await.unwrap();
        assert_eq!(row.status(), &RowStatus::Absent);

        let err = console.detail("ghost").await.unwrap_err();
        assert!(matches!(err, ConsoleError::BundleNotFound(_)));
        assert_eq!(console.detail("mod-a").await.unwrap().bundle_id, 11);
    }

    #[tokio::test]
    async fn test_update_all_resync_failure_notifies() {
        let registry = registry();
        let (mut console, notifier) = console(registry.clone());
        console.load().await.unwrap();
        registry.fail_on(FailurePoint::InstalledModules).await;

        let outcome = console.update_all().await;
        assert!(outcome.succeeded());
        assert!(matches!(
            outcome,
            UpdateAllOutcome::Completed { installed_resync: Err(_), .. }
        ));
        assert_eq!(
            notifier.messages(),
            vec![messages::UPDATE_ALL_SUCCESS, messages::ERROR_LOADING_DATA]
        );

        registry.clear_failures().await;
        registry.fail_on(FailurePoint::AvailableUpdates).await;
        assert!(console.check_for_updates().await.is_err());
        assert_eq!(
            notifier.messages(),
            vec![
                messages::UPDATE_ALL_SUCCESS,
                messages::ERROR_LOADING_DATA,
                messages::FETCH_UPDATES,
                messages::ERROR_LOADING_DATA,
            ]
        );
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let mut config = ConsoleConfig::default();
        config.view.sort_field = "size".to_string();
        let result = BundleConsole::new(config, registry(), Arc::new(CollectingNotifier::new()));
        assert!(matches!(result, Err(ConsoleError::InvalidConfigValue { .. })));
    }
}
