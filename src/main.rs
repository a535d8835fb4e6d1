//! Bundle Console 命令行入口
//!
//! 查看已安装模块、可用更新和 Bundle 详情，并执行生命周期操作。
//!
//! # 命令概览
//!
//! - `list` - 列出已安装模块（支持过滤和排序）
//! - `updates` - 列出可用更新
//! - `detail` - 查看 Bundle 详情
//! - `start` / `stop` / `refresh` - 生命周期操作
//! - `update-all` - 全部更新
//! - `check-config` - 验证配置文件
//! - `version` - 显示版本信息
//!
//! # 使用示例
//!
//! ```bash
//! # 按名称过滤，按版本降序
//! bundle-console -r registry.yaml list --filter core --sort version --desc
//!
//! # 启动 Bundle
//! bundle-console -r registry.yaml start mod-b
//!
//! # 检查配置文件
//! bundle-console check-config -c config.yaml
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, TimeZone, Utc};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use bundle_console::{
    BundleConsole, BundleDetail, BundleOperation, CollectingNotifier, ConsoleConfig,
    InMemoryRegistry, LogGuard, Logger, LoggerConfig, OperationOutcome, SortDirection,
    SortField, SortSpec, UpdateAllOutcome,
};

/// Bundle Console - 模块生命周期控制台
#[derive(Parser)]
#[command(name = "bundle-console")]
#[command(version, about = "查看并控制已部署 Bundle 的生命周期", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// 配置文件路径
    #[arg(short, long, default_value = "config.yaml", global = true)]
    config: PathBuf,

    /// 日志级别 (trace, debug, info, warn, error)，覆盖配置文件
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// 注册中心快照文件（YAML），覆盖配置文件
    #[arg(short, long, global = true)]
    registry: Option<PathBuf>,

    /// 子命令
    #[command(subcommand)]
    command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
enum Commands {
    /// 列出已安装模块
    List {
        /// 按名称过滤（不区分大小写）
        #[arg(short, long)]
        filter: Option<String>,

        /// 排序字段 (name, version, state)
        #[arg(short, long)]
        sort: Option<SortField>,

        /// 降序
        #[arg(long)]
        desc: bool,
    },

    /// 列出可用更新
    Updates,

    /// 查看 Bundle 详情
    Detail {
        /// 模块名称
        name: String,
    },

    /// 启动 Bundle（仅 RESOLVED）
    Start { name: String },

    /// 停止 Bundle（仅 ACTIVE）
    Stop { name: String },

    /// 刷新 Bundle（仅 ACTIVE）
    Refresh { name: String },

    /// 更新全部模块
    UpdateAll,

    /// 验证配置文件
    CheckConfig {
        /// 配置文件路径（不指定则使用全局 -c 选项）
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// 查看版本信息
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Version => {
            print_version();
            return Ok(());
        }
        Commands::CheckConfig { ref config } => {
            let path = config.clone().unwrap_or_else(|| cli.config.clone());
            return check_config(&path).await;
        }
        _ => {}
    }

    let mut config = load_config(&cli.config).await?;
    config.merge(cli_overrides(&cli));
    let _guard = init_logging(&config);

    let registry = Arc::new(load_registry(config.registry.snapshot.as_deref()).await?);
    let notifier = Arc::new(CollectingNotifier::new());
    let mut console = BundleConsole::new(config.clone(), registry.clone(), notifier.clone())?;

    let result = run(&mut console, cli.command).await;
    print_notifications(&notifier);

    if let (Ok(true), Some(path)) = (&result, config.registry.snapshot.as_deref()) {
        registry
            .save_snapshot_file(path)
            .await
            .with_context(|| format!("写回注册中心快照失败: {}", path.display()))?;
        info!(path = %path.display(), "注册中心快照已更新");
    }

    result.map(|_| ())
}

/// 执行子命令，返回注册中心状态是否可能被修改
async fn run(console: &mut BundleConsole, command: Commands) -> anyhow::Result<bool> {
    console.load().await.context("加载模块数据失败")?;

    match command {
        Commands::List { filter, sort, desc } => {
            if let Some(filter) = filter {
                console.set_filter(filter);
            }
            if sort.is_some() || desc {
                let field = sort.unwrap_or(console.view().sort().field);
                let direction = if desc { SortDirection::Desc } else { SortDirection::Asc };
                console.set_sort(SortSpec::new(field, direction));
            }
            print_modules(console);
            Ok(false)
        }
        Commands::Updates => {
            print_updates(console);
            Ok(false)
        }
        Commands::Detail { name } => {
            print_detail(console.detail(&name).await?);
            Ok(false)
        }
        Commands::Start { name } => lifecycle(console, &name, BundleOperation::Start).await,
        Commands::Stop { name } => lifecycle(console, &name, BundleOperation::Stop).await,
        Commands::Refresh { name } => lifecycle(console, &name, BundleOperation::Refresh).await,
        Commands::UpdateAll => match console.update_all().await {
            UpdateAllOutcome::Unavailable => {
                println!("没有可用更新");
                Ok(false)
            }
            UpdateAllOutcome::Completed {
                mutation,
                installed_resync,
                updates_resync,
            } => {
                let count = mutation.context("全部更新失败")?;
                println!("已更新 {} 个模块", count);
                if let Err(e) = &updates_resync {
                    warn!(error = %e, "全部更新后重新获取可用更新失败");
                }
                match installed_resync {
                    Ok(()) => print_modules(console),
                    Err(e) => {
                        warn!(error = %e, "全部更新后重新获取已安装模块失败");
                        println!("无法重新获取已安装模块，列表可能已过期");
                    }
                }
                Ok(true)
            }
        },
        Commands::CheckConfig { .. } | Commands::Version => Ok(false),
    }
}

async fn lifecycle(console: &mut BundleConsole, name: &str, operation: BundleOperation) -> anyhow::Result<bool> {
    console.detail(name).await?;

    let OperationOutcome {
        bundle_id,
        mutation,
        resync,
        ..
    } = console.execute(name, operation).await?;
    mutation.with_context(|| format!("{} 失败 (bundle_id: {})", operation, bundle_id))?;
    if let Err(e) = resync {
        warn!(error = %e, "操作后重新获取详情失败");
    }

    if let Some(detail) = console.row(name).and_then(|row| row.detail()) {
        println!("{} -> {}", detail.display_label(), detail.state);
    }
    Ok(true)
}

/// 命令行参数中覆盖配置文件的部分
fn cli_overrides(cli: &Cli) -> ConsoleConfig {
    let mut builder = ConsoleConfig::builder();
    if let Some(level) = &cli.log_level {
        builder = builder.log_level(level.clone());
    }
    if let Some(path) = &cli.registry {
        builder = builder.registry_snapshot(path.clone());
    }
    builder.build()
}

/// 初始化日志系统（CLI 输出走标准输出，日志走标准错误）
fn init_logging(config: &ConsoleConfig) -> LogGuard {
    Logger::try_init(LoggerConfig::from_log_config(&config.logging))
}

/// 加载配置文件，不存在时使用默认配置
async fn load_config(path: &Path) -> anyhow::Result<ConsoleConfig> {
    if path.exists() {
        Ok(ConsoleConfig::from_file(path).await?)
    } else {
        Ok(ConsoleConfig::default())
    }
}

async fn load_registry(snapshot: Option<&Path>) -> anyhow::Result<InMemoryRegistry> {
    match snapshot {
        Some(path) => InMemoryRegistry::from_snapshot_file(path)
            .await
            .with_context(|| format!("加载注册中心快照失败: {}", path.display())),
        None => {
            warn!("未指定注册中心快照，使用空注册中心");
            Ok(InMemoryRegistry::default())
        }
    }
}

/// 格式化最近检查更新时间（DD/MM/YYYY HH:mm，UTC）
///
/// 支持 RFC 3339 和毫秒时间戳，无法识别时原样返回。
fn format_update_time(raw: &str) -> String {
    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|time| time.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            raw.trim()
                .parse::<i64>()
                .ok()
                .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
        });

    match parsed {
        Some(time) => time.format("%d/%m/%Y %H:%M").to_string(),
        None => raw.to_string(),
    }
}

fn print_modules(console: &BundleConsole) {
    let modules = console.visible_modules();
    let sort = console.view().sort();
    println!();
    println!("已安装模块 ({} / {})  排序: {} {}", modules.len(), console.view().modules().len(), sort.field, sort.direction);
    println!("────────────────────────────────────────────────────────");
    println!("  {:<40} {:<16} {}", "名称", "版本", "状态");
    for module in &modules {
        println!("  {:<40} {:<16} {}", module.name, module.version, module.state);
    }
    println!("────────────────────────────────────────────────────────");
}

fn print_updates(console: &BundleConsole) {
    let updates = console.available_updates();
    println!();
    println!("可用更新 ({})", updates.len());
    println!("────────────────────────────────────────────────────────");
    for update in updates {
        println!(
            "  {:<40} {:<16} -> {}",
            update.name, update.current_version, update.available_version
        );
    }
    println!("────────────────────────────────────────────────────────");
    if let Some(time) = console.view().last_update_time() {
        println!("  最近检查: {}", format_update_time(time));
    }
    println!(
        "  全部更新: {}",
        if console.update_all_available() { "可用" } else { "不可用" }
    );
}

fn print_detail(detail: &BundleDetail) {
    let operations: Vec<_> = detail
        .state
        .offered_operations()
        .iter()
        .map(BundleOperation::as_str)
        .collect();

    println!();
    println!("{}", detail.display_label());
    println!("═══════════════════════════════════════");
    println!("  版本:     {}", detail.version);
    println!("  状态:     {}", detail.state);
    println!("  可用操作: {}", if operations.is_empty() { "无".to_string() } else { operations.join(", ") });
    if !detail.license.is_empty() {
        println!("  许可证:   {}", detail.license);
    }
    if detail.has_site_deployments() {
        println!("  部署站点: {}", detail.sites_deployment.join(", "));
    }
    if detail.has_module_dependencies() {
        println!("  模块依赖: {}", detail.module_dependencies.join(", "));
    }
    if !detail.dependencies.is_empty() {
        println!("  依赖:     {}", detail.dependencies.join(", "));
    }
    if !detail.services.is_empty() {
        println!("  提供服务: {}", detail.services.join(", "));
    }
    if !detail.services_in_use.is_empty() {
        println!("  使用服务: {}", detail.services_in_use.join(", "));
    }
    if !detail.manifest.is_empty() {
        println!();
        println!("  [清单]");
        for entry in &detail.manifest {
            println!("    {}: {}", entry.key, entry.value);
        }
    }
    println!("═══════════════════════════════════════");
}

fn print_notifications(notifier: &CollectingNotifier) {
    for notification in notifier.drain() {
        println!("[通知] {}", notification.message);
    }
}

/// 检查配置文件
async fn check_config(path: &Path) -> anyhow::Result<()> {
    println!("检查配置文件: {}", path.display());
    println!();

    let config = if path.exists() {
        let config = ConsoleConfig::from_file(path)
            .await
            .with_context(|| format!("配置文件无效: {}", path.display()))?;
        println!("✅ 配置文件有效！");
        config
    } else {
        println!("⚠️  警告: 配置文件不存在，将使用默认配置");
        ConsoleConfig::default()
    };

    println!();
    println!("配置内容:");
    println!("────────────────────────────────────────");
    println!("  [日志配置]");
    println!("    日志级别:       {}", config.logging.level);
    println!("    文件输出:       {}", if config.logging.file_output { "是" } else { "否" });
    println!("    JSON 格式:      {}", if config.logging.json_format { "是" } else { "否" });
    println!();
    println!("  [视图配置]");
    println!("    排序字段:       {}", config.view.sort_field);
    println!("    排序方向:       {}", config.view.sort_direction);
    println!("    过滤:           {:?}", config.view.filter);
    println!();
    println!("  [注册中心]");
    match &config.registry.snapshot {
        Some(path) => println!("    快照文件:       {}", path.display()),
        None => println!("    快照文件:       (未设置)"),
    }
    println!();
    println!("  [通知]");
    let flags: Vec<_> = config.notifications.flags().iter().map(|f| f.as_str()).collect();
    println!("    标志:           {:?}", flags);
    println!("────────────────────────────────────────");
    Ok(())
}

/// 打印版本信息
fn print_version() {
    println!();
    println!("Bundle Console");
    println!("═══════════════════════════════════════");
    println!("  版本:             {}", bundle_console::VERSION);
    println!();
    println!("构建信息:");
    println!("  目标平台:         {}", std::env::consts::ARCH);
    println!("  操作系统:         {}", std::env::consts::OS);
    println!("═══════════════════════════════════════");
    println!();
}
