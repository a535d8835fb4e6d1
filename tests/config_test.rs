//! 配置加载集成测试
//!
//! 测试配置文件到控制台的完整流程

use std::sync::Arc;

use bundle_console::{
    BundleConsole, CollectingNotifier, ConsoleConfig, ConsoleError, InMemoryRegistry,
    LoggerConfig, NotifyFlag, RegistrySnapshot, RotationStrategy, SortDirection, SortField,
    SortSpec,
};
use tempfile::TempDir;

/// YAML 配置文件完整加载
#[tokio::test]
async fn test_load_yaml_config() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.yaml");
    tokio::fs::write(
        &path,
        r#"
logging:
  level: debug
  json_format: true
  rotation: hourly
view:
  sort_field: version
  sort_direction: desc
  filter: core
registry:
  snapshot: /var/lib/bundle-console/registry.yaml
notifications:
  no_automatic_close: false
"#,
    )
    .await
    .unwrap();

    let config = ConsoleConfig::from_file(&path).await.unwrap();
    assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.json_format);
    assert_eq!(
        config.view.sort_spec().unwrap(),
        SortSpec::new(SortField::Version, SortDirection::Desc)
    );
    assert_eq!(config.view.filter, "core");
    assert!(config.registry.snapshot.is_some());
    assert_eq!(config.notifications.flags(), vec![NotifyFlag::CloseButton]);

    let logger_config = LoggerConfig::from_log_config(&config.logging);
    assert_eq!(logger_config.level, "debug");
    assert_eq!(logger_config.rotation, RotationStrategy::Hourly);
    assert!(logger_config.file_output.is_none());
}

/// JSON 配置文件按扩展名解析，缺失字段取默认值
#[tokio::test]
async fn test_load_json_config_with_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    tokio::fs::write(&path, r#"{ "view": { "filter": "forms" } }"#)
        .await
        .unwrap();

    let config = ConsoleConfig::from_file(&path).await.unwrap();
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.view.sort_spec().unwrap(), SortSpec::default());
    assert_eq!(config.view.filter, "forms");
    assert_eq!(config.notifications.flags().len(), 2);
}

/// 无效排序方向被拒绝
#[tokio::test]
async fn test_invalid_sort_direction_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.yaml");
    tokio::fs::write(&path, "view:\n  sort_direction: sideways\n")
        .await
        .unwrap();

    let err = ConsoleConfig::from_file(&path).await.unwrap_err();
    assert!(matches!(
        err,
        ConsoleError::InvalidConfigValue { ref key, .. } if key == "view.sort_direction"
    ));
    assert_eq!(err.error_code(), bundle_console::error_code::CONFIG_INVALID_VALUE);
}

/// 已安装模块视图不能按可用版本排序
#[tokio::test]
async fn test_available_sort_field_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.yaml");
    tokio::fs::write(&path, "view:\n  sort_field: available\n")
        .await
        .unwrap();

    let err = ConsoleConfig::from_file(&path).await.unwrap_err();
    assert!(matches!(
        err,
        ConsoleError::InvalidConfigValue { ref key, .. } if key == "view.sort_field"
    ));
}

/// 文件不存在
#[tokio::test]
async fn test_missing_config_file() {
    let err = ConsoleConfig::from_file("/nonexistent/bundle-console.yaml")
        .await
        .unwrap_err();
    assert!(matches!(err, ConsoleError::ConfigLoadFailed(_)));
}

/// 语法错误的 YAML
#[tokio::test]
async fn test_malformed_yaml() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.yaml");
    tokio::fs::write(&path, "view: [unclosed").await.unwrap();

    let err = ConsoleConfig::from_file(&path).await.unwrap_err();
    assert!(matches!(err, ConsoleError::Yaml(_)));
}

/// 配置中的初始排序和过滤作用于控制台视图
#[tokio::test]
async fn test_config_drives_initial_view() {
    let config = ConsoleConfig::builder()
        .sort(SortField::Name, SortDirection::Desc)
        .filter("MOD")
        .build();
    let registry = Arc::new(InMemoryRegistry::new(RegistrySnapshot::default()));
    let console = BundleConsole::new(config, registry, Arc::new(CollectingNotifier::new())).unwrap();

    assert_eq!(
        console.view().sort(),
        SortSpec::new(SortField::Name, SortDirection::Desc)
    );
    assert_eq!(console.view().filter(), "MOD");
}
