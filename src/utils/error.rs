//! 模块管理控制台错误类型定义
//!
//! 本模块定义了控制台中使用的所有错误类型。

use thiserror::Error;

/// 控制台核心错误类型
#[derive(Error, Debug)]
pub enum ConsoleError {
    // ==================== 注册中心查询错误 ====================

    /// 查询失败（传输失败或响应格式错误）
    #[error("查询失败: '{query}' - {reason}")]
    FetchFailed {
        query: String,
        reason: String,
    },

    /// Bundle 未找到
    #[error("Bundle 未找到: '{0}'")]
    BundleNotFound(String),

    // ==================== 生命周期操作错误 ====================

    /// 变更操作失败
    #[error("操作失败: {operation} (bundle_id: {bundle_id:?}) - {reason}")]
    MutationFailed {
        operation: String,
        bundle_id: Option<i64>,
        reason: String,
    },

    /// 当前状态不提供该操作
    #[error("状态 '{state}' 不允许操作 {operation}")]
    OperationNotOffered {
        operation: String,
        state: String,
    },

    /// 同一 Bundle 的操作仍在进行中
    #[error("Bundle {bundle_id} 的操作 {operation} 仍在进行中")]
    OperationInFlight {
        operation: String,
        bundle_id: i64,
    },

    /// 尚未成功加载 Bundle 详情
    #[error("Bundle 详情尚未加载: '{0}'")]
    DetailNotLoaded(String),

    // ==================== 配置错误 ====================

    /// 配置加载失败
    #[error("配置加载失败: {0}")]
    ConfigLoadFailed(String),

    /// 配置值无效
    #[error("配置值无效: '{key}' - {reason}")]
    InvalidConfigValue {
        key: String,
        reason: String,
    },

    // ==================== IO 和序列化错误 ====================

    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 序列化/反序列化错误
    #[error("JSON 错误: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML 序列化/反序列化错误
    #[error("YAML 错误: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // ==================== 通用错误 ====================

    /// 初始化失败
    #[error("初始化失败: {0}")]
    InitFailed(String),

    /// 其他错误
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// 控制台操作结果类型别名
pub type Result<T> = std::result::Result<T, ConsoleError>;

/// 状态码常量
pub mod status_code {
    /// 成功
    pub const OK: u16 = 200;

    /// 请求格式错误
    pub const BAD_REQUEST: u16 = 400;

    /// 未找到
    pub const NOT_FOUND: u16 = 404;

    /// 冲突
    pub const CONFLICT: u16 = 409;

    /// 内部错误
    pub const INTERNAL_ERROR: u16 = 500;

    /// 上游注册中心错误
    pub const BAD_GATEWAY: u16 = 502;
}

/// 错误码常量
pub mod error_code {
    // 注册中心错误 (REGISTRY-xxx)
    pub const REGISTRY_FETCH_FAILED: &str = "REGISTRY-001";
    pub const REGISTRY_BUNDLE_NOT_FOUND: &str = "REGISTRY-002";

    // 生命周期错误 (LIFECYCLE-xxx)
    pub const LIFECYCLE_MUTATION_FAILED: &str = "LIFECYCLE-001";
    pub const LIFECYCLE_NOT_OFFERED: &str = "LIFECYCLE-002";
    pub const LIFECYCLE_IN_FLIGHT: &str = "LIFECYCLE-003";
    pub const LIFECYCLE_DETAIL_NOT_LOADED: &str = "LIFECYCLE-004";

    // 配置错误 (CONFIG-xxx)
    pub const CONFIG_LOAD_FAILED: &str = "CONFIG-001";
    pub const CONFIG_INVALID_VALUE: &str = "CONFIG-002";
}

impl ConsoleError {
    /// 获取错误码
    pub fn error_code(&self) -> &'static str {
        match self {
            ConsoleError::FetchFailed { .. } => error_code::REGISTRY_FETCH_FAILED,
            ConsoleError::BundleNotFound(_) => error_code::REGISTRY_BUNDLE_NOT_FOUND,
            ConsoleError::MutationFailed { .. } => error_code::LIFECYCLE_MUTATION_FAILED,
            ConsoleError::OperationNotOffered { .. } => error_code::LIFECYCLE_NOT_OFFERED,
            ConsoleError::OperationInFlight { .. } => error_code::LIFECYCLE_IN_FLIGHT,
            ConsoleError::DetailNotLoaded(_) => error_code::LIFECYCLE_DETAIL_NOT_LOADED,
            ConsoleError::ConfigLoadFailed(_) => error_code::CONFIG_LOAD_FAILED,
            ConsoleError::InvalidConfigValue { .. } => error_code::CONFIG_INVALID_VALUE,
            _ => "UNKNOWN",
        }
    }

    /// 获取 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            ConsoleError::FetchFailed { .. } => status_code::BAD_GATEWAY,
            ConsoleError::MutationFailed { .. } => status_code::BAD_GATEWAY,
            ConsoleError::BundleNotFound(_) => status_code::NOT_FOUND,
            ConsoleError::OperationNotOffered { .. } => status_code::BAD_REQUEST,
            ConsoleError::DetailNotLoaded(_) => status_code::BAD_REQUEST,
            ConsoleError::InvalidConfigValue { .. } => status_code::BAD_REQUEST,
            ConsoleError::OperationInFlight { .. } => status_code::CONFLICT,
            _ => status_code::INTERNAL_ERROR,
        }
    }

    /// 构造查询失败错误
    pub fn fetch(query: impl Into<String>, reason: impl ToString) -> Self {
        ConsoleError::FetchFailed {
            query: query.into(),
            reason: reason.to_string(),
        }
    }

    /// 构造变更失败错误
    pub fn mutation(operation: impl Into<String>, bundle_id: Option<i64>, reason: impl ToString) -> Self {
        ConsoleError::MutationFailed {
            operation: operation.into(),
            bundle_id,
            reason: reason.to_string(),
        }
    }
}
