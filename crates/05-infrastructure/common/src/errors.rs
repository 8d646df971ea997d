//! 错误类型定义

use thiserror::Error;

/// 装箱的错误源
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置键不存在: {key}")]
    KeyNotFound { key: String },

    #[error("配置类型转换失败: {key}, 原因: {source}")]
    TypeConversionError {
        key: String,
        source: serde_json::Error,
    },
}

/// 依赖注入错误类型
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("未找到匹配的组件: {capability}")]
    NotFound { capability: String },

    #[error("组件解析存在歧义: {capability}, 候选组件: [{}]", .candidates.join(", "))]
    Ambiguous {
        capability: String,
        candidates: Vec<String>,
    },

    #[error("作用域未绑定: {scope}, 组件: {bean}")]
    MissingScope { scope: String, bean: String },

    #[error("组件创建失败: {bean}, 原因: {source}")]
    CreationFailed { bean: String, source: BoxError },

    #[error("组件类型不匹配: {bean}, 期望类型: {expected}")]
    TypeMismatch { bean: String, expected: String },
}

impl DependencyError {
    /// 创建组件创建失败错误
    pub fn creation_failed(bean: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::CreationFailed {
            bean: bean.into(),
            source: source.into(),
        }
    }
}

/// 事件监听器错误
#[derive(Error, Debug)]
#[error("事件监听器执行失败: {listener}, 事件: {event}, 原因: {source}")]
pub struct ListenerError {
    /// 监听器名称
    pub listener: String,
    /// 事件类型名称
    pub event: String,
    /// 失败原因
    pub source: BoxError,
}

/// 清理失败的聚合错误
///
/// 每一个清理步骤的失败都作为原因附加在同一个错误上。
#[derive(Error, Debug)]
#[error("{message}: {} 个清理步骤失败", .causes.len())]
pub struct TeardownError {
    /// 错误描述
    pub message: String,
    /// 各清理步骤的失败原因
    pub causes: Vec<anyhow::Error>,
}

impl TeardownError {
    /// 失败原因列表
    pub fn causes(&self) -> &[anyhow::Error] {
        &self.causes
    }
}

/// 清理失败收集器
///
/// 清理过程中不中断，收集全部失败后一次性转换为 [`TeardownError`]。
#[derive(Debug, Default)]
pub struct FailureCollector {
    causes: Vec<anyhow::Error>,
}

impl FailureCollector {
    /// 创建新的收集器
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一个失败
    pub fn push(&mut self, error: impl Into<anyhow::Error>) {
        self.causes.push(error.into());
    }

    /// 记录结果中的失败
    pub fn record<E: Into<anyhow::Error>>(&mut self, result: Result<(), E>) {
        if let Err(e) = result {
            self.push(e);
        }
    }

    /// 是否没有任何失败
    pub fn is_empty(&self) -> bool {
        self.causes.is_empty()
    }

    /// 至少有一个失败时返回聚合错误
    pub fn finish(self, message: impl Into<String>) -> Result<(), TeardownError> {
        if self.causes.is_empty() {
            Ok(())
        } else {
            Err(TeardownError {
                message: message.into(),
                causes: self.causes,
            })
        }
    }
}

/// 基础设施错误类型
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("配置错误: {source}")]
    ConfigError {
        #[from]
        source: ConfigError,
    },

    #[error("依赖注入错误: {source}")]
    DependencyError {
        #[from]
        source: DependencyError,
    },

    #[error("事件分发错误: {source}")]
    ListenerError {
        #[from]
        source: ListenerError,
    },

    #[error("清理错误: {source}")]
    TeardownError {
        #[from]
        source: TeardownError,
    },

    #[error("基础设施启动失败: {message}")]
    BootstrapFailed { message: String },
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type TeardownResult<T> = Result<T, TeardownError>;
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;
