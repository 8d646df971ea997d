//! # Infrastructure Common
//!
//! Lorn IoC 运行时的公共类型：能力描述、能力匹配、作用域标记、错误类型与配置源。
//!
//! ## 核心类型
//!
//! - [`TypeDescriptor`] / [`Capability`] - 显式声明层次关系的类型描述
//! - [`TypeMatcher`] - 候选能力与请求能力的兼容性判断
//! - [`ScopeMarker`] - 作用域标记
//! - [`DependencyError`] / [`TeardownError`] - 解析与清理错误
//! - [`ConfigSource`] - 默认注册的配置组件

pub mod configuration;
pub mod errors;
pub mod lifecycle;
pub mod matcher;
pub mod metadata;

pub use configuration::*;
pub use errors::*;
pub use lifecycle::*;
pub use matcher::*;
pub use metadata::*;
