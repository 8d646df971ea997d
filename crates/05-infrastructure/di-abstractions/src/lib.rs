//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义组件、作用域、实例句柄、事件与模块的核心契约。
//!
//! ## 核心接口
//!
//! - [`BeanDefinition`] - 组件定义（创建 / 注入 / 销毁）
//! - [`Scope`] - 作用域，决定实例的创建与缓存策略
//! - [`InstanceHandle`] - 实例句柄，关闭时级联释放依赖
//! - [`ListenerDefinition`] / [`Event`] - 同步事件分发
//! - [`DiContainer`] - 容器查找接口
//! - [`Module`] - 启动时汇总的模块贡献

pub mod bean;
pub mod container;
pub mod event;
pub mod instance;
pub mod module;
pub mod scope;

pub use bean::*;
pub use container::*;
pub use event::*;
pub use instance::*;
pub use module::*;
pub use scope::*;
