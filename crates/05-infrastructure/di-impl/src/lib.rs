//! # 依赖注入具体实现
//!
//! 提供组件、作用域、监听器注册表，依赖解析器，内置作用域以及 IoC 容器实现

pub mod bean_registry;
pub mod container;
pub mod listener_registry;
pub mod resolver;
pub mod scope_registry;
pub mod scopes;

pub use bean_registry::BeanRegistry;
pub use container::IocContainer;
pub use listener_registry::{ListenerRegistry, ResolvedListeners};
pub use resolver::Resolver;
pub use scope_registry::ScopeRegistry;
pub use scopes::{PerLookupScope, SingletonScope};
