//! # 基础设施组合层
//!
//! 负责把默认组件与各模块的贡献汇总到 IoC 容器中，并完成启动。
//!
//! ## 主要功能
//!
//! - **容器构建器**: 使用构建者模式配置模块、属性与日志
//! - **模块发现**: 进程级的模块提供者注册表
//! - **模块汇总**: 按模块优先级合并贡献，应用过滤条件后注册
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use di_abstractions::{BeanDefinition, DiContainerExt, ModuleContribution};
//! use infrastructure_common::{Capability, ScopeMarker};
//! use infrastructure_composition::ContainerBuilder;
//!
//! struct Greeter;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let module = ModuleContribution::new("greeting").with_bean(
//!         BeanDefinition::typed("greeter", Capability::of::<Greeter>(), |_, _| Ok(Greeter))
//!             .with_scope(ScopeMarker::APPLICATION),
//!     );
//!
//!     let container = ContainerBuilder::new()
//!         .disable_auto_discovery()
//!         .register_module(module)
//!         .build()?;
//!
//!     let _greeter = container.lookup_type::<Greeter>()?;
//!
//!     container.close()?;
//!     Ok(())
//! }
//! ```

pub mod aggregator;
pub mod builder;
pub mod config;
pub mod discovery;

// 重新导出主要类型
pub use aggregator::ModuleAggregator;
pub use builder::{ContainerBuilder, LoggingConfig};
pub use config::ContainerConfig;
pub use discovery::{discover_modules, register_module_provider, ModuleProvider};
