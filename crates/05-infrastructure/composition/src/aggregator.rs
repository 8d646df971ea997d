//! 模块汇总
//!
//! 启动时收集默认贡献与所有模块的贡献，按模块过滤条件筛选后注册到容器。

use crate::discovery::discover_modules;
use di_abstractions::{
    container_capability, BeanDefinition, DiContainer, Emitter, ListenerDefinition, Module, Scope,
    Start,
};
use di_impl::{IocContainer, PerLookupScope, SingletonScope};
use infrastructure_common::{
    Capability, ConfigSource, InfrastructureResult, LifecycleState, ScopeMarker,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 模块汇总器
pub struct ModuleAggregator {
    modules: Vec<Box<dyn Module>>,
    auto_discovery: bool,
    config: ConfigSource,
}

impl ModuleAggregator {
    /// 创建汇总器，默认启用模块发现
    pub fn new(config: ConfigSource) -> Self {
        Self {
            modules: Vec::new(),
            auto_discovery: true,
            config,
        }
    }

    /// 设置是否启用模块发现
    pub fn with_auto_discovery(mut self, enabled: bool) -> Self {
        self.auto_discovery = enabled;
        self
    }

    /// 预先注册模块
    pub fn add_module(mut self, module: Box<dyn Module>) -> Self {
        self.modules.push(module);
        self
    }

    /// 汇总所有贡献并启动容器
    ///
    /// 存在直接注册在启动事件上的监听器时才分发启动事件。
    pub fn aggregate(self) -> InfrastructureResult<IocContainer> {
        let container = IocContainer::new();
        container.set_state(LifecycleState::Initializing);

        let beans = default_beans(&self.config);
        let scopes = default_scopes();

        if !self.auto_discovery && self.modules.is_empty() {
            info!("模块发现已禁用且没有预注册模块，仅注册默认组件");
            container.register_scopes(scopes);
            container.register_beans(beans);
        } else {
            let mut modules = self.modules;
            if self.auto_discovery {
                modules.extend(discover_modules());
            }
            modules.sort_by_key(|module| module.priority());
            info!("汇总 {} 个模块", modules.len());
            for module in &modules {
                debug!("模块: {} (优先级 {})", module.name(), module.priority());
            }

            Self::register_filtered(&container, &modules, beans, scopes);
        }

        container.clear_caches();
        container.set_state(LifecycleState::Running);
        info!("容器启动完成: {:?}", container.stats());

        if container.has_direct_listener(&Start::descriptor()) {
            if let Err(e) = container.fire(&Start::new()) {
                warn!("启动事件处理失败: {}", e);
                if let Err(close_error) = container.close() {
                    warn!("启动失败后关闭容器失败: {}", close_error);
                }
                return Err(e.into());
            }
        }

        Ok(container)
    }

    fn register_filtered(
        container: &IocContainer,
        modules: &[Box<dyn Module>],
        default_beans: Vec<BeanDefinition>,
        default_scopes: Vec<Arc<dyn Scope>>,
    ) {
        let view: &dyn DiContainer = container;

        let scope_filters: Vec<_> = modules.iter().filter_map(|m| m.scope_filter()).collect();
        let scopes: Vec<Arc<dyn Scope>> = default_scopes
            .into_iter()
            .chain(modules.iter().flat_map(|m| m.scopes()))
            .filter(|scope| scope_filters.iter().all(|filter| filter(view, scope.as_ref())))
            .collect();
        debug!("注册 {} 个作用域", scopes.len());
        container.register_scopes(scopes);

        let bean_filters: Vec<_> = modules.iter().filter_map(|m| m.bean_filter()).collect();
        let beans: Vec<BeanDefinition> = default_beans
            .into_iter()
            .chain(modules.iter().flat_map(|m| m.beans()))
            .filter(|bean| {
                let keep = bean_filters.iter().all(|filter| filter(view, bean));
                if !keep {
                    debug!("组件被过滤: {}", bean.describe());
                }
                keep
            })
            .collect();
        debug!("注册 {} 个组件", beans.len());
        container.register_beans(beans);

        let listener_filters: Vec<_> = modules.iter().filter_map(|m| m.listener_filter()).collect();
        let listeners: Vec<ListenerDefinition> = modules
            .iter()
            .flat_map(|m| m.listeners())
            .filter(|listener| listener_filters.iter().all(|filter| filter(view, listener)))
            .collect();
        debug!("注册 {} 个监听器", listeners.len());
        container.register_listeners(listeners);
    }
}

impl std::fmt::Debug for ModuleAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.modules.iter().map(|m| m.name()).collect();
        f.debug_struct("ModuleAggregator")
            .field("modules", &names)
            .field("auto_discovery", &self.auto_discovery)
            .finish()
    }
}

/// 默认组件：事件发送器、容器自身、配置源
fn default_beans(config: &ConfigSource) -> Vec<BeanDefinition> {
    let config = config.clone();
    vec![
        BeanDefinition::typed("emitter", Capability::of::<Emitter>(), |container, _| {
            Ok(Emitter::new(container.shared()))
        })
        .with_scope(ScopeMarker::APPLICATION),
        BeanDefinition::typed("container", container_capability(), |container, _| {
            Ok(container.shared())
        }),
        BeanDefinition::typed("config-source", Capability::of::<ConfigSource>(), move |_, _| {
            Ok(config.clone())
        })
        .with_scope(ScopeMarker::APPLICATION),
    ]
}

/// 默认作用域：单例与每次查找
fn default_scopes() -> Vec<Arc<dyn Scope>> {
    vec![
        Arc::new(SingletonScope::new()) as Arc<dyn Scope>,
        Arc::new(PerLookupScope::new()) as Arc<dyn Scope>,
    ]
}
