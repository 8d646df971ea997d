//! IoC 容器实现

use crate::bean_registry::BeanRegistry;
use crate::listener_registry::ListenerRegistry;
use crate::resolver::Resolver;
use crate::scope_registry::ScopeRegistry;
use di_abstractions::{
    BeanDefinition, ContainerStats, DiContainer, Event, Instance, InstanceHandle, ListenerDefinition,
    Scope, Stop,
};
use infrastructure_common::{
    Capability, DependencyResult, FailureCollector, LifecycleState, ListenerError, TeardownResult,
    TypeDescriptor,
};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

struct ContainerInner {
    beans: Arc<RwLock<BeanRegistry>>,
    scopes: Arc<RwLock<ScopeRegistry>>,
    listeners: RwLock<ListenerRegistry>,
    resolver: Resolver,
    state: RwLock<LifecycleState>,
}

/// IoC 容器
///
/// 克隆共享同一个容器。注册方法只应在启动阶段调用，
/// 启动完成后容器只读，可以在多个线程上并发查找。
#[derive(Clone)]
pub struct IocContainer {
    inner: Arc<ContainerInner>,
}

impl IocContainer {
    /// 创建空容器
    pub fn new() -> Self {
        let beans = Arc::new(RwLock::new(BeanRegistry::new()));
        let scopes = Arc::new(RwLock::new(ScopeRegistry::new()));
        let resolver = Resolver::new(Arc::clone(&beans), Arc::clone(&scopes));

        Self {
            inner: Arc::new(ContainerInner {
                beans,
                scopes,
                listeners: RwLock::new(ListenerRegistry::new()),
                resolver,
                state: RwLock::new(LifecycleState::Uninitialized),
            }),
        }
    }

    /// 注册组件定义，同能力的已有分组被替换
    pub fn register_beans(&self, beans: impl IntoIterator<Item = BeanDefinition>) {
        self.inner.beans.write().register(beans);
        self.inner.resolver.clear_caches();
    }

    /// 注册作用域
    pub fn register_scopes(&self, scopes: impl IntoIterator<Item = Arc<dyn Scope>>) {
        self.inner.scopes.write().register(scopes);
    }

    /// 注册监听器，追加到已有监听器之后
    pub fn register_listeners(&self, listeners: impl IntoIterator<Item = ListenerDefinition>) {
        self.inner.listeners.write().register(listeners);
    }

    /// 清空所有解析缓存
    pub fn clear_caches(&self) {
        self.inner.resolver.clear_caches();
        self.inner.listeners.read().clear_cache();
        debug!("已清空解析缓存");
    }

    /// 是否有直接注册在该事件类型上的监听器
    pub fn has_direct_listener(&self, event_type: &TypeDescriptor) -> bool {
        self.inner.listeners.read().has_direct_listener(event_type)
    }

    /// 设置生命周期状态
    pub fn set_state(&self, state: LifecycleState) {
        *self.inner.state.write() = state;
    }

    /// 关闭容器
    ///
    /// 先分发停止事件（所有监听器都会执行），再按名称顺序关闭作用域。
    /// 所有失败汇总为一个错误。重复关闭不做任何事。
    pub fn close(&self) -> TeardownResult<()> {
        {
            let mut state = self.inner.state.write();
            if matches!(*state, LifecycleState::Stopping | LifecycleState::Stopped) {
                debug!("容器已关闭，忽略重复关闭");
                return Ok(());
            }
            *state = LifecycleState::Stopping;
        }
        info!("开始关闭容器");

        let mut failures = FailureCollector::new();

        let stop = Stop::new();
        let listeners = self.inner.listeners.read().listeners_for(&stop.event_type());
        for listener in listeners.iter() {
            if let Err(e) = listener.on_event(self, &stop) {
                warn!("停止事件处理失败: {}", e);
                failures.push(e);
            }
        }

        let scopes = self.inner.scopes.read();
        failures.record(scopes.close(self));
        drop(scopes);

        self.set_state(LifecycleState::Stopped);
        let result = failures.finish("关闭容器失败");
        match &result {
            Ok(()) => info!("容器已关闭"),
            Err(e) => warn!("容器关闭完成，但存在失败: {}", e),
        }
        result
    }
}

impl Default for IocContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl DiContainer for IocContainer {
    fn lookup(&self, capability: &Capability) -> DependencyResult<InstanceHandle> {
        self.inner.resolver.resolve(self, capability)
    }

    fn lookups(
        &self,
        element: &Capability,
        combine: &dyn Fn(Vec<Instance>) -> Instance,
    ) -> DependencyResult<InstanceHandle> {
        self.inner.resolver.resolve_all(self, element, combine)
    }

    fn fire(&self, event: &dyn Event) -> Result<(), ListenerError> {
        let event_type = event.event_type();
        let listeners = self.inner.listeners.read().listeners_for(&event_type);
        debug!("分发事件 {} 到 {} 个监听器", event_type, listeners.len());

        for listener in listeners.iter() {
            listener.on_event(self, event)?;
        }
        Ok(())
    }

    fn shared(&self) -> Arc<dyn DiContainer> {
        Arc::new(self.clone())
    }

    fn state(&self) -> LifecycleState {
        *self.inner.state.read()
    }

    fn stats(&self) -> ContainerStats {
        let beans = self.inner.beans.read();
        let listeners = self.inner.listeners.read();
        ContainerStats {
            bean_capabilities: beans.capability_count(),
            bean_definitions: beans.len(),
            scopes: self.inner.scopes.read().len(),
            listener_event_types: listeners.event_type_count(),
            resolution_cache_entries: self.inner.resolver.resolution_cache_entries(),
            list_cache_entries: self.inner.resolver.list_cache_entries(),
            listener_cache_entries: listeners.cached_entries(),
        }
    }
}

impl std::fmt::Debug for IocContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IocContainer")
            .field("state", &self.state())
            .field("stats", &self.stats())
            .finish()
    }
}
