//! 监听器注册表

use dashmap::DashMap;
use di_abstractions::{ListenerDefinition, START_EVENT, STOP_EVENT};
use infrastructure_common::TypeDescriptor;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// 解析后的监听器列表
pub type ResolvedListeners = Arc<[Arc<ListenerDefinition>]>;

/// 监听器注册表
///
/// 按事件类型分组，重复注册追加而不替换。事件分发时沿事件类型的父类型链
/// 收集每一层自身及其直接实现能力上的监听器。
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    listeners: HashMap<TypeDescriptor, Vec<Arc<ListenerDefinition>>>,
    resolved: DashMap<TypeDescriptor, ResolvedListeners>,
}

impl ListenerRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册监听器
    pub fn register(&mut self, listeners: impl IntoIterator<Item = ListenerDefinition>) {
        for listener in listeners {
            debug!("注册监听器 {} -> {}", listener.name(), listener.event_type());
            self.listeners
                .entry(listener.event_type().clone())
                .or_default()
                .push(Arc::new(listener));
        }
        self.resolved.clear();
    }

    /// 是否有直接注册在该类型上的监听器
    pub fn has_direct_listener(&self, event_type: &TypeDescriptor) -> bool {
        self.listeners
            .get(event_type)
            .is_some_and(|listeners| !listeners.is_empty())
    }

    /// 事件类型对应的监听器，按优先级升序
    ///
    /// 启动与停止事件每次重新计算，其他事件类型的结果被缓存。
    pub fn listeners_for(&self, event_type: &TypeDescriptor) -> ResolvedListeners {
        let cacheable = !matches!(event_type.name(), START_EVENT | STOP_EVENT);
        if cacheable {
            if let Some(resolved) = self.resolved.get(event_type) {
                return Arc::clone(resolved.value());
            }
        }

        let resolved: ResolvedListeners = self.collect(event_type).into();
        if cacheable {
            self.resolved.insert(event_type.clone(), Arc::clone(&resolved));
        }
        resolved
    }

    fn collect(&self, event_type: &TypeDescriptor) -> Vec<Arc<ListenerDefinition>> {
        let mut seen: HashSet<*const ListenerDefinition> = HashSet::new();
        let mut collected = Vec::new();
        let mut visited_levels: HashSet<&str> = HashSet::new();
        let mut level = Some(event_type);

        while let Some(current) = level {
            if !visited_levels.insert(current.name()) {
                break;
            }
            let keys = std::iter::once(current).chain(current.interfaces().iter());
            for key in keys {
                for listener in self.listeners.get(key).into_iter().flatten() {
                    if seen.insert(Arc::as_ptr(listener)) {
                        collected.push(Arc::clone(listener));
                    }
                }
            }
            level = current.parent();
        }

        collected.sort_by_key(|listener| listener.priority());
        collected
    }

    /// 有监听器的事件类型数量
    pub fn event_type_count(&self) -> usize {
        self.listeners.len()
    }

    /// 解析缓存条目数
    pub fn cached_entries(&self) -> usize {
        self.resolved.len()
    }

    /// 清空解析缓存
    pub fn clear_cache(&self) {
        self.resolved.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listener(name: &'static str, event_type: TypeDescriptor, priority: i32) -> ListenerDefinition {
        ListenerDefinition::new(name, event_type, |_, _| Ok(())).with_priority(priority)
    }

    fn names(resolved: &ResolvedListeners) -> Vec<&str> {
        resolved.iter().map(|listener| listener.name()).collect()
    }

    #[test]
    fn test_supertype_and_interface_listeners_are_collected() {
        let base = TypeDescriptor::named("BaseEvent");
        let audited = TypeDescriptor::named("Audited");
        let concrete = TypeDescriptor::named("OrderPlaced")
            .extends(base.clone())
            .implements(audited.clone());

        let mut registry = ListenerRegistry::new();
        registry.register(vec![
            listener("on-base", base, 3),
            listener("on-audited", audited, 2),
            listener("on-concrete", concrete.clone(), 1),
        ]);

        let resolved = registry.listeners_for(&concrete);
        assert_eq!(names(&resolved), vec!["on-concrete", "on-audited", "on-base"]);
    }

    #[test]
    fn test_listener_reachable_twice_fires_once() {
        let base = TypeDescriptor::named("BaseEvent");
        let middle = TypeDescriptor::named("MiddleEvent")
            .extends(base.clone())
            .implements(base.clone());
        let concrete = TypeDescriptor::named("LeafEvent").extends(middle);

        let mut registry = ListenerRegistry::new();
        registry.register(vec![listener("on-base", base, 1)]);

        assert_eq!(registry.listeners_for(&concrete).len(), 1);
    }

    #[test]
    fn test_register_appends_and_invalidates_cache() {
        let event = TypeDescriptor::named("Tick");
        let mut registry = ListenerRegistry::new();
        registry.register(vec![listener("second", event.clone(), 2)]);

        assert_eq!(registry.listeners_for(&event).len(), 1);
        assert_eq!(registry.cached_entries(), 1);

        registry.register(vec![listener("first", event.clone(), 1)]);

        assert_eq!(registry.cached_entries(), 0);
        assert_eq!(names(&registry.listeners_for(&event)), vec!["first", "second"]);
        assert!(registry.has_direct_listener(&event));
        assert!(!registry.has_direct_listener(&TypeDescriptor::named("Other")));
    }

    #[test]
    fn test_lifecycle_events_are_not_cached() {
        let mut registry = ListenerRegistry::new();
        registry.register(vec![listener("on-start", TypeDescriptor::named(START_EVENT), 1)]);

        assert_eq!(registry.listeners_for(&TypeDescriptor::named(START_EVENT)).len(), 1);
        assert_eq!(registry.cached_entries(), 0);
    }
}
