//! 依赖注入容器抽象接口
//!
//! 提供依赖注入容器的核心抽象

use crate::event::Event;
use crate::instance::{Bean, Instance, InstanceHandle};
use infrastructure_common::{
    Capability, DependencyError, DependencyResult, LifecycleState, ListenerError,
};
use std::any::Any;
use std::sync::Arc;
use tracing::warn;

/// 依赖注入容器 trait
///
/// 对象安全的查找与事件接口，组件的创建、注入、销毁函数都通过它访问容器。
/// 类型化的便捷方法见 [`DiContainerExt`]。
pub trait DiContainer: Send + Sync {
    /// 查找满足能力的组件实例
    ///
    /// 能力可以用 [`Capability::optional`] 包装，未命中时返回空句柄而不是错误。
    fn lookup(&self, capability: &Capability) -> DependencyResult<InstanceHandle>;

    /// 查找所有满足元素能力的组件，按优先级降序、名称升序实现后交给组合函数
    ///
    /// 返回的句柄不来自任何组件，关闭时关闭每一个元素。
    fn lookups(
        &self,
        element: &Capability,
        combine: &dyn Fn(Vec<Instance>) -> Instance,
    ) -> DependencyResult<InstanceHandle>;

    /// 同步分发事件，第一个失败的监听器会中止分发
    fn fire(&self, event: &dyn Event) -> Result<(), ListenerError>;

    /// 获取容器的共享引用
    fn shared(&self) -> Arc<dyn DiContainer>;

    /// 容器生命周期状态
    fn state(&self) -> LifecycleState;

    /// 容器统计信息
    fn stats(&self) -> ContainerStats;
}

/// 容器组件的能力
pub fn container_capability() -> Capability {
    Capability::of::<dyn DiContainer>()
}

/// 类型化查找扩展
pub trait DiContainerExt: DiContainer {
    /// 按能力查找并转换为具体类型
    fn lookup_as<T: Any + Send + Sync>(&self, capability: &Capability) -> DependencyResult<Bean<T>> {
        let handle = self.lookup(capability)?;
        if !handle.is_present() {
            return Err(DependencyError::NotFound {
                capability: capability.to_string(),
            });
        }
        typed_or_release(self, handle)
    }

    /// 按类型名称查找，能力为 `Capability::of::<T>()`
    fn lookup_type<T: Any + Send + Sync>(&self) -> DependencyResult<Bean<T>> {
        self.lookup_as::<T>(&Capability::of::<T>())
    }

    /// 可选查找，未命中时返回 `None`
    fn lookup_optional_as<T: Any + Send + Sync>(
        &self,
        capability: &Capability,
    ) -> DependencyResult<Option<Bean<T>>> {
        let (inner, _) = capability.unwrap_optional();
        let handle = self.lookup(&Capability::optional(inner.clone()))?;
        if handle.is_present() {
            typed_or_release(self, handle).map(Some)
        } else {
            Ok(None)
        }
    }

    /// 查找所有匹配元素，结果为按顺序排列的实例列表
    fn lookup_list(&self, element: &Capability) -> DependencyResult<Bean<Vec<Instance>>> {
        let handle = self.lookups(element, &|values| Arc::new(values) as Instance)?;
        typed_or_release(self, handle)
    }

    /// 查找所有匹配元素并逐一转换为具体类型
    fn lookup_list_as<T: Any + Send + Sync>(
        &self,
        element: &Capability,
    ) -> DependencyResult<(Vec<Arc<T>>, InstanceHandle)> {
        let (values, handle) = self.lookup_list(element)?.into_parts();
        let typed: Option<Vec<Arc<T>>> = values
            .iter()
            .map(|value| Arc::clone(value).downcast::<T>().ok())
            .collect();
        match typed {
            Some(typed) => Ok((typed, handle)),
            None => {
                release(self, &handle);
                Err(DependencyError::TypeMismatch {
                    bean: format!("List<{element}>"),
                    expected: std::any::type_name::<T>().to_string(),
                })
            }
        }
    }
}

impl<C: DiContainer + ?Sized> DiContainerExt for C {}

fn typed_or_release<C, T>(container: &C, handle: InstanceHandle) -> DependencyResult<Bean<T>>
where
    C: DiContainer + ?Sized,
    T: Any + Send + Sync,
{
    if handle.downcast::<T>().is_none() {
        release(container, &handle);
    }
    Bean::from_handle(handle)
}

fn release<C: DiContainer + ?Sized>(container: &C, handle: &InstanceHandle) {
    let shared = container.shared();
    if let Err(e) = handle.close(shared.as_ref()) {
        warn!("释放类型不匹配的实例失败: {}", e);
    }
}

/// 容器统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerStats {
    /// 已注册的能力数量
    pub bean_capabilities: usize,
    /// 已注册的组件定义数量
    pub bean_definitions: usize,
    /// 已绑定的作用域数量
    pub scopes: usize,
    /// 有监听器的事件类型数量
    pub listener_event_types: usize,
    /// 能力解析缓存条目数
    pub resolution_cache_entries: usize,
    /// 列表匹配缓存条目数
    pub list_cache_entries: usize,
    /// 监听器解析缓存条目数
    pub listener_cache_entries: usize,
}
