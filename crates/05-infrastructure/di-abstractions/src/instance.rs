//! 实例句柄
//!
//! 句柄持有实现后的组件实例以及创建过程中拉取的依赖句柄，关闭时级联释放。

use crate::bean::BeanDefinition;
use crate::container::DiContainer;
use infrastructure_common::{DependencyError, DependencyResult, FailureCollector, TeardownResult};
use parking_lot::Mutex;
use std::any::Any;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use tracing::{debug, warn};

/// 组件实例
pub type Instance = Arc<dyn Any + Send + Sync>;

/// 创建过程中收集的依赖句柄
pub type Dependents = Vec<InstanceHandle>;

/// 实例句柄
///
/// 句柄独占其依赖列表。关闭顺序：先调用来源组件的销毁函数，再按登记顺序关闭依赖。
/// 同一句柄的关闭互斥执行，但句柄本身不防止重复关闭，重复关闭会再次调用销毁函数。
pub struct InstanceHandle {
    bean: Option<Arc<BeanDefinition>>,
    value: Option<Instance>,
    dependents: Mutex<Dependents>,
}

impl InstanceHandle {
    /// 创建句柄
    pub fn new(bean: Option<Arc<BeanDefinition>>, value: Instance, dependents: Dependents) -> Self {
        Self {
            bean,
            value: Some(value),
            dependents: Mutex::new(dependents),
        }
    }

    /// 通过组件定义创建新实例
    ///
    /// 依次调用创建函数与注入函数；失败时释放已收集的依赖。
    /// 注入失败时已创建的实例先经销毁函数释放。
    /// 创建函数内部的解析错误原样返回，其他错误包装为创建失败。
    pub fn realize(bean: &Arc<BeanDefinition>, container: &dyn DiContainer) -> DependencyResult<Self> {
        let mut dependents = Dependents::new();
        let created = bean.run_create(container, &mut dependents).and_then(|value| {
            match bean.run_inject(container, &mut dependents, &value) {
                Ok(()) => Ok(value),
                Err(error) => {
                    if let Err(destroy_error) = bean.run_destroy(container, &value) {
                        warn!("注入失败后销毁组件 {} 失败: {}", bean.name(), destroy_error);
                    }
                    Err(error)
                }
            }
        });

        match created {
            Ok(value) => {
                debug!("创建组件实例: {}", bean.describe());
                Ok(Self::new(Some(Arc::clone(bean)), value, dependents))
            }
            Err(error) => {
                if let Err(close_error) = Self::composite_of(dependents).close(container) {
                    warn!("释放组件 {} 的依赖失败: {}", bean.name(), close_error);
                }
                Err(match error.downcast::<DependencyError>() {
                    Ok(resolution) => resolution,
                    Err(other) => DependencyError::creation_failed(bean.name(), other),
                })
            }
        }
    }

    /// 共享实例的非占有视图，关闭时不做任何事
    pub fn shared(value: Instance) -> Self {
        Self::new(None, value, Dependents::new())
    }

    /// 不来自组件的组合句柄，关闭时释放全部依赖
    pub fn composite(value: Instance, dependents: Dependents) -> Self {
        Self::new(None, value, dependents)
    }

    fn composite_of(dependents: Dependents) -> Self {
        Self {
            bean: None,
            value: None,
            dependents: Mutex::new(dependents),
        }
    }

    /// 可选查找未命中时的空结果
    pub fn empty() -> Self {
        Self::composite_of(Dependents::new())
    }

    /// 可选包装：存在时即为内部句柄，关闭委托给它；否则为空结果
    pub fn optional(inner: Option<InstanceHandle>) -> Self {
        inner.unwrap_or_else(Self::empty)
    }

    /// 来源组件
    pub fn bean(&self) -> Option<&Arc<BeanDefinition>> {
        self.bean.as_ref()
    }

    /// 实例值
    pub fn value(&self) -> Option<&Instance> {
        self.value.as_ref()
    }

    /// 是否存在实例
    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }

    /// 转换为具体类型
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.value.clone().and_then(|value| value.downcast::<T>().ok())
    }

    /// 登记依赖句柄
    pub fn add_dependent(&self, dependent: InstanceHandle) {
        self.dependents.lock().push(dependent);
    }

    /// 依赖句柄数量
    pub fn dependent_count(&self) -> usize {
        self.dependents.lock().len()
    }

    /// 关闭句柄
    ///
    /// 每一步失败都会被收集，全部步骤执行完后以一个聚合错误返回。
    pub fn close(&self, container: &dyn DiContainer) -> TeardownResult<()> {
        let mut dependents = self.dependents.lock();
        let mut failures = FailureCollector::new();

        if let (Some(bean), Some(value)) = (&self.bean, &self.value) {
            debug!("销毁组件实例: {}", bean.describe());
            failures.record(bean.run_destroy(container, value));
        }

        for dependent in dependents.iter() {
            failures.record(dependent.close(container));
        }
        dependents.clear();

        let name = self.bean.as_ref().map_or("<anonymous>", |bean| bean.name());
        failures.finish(format!("关闭实例句柄失败: {name}"))
    }
}

impl fmt::Debug for InstanceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceHandle")
            .field("bean", &self.bean.as_ref().map(|bean| bean.name()))
            .field("present", &self.value.is_some())
            .field("dependents", &self.dependents.lock().len())
            .finish()
    }
}

/// 类型化组件视图
///
/// 持有具体类型的实例与其句柄，生命周期由句柄决定。
pub struct Bean<T> {
    value: Arc<T>,
    handle: InstanceHandle,
}

impl<T: Any + Send + Sync> Bean<T> {
    /// 从句柄转换，类型不匹配时返回错误
    pub fn from_handle(handle: InstanceHandle) -> DependencyResult<Self> {
        match handle.downcast::<T>() {
            Some(value) => Ok(Self { value, handle }),
            None => Err(DependencyError::TypeMismatch {
                bean: handle
                    .bean()
                    .map_or_else(|| "<anonymous>".to_string(), |bean| bean.describe()),
                expected: std::any::type_name::<T>().to_string(),
            }),
        }
    }

    /// 实例的共享指针
    pub fn value(&self) -> &Arc<T> {
        &self.value
    }

    /// 底层句柄
    pub fn handle(&self) -> &InstanceHandle {
        &self.handle
    }

    /// 拆分为实例与句柄
    pub fn into_parts(self) -> (Arc<T>, InstanceHandle) {
        (self.value, self.handle)
    }

    /// 关闭底层句柄
    pub fn close(&self, container: &dyn DiContainer) -> TeardownResult<()> {
        self.handle.close(container)
    }
}

impl<T> Deref for Bean<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> fmt::Debug for Bean<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bean")
            .field("type", &std::any::type_name::<T>())
            .field("handle", &self.handle)
            .finish()
    }
}
