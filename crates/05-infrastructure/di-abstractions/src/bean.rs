//! 组件定义
//!
//! 组件的创建、注入、销毁三个操作以函数值的形式封闭在同一个记录中，注册后不可变。

use crate::container::DiContainer;
use crate::instance::{Dependents, Instance};
use infrastructure_common::{Capability, ScopeMarker, DEFAULT_PRIORITY};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// 组件创建函数
pub type CreateFn =
    Arc<dyn Fn(&dyn DiContainer, &mut Dependents) -> anyhow::Result<Instance> + Send + Sync>;

/// 组件注入函数
pub type InjectFn =
    Arc<dyn Fn(&dyn DiContainer, &mut Dependents, &Instance) -> anyhow::Result<()> + Send + Sync>;

/// 组件销毁函数
pub type DestroyFn = Arc<dyn Fn(&dyn DiContainer, &Instance) -> anyhow::Result<()> + Send + Sync>;

/// 组件定义
#[derive(Clone)]
pub struct BeanDefinition {
    id: Uuid,
    name: String,
    provides: Capability,
    scope: ScopeMarker,
    priority: i32,
    create: CreateFn,
    inject: Option<InjectFn>,
    destroy: Option<DestroyFn>,
    metadata: HashMap<String, String>,
}

impl BeanDefinition {
    /// 创建新的组件定义
    ///
    /// 默认使用 [`ScopeMarker::DEFAULT`] 作用域与默认优先级。
    pub fn new<F>(name: impl Into<String>, provides: Capability, create: F) -> Self
    where
        F: Fn(&dyn DiContainer, &mut Dependents) -> anyhow::Result<Instance> + Send + Sync + 'static,
    {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            provides,
            scope: ScopeMarker::DEFAULT,
            priority: DEFAULT_PRIORITY,
            create: Arc::new(create),
            inject: None,
            destroy: None,
            metadata: HashMap::new(),
        }
    }

    /// 使用返回具体类型的创建函数创建组件定义
    pub fn typed<T, F>(name: impl Into<String>, provides: Capability, create: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&dyn DiContainer, &mut Dependents) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        Self::new(name, provides, move |container, dependents| {
            Ok(Arc::new(create(container, dependents)?) as Instance)
        })
    }

    /// 设置作用域
    pub fn with_scope(mut self, scope: ScopeMarker) -> Self {
        self.scope = scope;
        self
    }

    /// 设置优先级，数值越高优先级越高
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// 设置注入函数，创建之后调用
    pub fn with_inject<F>(mut self, inject: F) -> Self
    where
        F: Fn(&dyn DiContainer, &mut Dependents, &Instance) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.inject = Some(Arc::new(inject));
        self
    }

    /// 设置销毁函数
    pub fn with_destroy<F>(mut self, destroy: F) -> Self
    where
        F: Fn(&dyn DiContainer, &Instance) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.destroy = Some(Arc::new(destroy));
        self
    }

    /// 添加元数据
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// 组件唯一标识
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// 组件名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 提供的能力
    pub fn provides(&self) -> &Capability {
        &self.provides
    }

    /// 作用域标记
    pub fn scope(&self) -> &ScopeMarker {
        &self.scope
    }

    /// 优先级
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// 元数据
    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    /// 用于错误信息的描述：`名称 (能力)`
    pub fn describe(&self) -> String {
        format!("{} ({})", self.name, self.provides)
    }

    pub(crate) fn run_create(
        &self,
        container: &dyn DiContainer,
        dependents: &mut Dependents,
    ) -> anyhow::Result<Instance> {
        (self.create)(container, dependents)
    }

    pub(crate) fn run_inject(
        &self,
        container: &dyn DiContainer,
        dependents: &mut Dependents,
        value: &Instance,
    ) -> anyhow::Result<()> {
        match &self.inject {
            Some(inject) => inject(container, dependents, value),
            None => Ok(()),
        }
    }

    pub(crate) fn run_destroy(&self, container: &dyn DiContainer, value: &Instance) -> anyhow::Result<()> {
        match &self.destroy {
            Some(destroy) => destroy(container, value),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for BeanDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanDefinition")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("provides", &self.provides)
            .field("scope", &self.scope)
            .field("priority", &self.priority)
            .field("inject", &self.inject.is_some())
            .field("destroy", &self.destroy.is_some())
            .field("metadata", &self.metadata)
            .finish()
    }
}
