//! 模块抽象接口
//!
//! 模块是启动时汇总的一组组件、作用域与监听器贡献，可附带按种类的过滤条件。

use crate::bean::BeanDefinition;
use crate::container::DiContainer;
use crate::event::ListenerDefinition;
use crate::scope::Scope;
use infrastructure_common::DEFAULT_PRIORITY;
use std::fmt;
use std::sync::Arc;

/// 组件过滤条件，返回 `false` 表示否决候选
pub type BeanFilter = Arc<dyn Fn(&dyn DiContainer, &BeanDefinition) -> bool + Send + Sync>;

/// 作用域过滤条件
pub type ScopeFilter = Arc<dyn Fn(&dyn DiContainer, &dyn Scope) -> bool + Send + Sync>;

/// 监听器过滤条件
pub type ListenerFilter = Arc<dyn Fn(&dyn DiContainer, &ListenerDefinition) -> bool + Send + Sync>;

/// 模块 trait
pub trait Module: Send + Sync {
    /// 模块名称
    fn name(&self) -> &str;

    /// 发现顺序优先级，数值越小越靠前
    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    /// 贡献的组件定义
    fn beans(&self) -> Vec<BeanDefinition> {
        Vec::new()
    }

    /// 贡献的作用域
    fn scopes(&self) -> Vec<Arc<dyn Scope>> {
        Vec::new()
    }

    /// 贡献的监听器
    fn listeners(&self) -> Vec<ListenerDefinition> {
        Vec::new()
    }

    /// 组件过滤条件
    fn bean_filter(&self) -> Option<BeanFilter> {
        None
    }

    /// 作用域过滤条件
    fn scope_filter(&self) -> Option<ScopeFilter> {
        None
    }

    /// 监听器过滤条件
    fn listener_filter(&self) -> Option<ListenerFilter> {
        None
    }
}

/// 手工组装的模块
#[derive(Clone, Default)]
pub struct ModuleContribution {
    name: String,
    priority: i32,
    beans: Vec<BeanDefinition>,
    scopes: Vec<Arc<dyn Scope>>,
    listeners: Vec<ListenerDefinition>,
    bean_filter: Option<BeanFilter>,
    scope_filter: Option<ScopeFilter>,
    listener_filter: Option<ListenerFilter>,
}

impl ModuleContribution {
    /// 创建新的模块
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: DEFAULT_PRIORITY,
            ..Self::default()
        }
    }

    /// 设置发现顺序优先级
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// 添加组件定义
    pub fn with_bean(mut self, bean: BeanDefinition) -> Self {
        self.beans.push(bean);
        self
    }

    /// 添加作用域
    pub fn with_scope(mut self, scope: Arc<dyn Scope>) -> Self {
        self.scopes.push(scope);
        self
    }

    /// 添加监听器
    pub fn with_listener(mut self, listener: ListenerDefinition) -> Self {
        self.listeners.push(listener);
        self
    }

    /// 设置组件过滤条件
    pub fn with_bean_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&dyn DiContainer, &BeanDefinition) -> bool + Send + Sync + 'static,
    {
        self.bean_filter = Some(Arc::new(filter));
        self
    }

    /// 设置作用域过滤条件
    pub fn with_scope_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&dyn DiContainer, &dyn Scope) -> bool + Send + Sync + 'static,
    {
        self.scope_filter = Some(Arc::new(filter));
        self
    }

    /// 设置监听器过滤条件
    pub fn with_listener_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&dyn DiContainer, &ListenerDefinition) -> bool + Send + Sync + 'static,
    {
        self.listener_filter = Some(Arc::new(filter));
        self
    }
}

impl Module for ModuleContribution {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn beans(&self) -> Vec<BeanDefinition> {
        self.beans.clone()
    }

    fn scopes(&self) -> Vec<Arc<dyn Scope>> {
        self.scopes.clone()
    }

    fn listeners(&self) -> Vec<ListenerDefinition> {
        self.listeners.clone()
    }

    fn bean_filter(&self) -> Option<BeanFilter> {
        self.bean_filter.clone()
    }

    fn scope_filter(&self) -> Option<ScopeFilter> {
        self.scope_filter.clone()
    }

    fn listener_filter(&self) -> Option<ListenerFilter> {
        self.listener_filter.clone()
    }
}

impl fmt::Debug for ModuleContribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleContribution")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("beans", &self.beans.len())
            .field("scopes", &self.scopes.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
