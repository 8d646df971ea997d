//! 作用域抽象接口

use crate::bean::BeanDefinition;
use crate::container::DiContainer;
use crate::instance::InstanceHandle;
use infrastructure_common::{DependencyResult, ScopeMarker};
use std::sync::Arc;

/// 作用域 trait
///
/// 作用域完全决定其标记下组件的创建与缓存策略，并自行负责线程安全。
pub trait Scope: Send + Sync {
    /// 绑定的作用域标记
    fn marker(&self) -> ScopeMarker;

    /// 实现名称，关闭时按该名称排序以保证顺序可复现
    fn name(&self) -> &str;

    /// 获取或创建组件实例
    fn get_or_create(
        &self,
        container: &dyn DiContainer,
        bean: &Arc<BeanDefinition>,
    ) -> DependencyResult<InstanceHandle>;

    /// 是否参与容器关闭
    fn is_closeable(&self) -> bool {
        false
    }

    /// 关闭作用域，释放缓存的实例
    fn close(&self, _container: &dyn DiContainer) -> anyhow::Result<()> {
        Ok(())
    }
}
