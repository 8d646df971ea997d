//! 作用域注册表

use di_abstractions::{DiContainer, Scope};
use infrastructure_common::{FailureCollector, ScopeMarker, TeardownResult};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// 作用域注册表
///
/// 作用域标记到作用域实现的绑定，后注册的覆盖先注册的。
#[derive(Default)]
pub struct ScopeRegistry {
    scopes: HashMap<ScopeMarker, Arc<dyn Scope>>,
}

impl ScopeRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册作用域
    pub fn register(&mut self, scopes: impl IntoIterator<Item = Arc<dyn Scope>>) {
        for scope in scopes {
            debug!("绑定作用域 {} -> {}", scope.marker(), scope.name());
            self.scopes.insert(scope.marker(), scope);
        }
    }

    /// 查找绑定到标记的作用域
    pub fn find_context(&self, marker: &ScopeMarker) -> Option<Arc<dyn Scope>> {
        self.scopes.get(marker).cloned()
    }

    /// 已绑定的作用域数量
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// 关闭所有可关闭的作用域
    ///
    /// 按实现名称排序依次关闭，每个作用域都会被尝试，失败汇总为一个错误。
    pub fn close(&self, container: &dyn DiContainer) -> TeardownResult<()> {
        let mut closeable: Vec<&Arc<dyn Scope>> =
            self.scopes.values().filter(|scope| scope.is_closeable()).collect();
        closeable.sort_by(|a, b| a.name().cmp(b.name()));

        let mut failures = FailureCollector::new();
        for scope in closeable {
            debug!("关闭作用域: {}", scope.name());
            if let Err(e) = scope.close(container) {
                warn!("关闭作用域 {} 失败: {}", scope.name(), e);
                failures.push(e);
            }
        }
        failures.finish("关闭作用域失败")
    }
}

impl std::fmt::Debug for ScopeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut bindings: Vec<(&str, &str)> = self
            .scopes
            .iter()
            .map(|(marker, scope)| (marker.name(), scope.name()))
            .collect();
        bindings.sort_unstable();
        f.debug_struct("ScopeRegistry").field("scopes", &bindings).finish()
    }
}
