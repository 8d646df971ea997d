//! 内置作用域

use dashmap::DashMap;
use di_abstractions::{BeanDefinition, DiContainer, Instance, InstanceHandle, Scope};
use infrastructure_common::{DependencyError, DependencyResult, FailureCollector, ScopeMarker};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

struct Cached {
    value: Instance,
    handle: Arc<InstanceHandle>,
}

/// 单例作用域，绑定 [`ScopeMarker::APPLICATION`]
///
/// 每个组件最多创建一次，并发的首次访问中只有一个线程执行创建。
/// 返回的句柄是非占有视图，实例在作用域关闭时按创建顺序销毁。
#[derive(Default)]
pub struct SingletonScope {
    cells: DashMap<Uuid, Arc<OnceCell<Cached>>>,
    created: Mutex<Vec<Arc<InstanceHandle>>>,
}

impl SingletonScope {
    /// 创建单例作用域
    pub fn new() -> Self {
        Self::default()
    }

    /// 已创建的实例数量
    pub fn len(&self) -> usize {
        self.created.lock().len()
    }

    /// 是否还没有创建任何实例
    pub fn is_empty(&self) -> bool {
        self.created.lock().is_empty()
    }

    fn cell_for(&self, bean: &BeanDefinition) -> Arc<OnceCell<Cached>> {
        Arc::clone(&self.cells.entry(bean.id()).or_default())
    }
}

impl Scope for SingletonScope {
    fn marker(&self) -> ScopeMarker {
        ScopeMarker::APPLICATION
    }

    fn name(&self) -> &str {
        "SingletonScope"
    }

    fn get_or_create(
        &self,
        container: &dyn DiContainer,
        bean: &Arc<BeanDefinition>,
    ) -> DependencyResult<InstanceHandle> {
        let cell = self.cell_for(bean);
        let cached = cell.get_or_try_init(|| {
            let handle = InstanceHandle::realize(bean, container)?;
            let value = handle.value().cloned().ok_or_else(|| DependencyError::TypeMismatch {
                bean: bean.describe(),
                expected: "非空实例".to_string(),
            })?;
            let handle = Arc::new(handle);
            self.created.lock().push(Arc::clone(&handle));
            info!("创建单例组件: {}", bean.describe());
            Ok::<_, DependencyError>(Cached { value, handle })
        })?;
        Ok(InstanceHandle::shared(Arc::clone(&cached.value)))
    }

    fn is_closeable(&self) -> bool {
        true
    }

    fn close(&self, container: &dyn DiContainer) -> anyhow::Result<()> {
        let created: Vec<Arc<InstanceHandle>> = std::mem::take(&mut *self.created.lock());
        self.cells.clear();
        debug!("关闭 {} 个单例实例", created.len());

        let mut failures = FailureCollector::new();
        for handle in created {
            failures.record(handle.close(container));
        }
        Ok(failures.finish("关闭单例实例失败")?)
    }
}

impl std::fmt::Debug for SingletonScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingletonScope")
            .field("instances", &self.len())
            .finish()
    }
}

/// 每次查找作用域，绑定 [`ScopeMarker::DEFAULT`]
///
/// 每次调用都创建新实例，返回的句柄由调用者持有并负责关闭。
#[derive(Debug, Default, Clone, Copy)]
pub struct PerLookupScope;

impl PerLookupScope {
    /// 创建每次查找作用域
    pub fn new() -> Self {
        Self
    }
}

impl Scope for PerLookupScope {
    fn marker(&self) -> ScopeMarker {
        ScopeMarker::DEFAULT
    }

    fn name(&self) -> &str {
        "PerLookupScope"
    }

    fn get_or_create(
        &self,
        container: &dyn DiContainer,
        bean: &Arc<BeanDefinition>,
    ) -> DependencyResult<InstanceHandle> {
        InstanceHandle::realize(bean, container)
    }
}
