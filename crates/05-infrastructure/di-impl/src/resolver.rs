//! 依赖解析器
//!
//! 将能力请求解析为组件定义，再交给组件作用域实现实例。

use crate::bean_registry::BeanRegistry;
use crate::scope_registry::ScopeRegistry;
use dashmap::DashMap;
use di_abstractions::{BeanDefinition, DiContainer, Instance, InstanceHandle};
use infrastructure_common::{Capability, DependencyError, DependencyResult, TypeMatcher};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, warn};

/// 按顺序排列的列表匹配结果
type BeanList = Arc<[Arc<BeanDefinition>]>;

/// 依赖解析器
///
/// 持有启动时构建的组件与作用域注册表。精确能力直接命中注册表；
/// 其余请求的兼容匹配结果被缓存，注册表变化后需调用 [`Resolver::clear_caches`]。
pub struct Resolver {
    beans: Arc<RwLock<BeanRegistry>>,
    scopes: Arc<RwLock<ScopeRegistry>>,
    resolved: DashMap<Capability, Capability>,
    lists: DashMap<Capability, BeanList>,
}

impl Resolver {
    /// 创建解析器
    pub fn new(beans: Arc<RwLock<BeanRegistry>>, scopes: Arc<RwLock<ScopeRegistry>>) -> Self {
        Self {
            beans,
            scopes,
            resolved: DashMap::new(),
            lists: DashMap::new(),
        }
    }

    /// 解析单个组件
    ///
    /// 可选请求未命中时返回空句柄；其他未命中返回 [`DependencyError::NotFound`]。
    pub fn resolve(
        &self,
        container: &dyn DiContainer,
        capability: &Capability,
    ) -> DependencyResult<InstanceHandle> {
        let (requested, optional) = capability.unwrap_optional();
        let selected = self.select(requested)?;
        if optional {
            if selected.is_none() {
                debug!("可选依赖未命中: {}", requested);
            }
            let inner = selected
                .map(|bean| self.realize(container, &bean))
                .transpose()?;
            return Ok(InstanceHandle::optional(inner));
        }

        match selected {
            Some(bean) => self.realize(container, &bean),
            None => {
                debug!("未找到组件: {}", requested);
                Err(DependencyError::NotFound {
                    capability: requested.to_string(),
                })
            }
        }
    }

    /// 解析全部匹配元素能力的组件并组合
    ///
    /// 元素按优先级降序、名称升序实现；任一元素失败时已实现的元素会被释放。
    pub fn resolve_all(
        &self,
        container: &dyn DiContainer,
        element: &Capability,
        combine: &dyn Fn(Vec<Instance>) -> Instance,
    ) -> DependencyResult<InstanceHandle> {
        let beans = self.list_candidates(element);
        let mut handles = Vec::with_capacity(beans.len());

        for bean in beans.iter() {
            match self.realize(container, bean) {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    for handle in &handles {
                        if let Err(close_error) = handle.close(container) {
                            warn!("释放列表元素失败: {}", close_error);
                        }
                    }
                    return Err(e);
                }
            }
        }

        let values: Vec<Instance> = handles
            .iter()
            .filter_map(|handle| handle.value().cloned())
            .collect();
        Ok(InstanceHandle::composite(combine(values), handles))
    }

    /// 清空解析缓存
    pub fn clear_caches(&self) {
        self.resolved.clear();
        self.lists.clear();
    }

    /// 能力解析缓存条目数
    pub fn resolution_cache_entries(&self) -> usize {
        self.resolved.len()
    }

    /// 列表匹配缓存条目数
    pub fn list_cache_entries(&self) -> usize {
        self.lists.len()
    }

    fn select(&self, requested: &Capability) -> DependencyResult<Option<Arc<BeanDefinition>>> {
        let beans = self.beans.read();

        if let Some(candidates) = beans.candidates(requested) {
            return Self::pick(requested, candidates).map(Some);
        }

        let cached = self.resolved.get(requested).map(|entry| entry.value().clone());
        if let Some(concrete) = cached {
            if let Some(candidates) = beans.candidates(&concrete) {
                return Self::pick(requested, candidates).map(Some);
            }
        }

        let mut matches: Vec<&Capability> = beans
            .capabilities()
            .filter(|candidate| TypeMatcher::is_assignable(candidate, requested))
            .collect();

        match matches.len() {
            0 => Ok(None),
            1 => {
                let concrete = matches[0];
                self.resolved.insert(requested.clone(), concrete.clone());
                match beans.candidates(concrete) {
                    Some(candidates) => Self::pick(requested, candidates).map(Some),
                    None => Ok(None),
                }
            }
            _ => {
                matches.sort_by_key(|capability| capability.to_string());
                let mut flattened: Vec<Arc<BeanDefinition>> = matches
                    .into_iter()
                    .filter_map(|capability| beans.candidates(capability))
                    .flatten()
                    .cloned()
                    .collect();
                flattened.sort_by(|a, b| b.priority().cmp(&a.priority()));
                Self::pick(requested, &flattened).map(Some)
            }
        }
    }

    /// 按优先级决胜：最高优先级必须严格高于次高者
    fn pick(
        requested: &Capability,
        candidates: &[Arc<BeanDefinition>],
    ) -> DependencyResult<Arc<BeanDefinition>> {
        match candidates {
            [] => Err(DependencyError::NotFound {
                capability: requested.to_string(),
            }),
            [only] => Ok(Arc::clone(only)),
            [top, runner_up, ..] if top.priority() > runner_up.priority() => Ok(Arc::clone(top)),
            _ => {
                let names: Vec<String> = candidates.iter().map(|bean| bean.describe()).collect();
                warn!("组件解析存在歧义: {}, 候选组件: {:?}", requested, names);
                Err(DependencyError::Ambiguous {
                    capability: requested.to_string(),
                    candidates: names,
                })
            }
        }
    }

    fn list_candidates(&self, element: &Capability) -> BeanList {
        if let Some(cached) = self.lists.get(element) {
            return Arc::clone(cached.value());
        }

        let beans = self.beans.read();
        let mut matched: Vec<Arc<BeanDefinition>> = beans
            .capabilities()
            .filter(|candidate| TypeMatcher::is_assignable(candidate, element))
            .filter_map(|capability| beans.candidates(capability))
            .flatten()
            .cloned()
            .collect();
        matched.sort_by(|a, b| {
            b.priority()
                .cmp(&a.priority())
                .then_with(|| a.name().cmp(b.name()))
        });

        let list: BeanList = matched.into();
        self.lists.insert(element.clone(), Arc::clone(&list));
        list
    }

    fn realize(
        &self,
        container: &dyn DiContainer,
        bean: &Arc<BeanDefinition>,
    ) -> DependencyResult<InstanceHandle> {
        let scope = self.scopes.read().find_context(bean.scope());
        match scope {
            Some(scope) => scope.get_or_create(container, bean),
            None => {
                warn!("作用域未绑定: {}, 组件: {}", bean.scope(), bean.describe());
                Err(DependencyError::MissingScope {
                    scope: bean.scope().to_string(),
                    bean: bean.describe(),
                })
            }
        }
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("resolved", &self.resolved.len())
            .field("lists", &self.lists.len())
            .finish()
    }
}
