//! 组件注册表

use di_abstractions::BeanDefinition;
use infrastructure_common::Capability;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// 组件注册表
///
/// 按提供的能力精确分组，每组按优先级降序排列。启动阶段写入，之后只读。
#[derive(Debug, Default)]
pub struct BeanRegistry {
    beans: HashMap<Capability, Vec<Arc<BeanDefinition>>>,
}

impl BeanRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册组件定义
    ///
    /// 同一批次内按能力分组；已存在的同能力分组被整体替换。
    pub fn register(&mut self, beans: impl IntoIterator<Item = BeanDefinition>) {
        let mut grouped: HashMap<Capability, Vec<Arc<BeanDefinition>>> = HashMap::new();
        for bean in beans {
            grouped
                .entry(bean.provides().clone())
                .or_default()
                .push(Arc::new(bean));
        }

        for (capability, mut group) in grouped {
            group.sort_by(|a, b| b.priority().cmp(&a.priority()));
            debug!("注册能力 {} 的 {} 个组件", capability, group.len());
            self.beans.insert(capability, group);
        }
    }

    /// 精确提供该能力的组件，按优先级降序
    pub fn candidates(&self, capability: &Capability) -> Option<&[Arc<BeanDefinition>]> {
        self.beans.get(capability).map(Vec::as_slice)
    }

    /// 所有已注册的能力
    pub fn capabilities(&self) -> impl Iterator<Item = &Capability> {
        self.beans.keys()
    }

    /// 已注册的能力数量
    pub fn capability_count(&self) -> usize {
        self.beans.len()
    }

    /// 已注册的组件定义总数
    pub fn len(&self) -> usize {
        self.beans.values().map(Vec::len).sum()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.beans.is_empty()
    }
}
