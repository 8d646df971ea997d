//! 事件与监听器定义
//!
//! 事件分发是同步的，在调用者线程上按优先级依次执行监听器。

use crate::container::DiContainer;
use infrastructure_common::{ListenerError, TypeDescriptor, DEFAULT_PRIORITY};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 启动事件的类型名称
pub const START_EVENT: &str = "lorn.ioc.Start";

/// 停止事件的类型名称
pub const STOP_EVENT: &str = "lorn.ioc.Stop";

/// 向 [`Any`] 的转换，为所有 `'static` 类型自动实现
pub trait AsAny {
    /// 转换为 `&dyn Any`
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// 事件 trait
///
/// 分发使用事件的运行时类型描述，监听器按该类型及其父类型、实现的能力匹配。
pub trait Event: AsAny + Send + Sync {
    /// 事件的运行时类型
    fn event_type(&self) -> TypeDescriptor;
}

/// 监听回调
pub type ListenerFn = Arc<dyn Fn(&dyn DiContainer, &dyn Event) -> anyhow::Result<()> + Send + Sync>;

/// 监听器定义
#[derive(Clone)]
pub struct ListenerDefinition {
    name: String,
    event_type: TypeDescriptor,
    priority: i32,
    on_event: ListenerFn,
}

impl ListenerDefinition {
    /// 创建监听器定义
    pub fn new<F>(name: impl Into<String>, event_type: TypeDescriptor, on_event: F) -> Self
    where
        F: Fn(&dyn DiContainer, &dyn Event) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            event_type,
            priority: DEFAULT_PRIORITY,
            on_event: Arc::new(on_event),
        }
    }

    /// 创建只处理具体事件类型 `E` 的监听器，其他运行时类型的事件被忽略
    pub fn typed<E, F>(name: impl Into<String>, event_type: TypeDescriptor, on_event: F) -> Self
    where
        E: Event + 'static,
        F: Fn(&dyn DiContainer, &E) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self::new(name, event_type, move |container, event| {
            match event.as_any().downcast_ref::<E>() {
                Some(typed) => on_event(container, typed),
                None => Ok(()),
            }
        })
    }

    /// 设置优先级，数值越小越先执行
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// 监听器名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 监听的事件类型
    pub fn event_type(&self) -> &TypeDescriptor {
        &self.event_type
    }

    /// 优先级
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// 处理事件
    pub fn on_event(&self, container: &dyn DiContainer, event: &dyn Event) -> Result<(), ListenerError> {
        (self.on_event)(container, event).map_err(|source| ListenerError {
            listener: self.name.clone(),
            event: event.event_type().name().to_string(),
            source: source.into(),
        })
    }
}

impl fmt::Debug for ListenerDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerDefinition")
            .field("name", &self.name)
            .field("event_type", &self.event_type)
            .field("priority", &self.priority)
            .finish()
    }
}

/// 容器启动事件
#[derive(Debug, Clone)]
pub struct Start {
    /// 启动时间
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl Start {
    /// 创建启动事件
    pub fn new() -> Self {
        Self {
            started_at: chrono::Utc::now(),
        }
    }

    /// 启动事件的类型描述
    pub fn descriptor() -> TypeDescriptor {
        TypeDescriptor::named(START_EVENT)
    }
}

impl Default for Start {
    fn default() -> Self {
        Self::new()
    }
}

impl Event for Start {
    fn event_type(&self) -> TypeDescriptor {
        Self::descriptor()
    }
}

/// 容器停止事件
#[derive(Debug, Clone)]
pub struct Stop {
    /// 停止时间
    pub stopped_at: chrono::DateTime<chrono::Utc>,
}

impl Stop {
    /// 创建停止事件
    pub fn new() -> Self {
        Self {
            stopped_at: chrono::Utc::now(),
        }
    }

    /// 停止事件的类型描述
    pub fn descriptor() -> TypeDescriptor {
        TypeDescriptor::named(STOP_EVENT)
    }
}

impl Default for Stop {
    fn default() -> Self {
        Self::new()
    }
}

impl Event for Stop {
    fn event_type(&self) -> TypeDescriptor {
        Self::descriptor()
    }
}

/// 事件发送器
///
/// 默认注册的组件，将事件转发给容器的监听器注册表。
#[derive(Clone)]
pub struct Emitter {
    container: Arc<dyn DiContainer>,
}

impl Emitter {
    /// 创建绑定到容器的发送器
    pub fn new(container: Arc<dyn DiContainer>) -> Self {
        Self { container }
    }

    /// 发送事件
    pub fn emit(&self, event: &dyn Event) -> Result<(), ListenerError> {
        self.container.fire(event)
    }
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter").finish_non_exhaustive()
    }
}
