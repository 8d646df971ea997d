//! 作用域标记与生命周期状态

use std::borrow::Cow;
use std::fmt;

/// 组件与监听器的默认优先级
pub const DEFAULT_PRIORITY: i32 = 1000;

/// 作用域标记
///
/// 标识一类作用域，容器生命周期内与唯一一个作用域实现绑定。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeMarker(Cow<'static, str>);

impl ScopeMarker {
    /// 默认作用域：每次查找都创建新实例
    pub const DEFAULT: ScopeMarker = ScopeMarker(Cow::Borrowed("default"));

    /// 应用作用域：容器内唯一实例
    pub const APPLICATION: ScopeMarker = ScopeMarker(Cow::Borrowed("application"));

    /// 创建自定义作用域标记
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// 标记名称
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Default for ScopeMarker {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for ScopeMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 容器生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// 未初始化
    Uninitialized,
    /// 初始化中
    Initializing,
    /// 运行中
    Running,
    /// 停止中
    Stopping,
    /// 已停止
    Stopped,
}

impl Default for LifecycleState {
    fn default() -> Self {
        Self::Uninitialized
    }
}
