//! 类型与能力描述
//!
//! 类型层次由声明方显式提供（`extends` / `implements`），不依赖运行时反射。
//! 描述符是名义类型：相等性与哈希只取决于名称。

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// 可选请求包装的原始类型名称
pub const OPTIONAL_TYPE_NAME: &str = "Optional";

/// 列表请求的原始类型名称
pub const LIST_TYPE_NAME: &str = "List";

#[derive(Debug, Clone)]
struct TypeNode {
    name: Cow<'static, str>,
    extends: Option<TypeDescriptor>,
    implements: Vec<TypeDescriptor>,
}

/// 类型描述符
///
/// 携带名称、父类型以及在该层级直接实现的能力（接口）。
/// 克隆开销很小，内部共享同一节点。
#[derive(Clone)]
pub struct TypeDescriptor(Arc<TypeNode>);

impl TypeDescriptor {
    /// 按名称创建类型描述符
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self(Arc::new(TypeNode {
            name: name.into(),
            extends: None,
            implements: Vec::new(),
        }))
    }

    /// 从 Rust 类型创建描述符，名称取 `std::any::type_name`
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::named(std::any::type_name::<T>())
    }

    /// 可选包装的原始类型
    pub fn optional() -> Self {
        Self::named(OPTIONAL_TYPE_NAME)
    }

    /// 列表的原始类型
    pub fn list() -> Self {
        Self::named(LIST_TYPE_NAME)
    }

    /// 声明父类型
    pub fn extends(self, parent: TypeDescriptor) -> Self {
        self.modify(|node| node.extends = Some(parent))
    }

    /// 声明在该层级直接实现的能力
    pub fn implements(self, capability: TypeDescriptor) -> Self {
        self.modify(|node| node.implements.push(capability))
    }

    fn modify(self, f: impl FnOnce(&mut TypeNode)) -> Self {
        let mut node = Arc::try_unwrap(self.0).unwrap_or_else(|shared| (*shared).clone());
        f(&mut node);
        Self(Arc::new(node))
    }

    /// 类型名称
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// 父类型
    pub fn parent(&self) -> Option<&TypeDescriptor> {
        self.0.extends.as_ref()
    }

    /// 在该层级直接实现的能力
    pub fn interfaces(&self) -> &[TypeDescriptor] {
        &self.0.implements
    }

    /// 名义子类型判断（自反、可传递）
    ///
    /// 沿父类型与实现的能力做深度优先遍历，菱形继承只访问一次。
    pub fn is_subtype_of(&self, other: &TypeDescriptor) -> bool {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&TypeDescriptor> = vec![self];

        while let Some(current) = stack.pop() {
            if current == other {
                return true;
            }
            if !visited.insert(current.name()) {
                continue;
            }
            if let Some(parent) = current.parent() {
                stack.push(parent);
            }
            stack.extend(current.interfaces().iter());
        }

        false
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.name == other.0.name
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.name.hash(state);
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeDescriptor").field(&self.name()).finish()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 能力描述
///
/// 组件提供的能力或查找请求的目标类型。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Capability {
    /// 普通类型
    Plain(TypeDescriptor),
    /// 参数化类型（原始类型 + 类型参数）
    Parameterized {
        /// 原始类型
        raw: TypeDescriptor,
        /// 类型参数
        args: Vec<Capability>,
    },
}

impl Capability {
    /// 按名称创建普通能力
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Plain(TypeDescriptor::named(name))
    }

    /// 从 Rust 类型创建普通能力
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::Plain(TypeDescriptor::of::<T>())
    }

    /// 创建参数化能力
    pub fn parameterized(raw: TypeDescriptor, args: Vec<Capability>) -> Self {
        Self::Parameterized { raw, args }
    }

    /// 可选请求包装
    pub fn optional(inner: Capability) -> Self {
        Self::parameterized(TypeDescriptor::optional(), vec![inner])
    }

    /// 列表能力
    pub fn list(element: Capability) -> Self {
        Self::parameterized(TypeDescriptor::list(), vec![element])
    }

    /// 原始类型（普通能力即其自身）
    pub fn raw(&self) -> &TypeDescriptor {
        match self {
            Self::Plain(descriptor) => descriptor,
            Self::Parameterized { raw, .. } => raw,
        }
    }

    /// 拆除可选包装，返回内部能力以及是否为可选请求
    pub fn unwrap_optional(&self) -> (&Capability, bool) {
        match self {
            Self::Parameterized { raw, args } if raw.name() == OPTIONAL_TYPE_NAME && args.len() == 1 => {
                (&args[0], true)
            }
            other => (other, false),
        }
    }
}

impl From<TypeDescriptor> for Capability {
    fn from(descriptor: TypeDescriptor) -> Self {
        Self::Plain(descriptor)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(descriptor) => write!(f, "{descriptor}"),
            Self::Parameterized { raw, args } => {
                write!(f, "{raw}<")?;
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(">")
            }
        }
    }
}
