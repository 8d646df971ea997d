//! 能力匹配

use crate::metadata::Capability;

/// 能力兼容性判断
///
/// - 两侧均为普通能力：名义子类型判断
/// - 参数化候选与普通请求：只比较候选的原始类型，不检查类型参数
/// - 其他情况：结构相等
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeMatcher;

impl TypeMatcher {
    /// 候选能力是否可以满足请求的能力
    pub fn is_assignable(candidate: &Capability, requested: &Capability) -> bool {
        match (candidate, requested) {
            (Capability::Plain(candidate), Capability::Plain(requested)) => {
                candidate.is_subtype_of(requested)
            }
            (Capability::Parameterized { raw, .. }, Capability::Plain(requested)) => {
                raw.is_subtype_of(requested)
            }
            _ => candidate == requested,
        }
    }
}
