//! 模块发现
//!
//! 进程级的模块提供者注册表。提供者是无参构造函数，启动时逐一调用以实例化模块。

use di_abstractions::Module;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::debug;

/// 模块提供者
pub type ModuleProvider = fn() -> Box<dyn Module>;

/// 全局模块提供者注册表
static MODULE_PROVIDERS: Lazy<RwLock<Vec<ModuleProvider>>> = Lazy::new(|| RwLock::new(Vec::new()));

/// 注册模块提供者
pub fn register_module_provider(provider: ModuleProvider) {
    MODULE_PROVIDERS.write().push(provider);
}

/// 实例化所有已注册的模块，顺序与注册顺序一致
pub fn discover_modules() -> Vec<Box<dyn Module>> {
    let providers = MODULE_PROVIDERS.read().clone();
    let modules: Vec<Box<dyn Module>> = providers.into_iter().map(|provider| provider()).collect();
    debug!("发现 {} 个模块", modules.len());
    modules
}
