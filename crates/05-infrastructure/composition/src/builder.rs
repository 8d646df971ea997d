//! 容器构建器

use crate::aggregator::ModuleAggregator;
use crate::config::ContainerConfig;
use di_abstractions::Module;
use di_impl::IocContainer;
use infrastructure_common::{InfrastructureError, InfrastructureResult};
use serde_json::Value;
use tracing::info;

/// 容器构建器
///
/// 使用建造者模式组装模块、配置与日志，构建运行中的容器
pub struct ContainerBuilder {
    /// 容器配置
    config: ContainerConfig,
    /// 预注册的模块
    modules: Vec<Box<dyn Module>>,
    /// 是否启用日志初始化
    logging_enabled: bool,
    /// 日志配置
    logging_config: LoggingConfig,
}

impl ContainerBuilder {
    /// 创建新的容器构建器
    pub fn new() -> Self {
        Self {
            config: ContainerConfig::default(),
            modules: Vec::new(),
            logging_enabled: false, // 默认不启用日志初始化
            logging_config: LoggingConfig::default(),
        }
    }

    /// 禁用模块自动发现
    pub fn disable_auto_discovery(mut self) -> Self {
        self.config.auto_discovery = false;
        self
    }

    /// 预注册模块
    pub fn register_module<M: Module + 'static>(mut self, module: M) -> Self {
        self.modules.push(Box::new(module));
        self
    }

    /// 预注册已装箱的模块
    pub fn register_boxed_module(mut self, module: Box<dyn Module>) -> Self {
        self.modules.push(module);
        self
    }

    /// 设置配置属性
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.properties.insert(key.into(), value.into());
        self
    }

    /// 设置环境变量前缀
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.env_prefix = Some(prefix.into());
        self
    }

    /// 使用完整的容器配置，覆盖之前的配置项
    pub fn with_config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// 启用日志初始化
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = config;
        self.logging_enabled = true; // 启用日志初始化
        self
    }

    /// 构建并启动容器
    pub fn build(self) -> InfrastructureResult<IocContainer> {
        // 只有在明确配置了日志时才初始化日志
        // 避免在测试环境中重复初始化
        if self.logging_enabled {
            self.initialize_logging()?;
        }

        info!(
            "开始构建容器，模块发现: {}，预注册模块: {}",
            self.config.auto_discovery,
            self.modules.len()
        );

        let source = self.config.to_config_source();
        let mut aggregator =
            ModuleAggregator::new(source).with_auto_discovery(self.config.auto_discovery);
        for module in self.modules {
            aggregator = aggregator.add_module(module);
        }

        aggregator.aggregate()
    }

    /// 初始化日志系统
    fn initialize_logging(&self) -> Result<(), InfrastructureError> {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(self.logging_config.level)
            .with_target(self.logging_config.show_target)
            .with_thread_ids(self.logging_config.show_thread_ids)
            .with_file(self.logging_config.show_file)
            .with_line_number(self.logging_config.show_line_number);

        if self.logging_config.json_format {
            subscriber.json().try_init()
        } else {
            subscriber.try_init()
        }
        .map_err(|e| InfrastructureError::BootstrapFailed {
            message: format!("日志初始化失败: {}", e),
        })?;

        info!("日志系统初始化完成");
        Ok(())
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: tracing::Level,
    /// 是否显示目标
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
    /// 是否显示文件名
    pub show_file: bool,
    /// 是否显示行号
    pub show_line_number: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 创建开发环境日志配置
    pub fn development() -> Self {
        Self {
            level: tracing::Level::DEBUG,
            show_target: true,
            show_thread_ids: true,
            show_file: true,
            show_line_number: true,
            json_format: false,
        }
    }

    /// 创建生产环境日志配置
    pub fn production() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: false,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use di_abstractions::{DiContainer, DiContainerExt, Emitter, ModuleContribution};
    use infrastructure_common::{Capability, ConfigSource, LifecycleState};

    #[test]
    fn test_manual_build_registers_defaults() {
        let container = ContainerBuilder::new()
            .disable_auto_discovery()
            .with_property("app.name", "lorn")
            .build()
            .unwrap();

        assert_eq!(container.state(), LifecycleState::Running);

        let config = container.lookup_type::<ConfigSource>().unwrap();
        assert_eq!(config.get_string("app.name").as_deref(), Some("lorn"));

        let emitter = container.lookup_type::<Emitter>().unwrap();
        let again = container.lookup_type::<Emitter>().unwrap();
        assert!(std::sync::Arc::ptr_eq(emitter.value(), again.value()));

        container.close().unwrap();
    }

    #[test]
    fn test_container_bean_is_the_container() {
        let container = ContainerBuilder::new().disable_auto_discovery().build().unwrap();

        let shared = container
            .lookup_as::<std::sync::Arc<dyn DiContainer>>(&di_abstractions::container_capability())
            .unwrap();
        assert_eq!(shared.state(), LifecycleState::Running);
        assert_eq!(shared.stats().bean_definitions, 3);
    }

    #[test]
    fn test_module_bean_filter_vetoes_defaults() {
        let module = ModuleContribution::new("no-emitter")
            .with_bean_filter(|_, bean| bean.name() != "emitter");

        let container = ContainerBuilder::new()
            .disable_auto_discovery()
            .register_module(module)
            .build()
            .unwrap();

        let result = container.lookup(&Capability::of::<Emitter>());
        assert!(result.is_err());
        assert!(container.lookup_type::<ConfigSource>().is_ok());
    }

    #[test]
    fn test_logging_configs() {
        let dev = LoggingConfig::development();
        assert_eq!(dev.level, tracing::Level::DEBUG);
        assert!(!dev.json_format);

        let prod = LoggingConfig::production();
        assert_eq!(prod.level, tracing::Level::INFO);
        assert!(prod.json_format);
    }
}
