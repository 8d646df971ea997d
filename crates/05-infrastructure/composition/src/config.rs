//! 容器配置

use infrastructure_common::{ConfigError, ConfigResult, ConfigSource};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// 容器配置
///
/// 可以从 JSON 值反序列化，缺失的字段使用默认值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// 是否启用模块自动发现
    pub auto_discovery: bool,
    /// 环境变量前缀，设置后合并 `PREFIX_A_B` 形式的环境变量
    pub env_prefix: Option<String>,
    /// 额外的配置属性
    pub properties: BTreeMap<String, Value>,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            auto_discovery: true,
            env_prefix: None,
            properties: BTreeMap::new(),
        }
    }
}

impl ContainerConfig {
    /// 从 JSON 值创建配置
    pub fn from_value(value: Value) -> ConfigResult<Self> {
        serde_json::from_value(value).map_err(|source| ConfigError::TypeConversionError {
            key: "container".to_string(),
            source,
        })
    }

    /// 构建默认注册的配置源
    pub fn to_config_source(&self) -> ConfigSource {
        let source = ConfigSource::from_properties(self.properties.clone());
        match &self.env_prefix {
            Some(prefix) => source.with_environment(prefix),
            None => source,
        }
    }
}
