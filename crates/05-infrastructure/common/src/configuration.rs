//! 配置源
//!
//! 容器默认注册的配置组件。只在内存中保存键值，来源为构建器属性和带前缀的环境变量。

use crate::errors::{ConfigError, ConfigResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// 环境变量键的分隔符
const ENV_SEPARATOR: &str = "_";

/// 配置源
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigSource {
    values: BTreeMap<String, Value>,
}

impl ConfigSource {
    /// 创建空配置源
    pub fn new() -> Self {
        Self::default()
    }

    /// 从键值对创建配置源
    pub fn from_properties<I, K, V>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            values: properties
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// 合并带前缀的环境变量，`PREFIX_A_B` 映射为 `a.b`
    pub fn with_environment(mut self, prefix: &str) -> Self {
        self.merge_env_vars(prefix, std::env::vars());
        self
    }

    fn merge_env_vars(&mut self, prefix: &str, vars: impl IntoIterator<Item = (String, String)>) {
        debug!("加载环境变量，前缀: {}", prefix);

        let mut loaded = 0usize;
        for (key, value) in vars {
            if let Some(config_key) = env_key_to_config_key(prefix, &key) {
                self.values.insert(config_key, parse_env_value(&value));
                loaded += 1;
            }
        }

        debug!("加载了 {} 个环境变量", loaded);
    }

    /// 设置配置项
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// 获取配置项
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// 以字符串形式获取配置项
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.values.get(key).map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// 绑定配置项到具体类型
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> ConfigResult<T> {
        let value = self
            .values
            .get(key)
            .ok_or_else(|| ConfigError::KeyNotFound { key: key.to_string() })?;

        serde_json::from_value(value.clone()).map_err(|source| ConfigError::TypeConversionError {
            key: key.to_string(),
            source,
        })
    }

    /// 检查配置键是否存在
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// 所有配置键（有序）
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// 配置项数量
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn env_key_to_config_key(prefix: &str, env_key: &str) -> Option<String> {
    let rest = env_key.strip_prefix(prefix)?.strip_prefix(ENV_SEPARATOR)?;
    if rest.is_empty() {
        return None;
    }
    Some(rest.replace(ENV_SEPARATOR, ".").to_lowercase())
}

fn parse_env_value(raw: &str) -> Value {
    if let Ok(b) = raw.parse::<bool>() {
        Value::Bool(b)
    } else if let Ok(i) = raw.parse::<i64>() {
        Value::from(i)
    } else if let Ok(f) = raw.parse::<f64>() {
        serde_json::Number::from_f64(f).map_or_else(|| Value::String(raw.to_string()), Value::Number)
    } else {
        Value::String(raw.to_string())
    }
}
