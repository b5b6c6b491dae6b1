use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::Context;
use parking_lot::RwLock;

/// 配置值类型
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Array(Vec<ConfigValue>),
}

impl ConfigValue {
    /// 转换为字符串
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// 转换为整数
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(i) => Some(*i),
            ConfigValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// 转换为布尔值
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            ConfigValue::String(s) => match s.to_lowercase().as_str() {
                "true" | "yes" | "1" => Some(true),
                "false" | "no" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

/// 配置源 trait
pub trait PropertySource: Send + Sync {
    /// 获取配置源名称
    fn name(&self) -> &str;

    /// 获取配置值
    fn get(&self, key: &str) -> Option<ConfigValue>;

    /// 配置源优先级（数字越大优先级越高）
    fn priority(&self) -> i32 {
        0
    }
}

/// Environment - 配置管理器
///
/// 按优先级依次查询各配置源，第一个命中的值生效
pub struct Environment {
    /// 配置源列表（按优先级降序）
    sources: RwLock<Vec<Box<dyn PropertySource>>>,

    /// 当前激活的 profile
    active_profiles: RwLock<Vec<String>>,
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("active_profiles", &*self.active_profiles.read())
            .field("sources_count", &self.sources.read().len())
            .finish()
    }
}

impl Environment {
    /// 创建新的环境
    pub fn new() -> Self {
        Self {
            sources: RwLock::new(Vec::new()),
            active_profiles: RwLock::new(Vec::new()),
        }
    }

    /// 添加配置源
    pub fn add_property_source(&self, source: Box<dyn PropertySource>) {
        let mut sources = self.sources.write();
        tracing::debug!(
            "Adding property source '{}' (priority: {})",
            source.name(),
            source.priority()
        );
        sources.push(source);
        // 稳定排序，同优先级后加入的排在后面
        sources.sort_by(|a, b| b.priority().cmp(&a.priority()));
    }

    /// 获取配置值
    pub fn get(&self, key: &str) -> Option<ConfigValue> {
        let sources = self.sources.read();
        for source in sources.iter() {
            if let Some(value) = source.get(key) {
                tracing::trace!("Config '{}' found in source '{}'", key, source.name());
                return Some(value);
            }
        }
        None
    }

    /// 获取字符串配置
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(|v| v.as_str().map(String::from))
    }

    /// 获取字符串配置（带默认值）
    pub fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_string(key).unwrap_or_else(|| default.to_string())
    }

    /// 获取整数配置
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| v.as_i64())
    }

    /// 获取布尔值配置
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.as_bool())
    }

    /// 获取布尔值配置（带默认值）
    pub fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.get_bool(key).unwrap_or(default)
    }

    /// 设置激活的 profile
    pub fn set_active_profiles(&self, profiles: Vec<String>) {
        *self.active_profiles.write() = profiles;
    }

    /// 获取激活的 profile
    pub fn get_active_profiles(&self) -> Vec<String> {
        self.active_profiles.read().clone()
    }

    /// 检查是否激活了指定的 profile
    pub fn accepts_profile(&self, profile: &str) -> bool {
        self.active_profiles.read().iter().any(|p| p == profile)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

// ========== Property Sources ==========

/// 环境变量配置源
pub struct EnvironmentPropertySource {
    prefix: String,
    priority: i32,
}

impl EnvironmentPropertySource {
    /// 创建环境变量配置源
    ///
    /// # 参数
    /// * `prefix` - 环境变量前缀，例如 "APP_"
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            priority: 100, // 环境变量优先级较高
        }
    }

    /// 将配置键转换为环境变量名
    /// 例如: logging.show-target -> APP_LOGGING_SHOW_TARGET
    fn key_to_env(&self, key: &str) -> String {
        format!(
            "{}{}",
            self.prefix,
            key.replace(['.', '-'], "_").to_uppercase()
        )
    }
}

impl PropertySource for EnvironmentPropertySource {
    fn name(&self) -> &str {
        "environment"
    }

    fn get(&self, key: &str) -> Option<ConfigValue> {
        std::env::var(self.key_to_env(key))
            .ok()
            .map(ConfigValue::String)
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

/// TOML 文件配置源
pub struct TomlPropertySource {
    name: String,
    properties: HashMap<String, ConfigValue>,
    priority: i32,
}

impl TomlPropertySource {
    /// 从文件加载 TOML 配置
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        Self::parse(&content, path.to_string_lossy())
    }

    /// 从字符串解析 TOML 配置
    pub fn parse(content: &str, name: impl Into<String>) -> anyhow::Result<Self> {
        let name = name.into();
        let value: toml::Table =
            toml::from_str(content).with_context(|| format!("Failed to parse TOML in {}", name))?;

        let mut properties = HashMap::new();
        for (key, val) in &value {
            Self::flatten_toml(val, key.clone(), &mut properties);
        }

        Ok(Self {
            name,
            properties,
            priority: 0, // 文件配置优先级最低
        })
    }

    /// 展平 TOML 结构
    /// 例如: { logging: { level: "debug" } } -> { "logging.level": "debug" }
    fn flatten_toml(value: &toml::Value, prefix: String, result: &mut HashMap<String, ConfigValue>) {
        match value {
            toml::Value::Table(table) => {
                for (key, val) in table {
                    Self::flatten_toml(val, format!("{}.{}", prefix, key), result);
                }
            }
            other => {
                if let Some(converted) = Self::toml_value_to_config(other) {
                    result.insert(prefix, converted);
                }
            }
        }
    }

    /// 转换 TOML 值为 ConfigValue（嵌套在数组里的表不支持）
    fn toml_value_to_config(value: &toml::Value) -> Option<ConfigValue> {
        match value {
            toml::Value::String(s) => Some(ConfigValue::String(s.clone())),
            toml::Value::Integer(i) => Some(ConfigValue::Int(*i)),
            toml::Value::Float(f) => Some(ConfigValue::Float(*f)),
            toml::Value::Boolean(b) => Some(ConfigValue::Bool(*b)),
            toml::Value::Datetime(dt) => Some(ConfigValue::String(dt.to_string())),
            toml::Value::Array(arr) => Some(ConfigValue::Array(
                arr.iter().filter_map(Self::toml_value_to_config).collect(),
            )),
            toml::Value::Table(_) => None,
        }
    }

    /// 设置优先级
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl PropertySource for TomlPropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Option<ConfigValue> {
        self.properties.get(key).cloned()
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

/// 内存配置源（用于测试或运行时配置）
pub struct MapPropertySource {
    name: String,
    properties: HashMap<String, ConfigValue>,
    priority: i32,
}

impl MapPropertySource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: HashMap::new(),
            priority: 50,
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: ConfigValue) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl PropertySource for MapPropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Option<ConfigValue> {
        self.properties.get(key).cloned()
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[app]
name = "injection-demo"
banner = false

[logging]
level = "debug"
show-target = true
"#;

    #[test]
    fn test_toml_is_flattened() {
        let source = TomlPropertySource::parse(SAMPLE, "sample").unwrap();

        assert_eq!(
            source.get("app.name"),
            Some(ConfigValue::String("injection-demo".to_string()))
        );
        assert_eq!(source.get("app.banner"), Some(ConfigValue::Bool(false)));
        assert_eq!(source.get("logging.show-target"), Some(ConfigValue::Bool(true)));
        assert!(source.get("app").is_none());
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        assert!(TomlPropertySource::parse("[app\nname = ", "broken").is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(TomlPropertySource::from_file("/definitely/not/here/application.toml").is_err());
    }

    #[test]
    fn test_priority_order() {
        let env = Environment::new();
        env.add_property_source(Box::new(TomlPropertySource::parse(SAMPLE, "sample").unwrap()));
        env.add_property_source(Box::new(
            MapPropertySource::new("override")
                .with_property("logging.level", ConfigValue::String("warn".to_string())),
        ));

        assert_eq!(env.get_string("logging.level").as_deref(), Some("warn"));
        assert_eq!(env.get_string_or("app.name", "x"), "injection-demo");
        assert!(!env.get_bool_or("app.banner", true));
        assert_eq!(env.get_string_or("app.missing", "fallback"), "fallback");
    }

    #[test]
    fn test_environment_variable_source() {
        std::env::set_var("INJTEST_LOGGING_SHOW_TARGET", "yes");

        let env = Environment::new();
        env.add_property_source(Box::new(EnvironmentPropertySource::new("INJTEST_")));

        assert_eq!(env.get_bool("logging.show-target"), Some(true));
        assert!(env.get("logging.level").is_none());

        std::env::remove_var("INJTEST_LOGGING_SHOW_TARGET");
    }

    #[test]
    fn test_config_value_conversions() {
        assert_eq!(ConfigValue::String("42".to_string()).as_i64(), Some(42));
        assert_eq!(ConfigValue::String("no".to_string()).as_bool(), Some(false));
        assert_eq!(ConfigValue::Float(1.5).as_str(), None);
    }
}
