//! 统一的错误类型
//!
//! 容器内部使用 [`ContainerError`]，依赖解析失败单独归为 [`ResolutionError`]，
//! 应用启动流程使用 [`ApplicationError`]。

use thiserror::Error;

/// 依赖解析错误
///
/// 注入点无法唯一确定一个 Bean 时返回，启动阶段遇到即终止
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// 按名称查找的 Bean 不存在
    #[error("No bean named '{0}' available")]
    NoSuchBean(String),

    /// 没有任何候选 Bean 匹配所需类型
    #[error("No qualifying bean of type '{type_name}' available for {point}")]
    NoCandidate { type_name: String, point: String },

    /// 多个候选 Bean，且无法通过 primary 或名称消歧
    #[error(
        "No qualifying bean of type '{type_name}' available for {point}: expected single matching bean but found {}: {}",
        candidates.len(),
        candidates.join(", ")
    )]
    NotUnique {
        type_name: String,
        point: String,
        candidates: Vec<String>,
    },

    /// Bean 存在但不能作为所需类型注入
    #[error("Bean named '{name}' is expected to be of type '{expected}'")]
    TypeMismatch { name: String, expected: String },
}

/// 容器错误
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("Bean definition '{0}' already registered")]
    BeanAlreadyExists(String),

    #[error("Circular dependency detected: {0}")]
    CircularDependency(String),

    #[error("Error creating bean '{name}': {source}")]
    BeanCreationFailed {
        name: String,
        #[source]
        source: Box<ContainerError>,
    },

    #[error("Dependency validation failed: {0}")]
    DependencyValidationFailed(String),

    #[error("Configuration is frozen, cannot {0}")]
    ConfigurationFrozen(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ContainerError {
    /// 沿 `BeanCreationFailed` 链找到最内层的错误
    pub fn root_cause(&self) -> &ContainerError {
        let mut current = self;
        while let ContainerError::BeanCreationFailed { source, .. } = current {
            current = source;
        }
        current
    }

    /// 如果根因是解析失败，返回对应的 [`ResolutionError`]
    pub fn resolution_error(&self) -> Option<&ResolutionError> {
        match self.root_cause() {
            ContainerError::Resolution(e) => Some(e),
            _ => None,
        }
    }
}

pub type ContainerResult<T> = std::result::Result<T, ContainerError>;

/// 应用启动错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInitFailed(String),

    #[error("Failed to load configuration: {0}")]
    ConfigLoadFailed(String),

    #[error(transparent)]
    Container(#[from] ContainerError),
}

pub type ApplicationResult<T> = std::result::Result<T, ApplicationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_cause_unwraps_creation_chain() {
        let inner = ContainerError::from(ResolutionError::NoSuchBean("component9".to_string()));
        let err = ContainerError::BeanCreationFailed {
            name: "outer".to_string(),
            source: Box::new(ContainerError::BeanCreationFailed {
                name: "inner".to_string(),
                source: Box::new(inner),
            }),
        };

        assert_eq!(
            err.resolution_error(),
            Some(&ResolutionError::NoSuchBean("component9".to_string()))
        );
        assert!(err.to_string().contains("Error creating bean 'outer'"));
        assert!(err.to_string().contains("component9"));
    }

    #[test]
    fn test_not_unique_message_lists_candidates() {
        let err = ResolutionError::NotUnique {
            type_name: "dyn Capability".to_string(),
            point: "field 'component' of 'demoService'".to_string(),
            candidates: vec!["component1".to_string(), "component2".to_string()],
        };

        let message = err.to_string();
        assert!(message.contains("found 2: component1, component2"));
    }

    #[test]
    fn test_non_resolution_root_cause() {
        let err = ContainerError::CircularDependency("a -> b -> a".to_string());
        assert!(err.resolution_error().is_none());
    }
}
