//! 注入点描述
//!
//! 描述一次依赖解析发生的位置：哪个 Bean 的哪个字段或构造参数，
//! 是否带有限定名（@Qualifier）。解析失败时用于生成错误信息。

use std::fmt;

/// 注入点类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionKind {
    /// 字段注入（#[autowired]）
    Field,
    /// 构造参数注入
    Parameter,
    /// 直接按类型查找
    Lookup,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionPoint {
    kind: InjectionKind,
    owner: String,
    name: Option<String>,
    qualifier: Option<String>,
}

impl InjectionPoint {
    /// `owner` 的字段 `name`
    pub fn field(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: InjectionKind::Field,
            owner: owner.into(),
            name: Some(name.into()),
            qualifier: None,
        }
    }

    /// `owner` 构造函数的参数 `name`
    pub fn parameter(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: InjectionKind::Parameter,
            owner: owner.into(),
            name: Some(name.into()),
            qualifier: None,
        }
    }

    /// 没有名称的类型查找，不做名称回退
    pub fn lookup() -> Self {
        Self {
            kind: InjectionKind::Lookup,
            owner: String::new(),
            name: None,
            qualifier: None,
        }
    }

    /// 指定限定名，按名称解析
    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    pub fn kind(&self) -> InjectionKind {
        self.kind
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }
}

impl fmt::Display for InjectionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, self.name.as_deref()) {
            (InjectionKind::Field, Some(name)) => {
                write!(f, "field '{}' of bean '{}'", name, self.owner)?
            }
            (InjectionKind::Parameter, Some(name)) => {
                write!(f, "constructor parameter '{}' of bean '{}'", name, self.owner)?
            }
            _ => write!(f, "type lookup")?,
        }
        if let Some(qualifier) = &self.qualifier {
            write!(f, " (qualifier '{}')", qualifier)?;
        }
        Ok(())
    }
}
