// injection-core: 类似 Spring 的依赖注入容器
//
// 提供类型安全的依赖注入功能，支持：
// - 单例和原型作用域
// - 按类型、按名称（限定名）和按字段名回退的依赖解析
// - trait object 注入（通过暴露的类型视图）
// - 启动回调与确定性的预实例化顺序

// 派生宏生成的 `::injection_core::...` 路径在本 crate 内也能解析
extern crate self as injection_core;

pub mod app;
pub mod bean;
pub mod bean_factory;
pub mod component;
pub mod config;
pub mod context;
pub mod error;
pub mod injection_point;
pub mod logging;
pub mod scope;
pub mod utils;

// 重新导出常用类型
pub use app::InjectionApplication;
pub use bean::{BeanDefinition, FunctionFactory, InstanceFactory, SharedBean};
pub use bean_factory::{
    BeanFactory, BeanFactoryExt, ConfigurableBeanFactory, ConfigurableListableBeanFactory,
    DefaultListableBeanFactory, ListableBeanFactory,
};
pub use component::{
    Component, ComponentRegistrar, ComponentRegistry, Configuration, IntoResult,
};
pub use config::{
    ConfigValue, Environment, EnvironmentPropertySource, MapPropertySource, PropertySource,
    TomlPropertySource,
};
pub use context::{ApplicationContext, ApplicationContextBuilder, Container};
pub use error::{
    ApplicationError, ApplicationResult, ContainerError, ContainerResult, ResolutionError,
};
pub use injection_point::{InjectionKind, InjectionPoint};
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use scope::Scope;

// 导出 inventory，供宏使用
pub use inventory;

/// Prelude 模块，包含常用的 traits 和类型
pub mod prelude {
    pub use crate::app::InjectionApplication;
    pub use crate::bean::BeanDefinition;
    pub use crate::bean_factory::{BeanFactory, BeanFactoryExt, ListableBeanFactory};
    pub use crate::component::{Component, Configuration};
    pub use crate::config::{ConfigValue, Environment, PropertySource};
    pub use crate::context::{ApplicationContext, Container};
    pub use crate::error::{
        ApplicationError, ApplicationResult, ContainerError, ContainerResult, ResolutionError,
    };
    pub use crate::injection_point::InjectionPoint;
    pub use crate::logging::{LogFormat, LogLevel, LoggingConfig};
    pub use crate::scope::Scope;
    pub use crate::utils;
}
