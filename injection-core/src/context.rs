use std::any::{Any, TypeId};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::bean_factory::{
    BeanFactory, BeanFactoryExt, ConfigurableBeanFactory, ConfigurableListableBeanFactory,
    DefaultListableBeanFactory, ListableBeanFactory,
};
use crate::{
    bean::{BeanDefinition, SharedBean},
    component::{Component, Configuration},
    config::{Environment, PropertySource},
    error::{ContainerError, ContainerResult},
    injection_point::InjectionPoint,
    Scope,
};

/// 容器 trait - 定义依赖注入容器的核心接口
pub trait Container: Send + Sync {
    /// 注册 Bean 定义
    fn register(&self, definition: BeanDefinition) -> ContainerResult<()>;

    /// 通过名称获取 Bean
    fn get_bean(&self, name: &str) -> ContainerResult<SharedBean>;

    /// 通过名称获取指定类型（具体类型或暴露的 `dyn Trait`）的 Bean
    fn get_bean_of<I>(&self, name: &str) -> ContainerResult<Arc<I>>
    where
        I: ?Sized + Send + Sync + 'static;

    /// 通过类型获取唯一的 Bean
    fn get_bean_by_type<I>(&self) -> ContainerResult<Arc<I>>
    where
        I: ?Sized + Send + Sync + 'static;

    /// 为注入点解析依赖
    fn resolve<I>(&self, point: &InjectionPoint) -> ContainerResult<Arc<I>>
    where
        I: ?Sized + Send + Sync + 'static;

    /// 为可选注入点解析依赖
    fn resolve_optional<I>(&self, point: &InjectionPoint) -> ContainerResult<Option<Arc<I>>>
    where
        I: ?Sized + Send + Sync + 'static;

    /// 检查是否包含指定名称的 Bean
    fn contains_bean(&self, name: &str) -> bool;

    /// 检查是否包含指定类型的 Bean
    fn contains_bean_by_type<I>(&self) -> bool
    where
        I: ?Sized + Send + Sync + 'static;

    /// 获取所有 Bean 的名称（按注册顺序）
    fn get_bean_names(&self) -> Vec<String>;

    /// 获取可作为 `I` 注入的 Bean 名称（按注册顺序）
    fn get_bean_names_for_type<I>(&self) -> Vec<String>
    where
        I: ?Sized + 'static;
}

/// 应用上下文 - Container 的默认实现
///
/// 持有 BeanFactory 和 Environment
pub struct ApplicationContext {
    /// Bean 工厂 - 负责 Bean 的创建和管理
    bean_factory: Arc<DefaultListableBeanFactory>,

    /// 配置环境
    environment: Arc<Environment>,

    /// 应用名称
    app_name: RwLock<Option<String>>,
}

impl ApplicationContext {
    /// 创建新的应用上下文
    pub fn new() -> Self {
        Self::with_environment(Arc::new(Environment::new()))
    }

    /// 使用指定的 Environment 创建应用上下文
    pub fn with_environment(environment: Arc<Environment>) -> Self {
        Self {
            bean_factory: Arc::new(DefaultListableBeanFactory::new()),
            environment,
            app_name: RwLock::new(None),
        }
    }

    /// 构建器模式创建上下文
    pub fn builder() -> ApplicationContextBuilder {
        ApplicationContextBuilder::new()
    }

    /// 获取内部的 BeanFactory
    pub fn get_bean_factory(&self) -> &Arc<DefaultListableBeanFactory> {
        &self.bean_factory
    }

    /// 设置应用名称
    pub fn set_app_name(&self, name: impl Into<String>) {
        *self.app_name.write() = Some(name.into());
    }

    /// 获取应用名称
    pub fn get_app_name(&self) -> Option<String> {
        self.app_name.read().clone()
    }

    /// 获取 Environment
    pub fn environment(&self) -> &Arc<Environment> {
        &self.environment
    }

    /// 注册 Bean（默认单例）
    pub fn register_bean<T, F>(&self, name: impl Into<String>, factory: F) -> ContainerResult<()>
    where
        T: Any + Send + Sync,
        F: Fn() -> ContainerResult<T> + Send + Sync + 'static,
    {
        self.register(BeanDefinition::from_fn(name, factory))
    }

    /// 注册单例 Bean
    pub fn register_singleton<T, F>(&self, name: impl Into<String>, factory: F) -> ContainerResult<()>
    where
        T: Any + Send + Sync,
        F: Fn() -> ContainerResult<T> + Send + Sync + 'static,
    {
        self.register(BeanDefinition::from_fn(name, factory).with_scope(Scope::Singleton))
    }

    /// 注册原型 Bean
    pub fn register_prototype<T, F>(&self, name: impl Into<String>, factory: F) -> ContainerResult<()>
    where
        T: Any + Send + Sync,
        F: Fn() -> ContainerResult<T> + Send + Sync + 'static,
    {
        self.register(BeanDefinition::from_fn(name, factory).with_scope(Scope::Prototype))
    }

    /// 注册单个组件
    pub fn register_component<C: Component>(self: &Arc<Self>) -> ContainerResult<()> {
        C::register(self)
    }

    /// 应用一个配置类，注册它声明的所有 Bean
    pub fn register_configuration(
        self: &Arc<Self>,
        configuration: &dyn Configuration,
    ) -> ContainerResult<()> {
        tracing::debug!("Processing configuration '{}'", configuration.name());
        configuration.register_beans(self).map_err(|e| {
            tracing::error!(
                "Failed to process configuration '{}': {}",
                configuration.name(),
                e
            );
            e
        })
    }

    /// 验证所有 Bean 的按名称依赖
    ///
    /// 检查：
    /// - 缺失的依赖（声明的依赖没有注册）
    /// - 循环依赖（A -> B -> C -> A）
    pub fn validate_dependencies(&self) -> ContainerResult<()> {
        use crate::utils::dependency::validate_dependency_graph;

        let dependency_map = self.bean_factory.get_bean_definitions();
        let order = self.bean_factory.get_bean_names();

        validate_dependency_graph(&order, &dependency_map)
            .map_err(|e| ContainerError::DependencyValidationFailed(e.to_string()))?;

        tracing::debug!(
            "Dependency validation passed for {} bean(s)",
            dependency_map.len()
        );

        Ok(())
    }

    /// 初始化所有非延迟加载的单例 Bean，然后冻结配置
    ///
    /// 创建每个 Bean 时先解析依赖，再执行它的初始化回调
    pub fn initialize(&self) -> ContainerResult<()> {
        self.bean_factory.preinstantiate_singletons()?;
        self.bean_factory.freeze_configuration();
        Ok(())
    }

    /// 配置是否已冻结（初始化完成）
    pub fn is_active(&self) -> bool {
        self.bean_factory.is_configuration_frozen()
    }
}

impl Default for ApplicationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Container for ApplicationContext {
    fn register(&self, definition: BeanDefinition) -> ContainerResult<()> {
        self.bean_factory.register_bean_definition(definition)
    }

    fn get_bean(&self, name: &str) -> ContainerResult<SharedBean> {
        self.bean_factory.get_bean(name)
    }

    fn get_bean_of<I>(&self, name: &str) -> ContainerResult<Arc<I>>
    where
        I: ?Sized + Send + Sync + 'static,
    {
        self.bean_factory.get_bean_of::<I>(name)
    }

    fn get_bean_by_type<I>(&self) -> ContainerResult<Arc<I>>
    where
        I: ?Sized + Send + Sync + 'static,
    {
        self.bean_factory.get_bean_by_type::<I>()
    }

    fn resolve<I>(&self, point: &InjectionPoint) -> ContainerResult<Arc<I>>
    where
        I: ?Sized + Send + Sync + 'static,
    {
        self.bean_factory.resolve::<I>(point)
    }

    fn resolve_optional<I>(&self, point: &InjectionPoint) -> ContainerResult<Option<Arc<I>>>
    where
        I: ?Sized + Send + Sync + 'static,
    {
        self.bean_factory.resolve_optional::<I>(point)
    }

    fn contains_bean(&self, name: &str) -> bool {
        self.bean_factory.contains_bean(name)
    }

    fn contains_bean_by_type<I>(&self) -> bool
    where
        I: ?Sized + Send + Sync + 'static,
    {
        self.bean_factory.contains_bean_by_type::<I>()
    }

    fn get_bean_names(&self) -> Vec<String> {
        self.bean_factory.get_bean_names()
    }

    fn get_bean_names_for_type<I>(&self) -> Vec<String>
    where
        I: ?Sized + 'static,
    {
        ListableBeanFactory::get_bean_names_for_type(self.bean_factory.as_ref(), TypeId::of::<I>())
    }
}

/// 应用上下文构建器
pub struct ApplicationContextBuilder {
    environment: Arc<Environment>,
    definitions: Vec<BeanDefinition>,
    app_name: Option<String>,
}

impl ApplicationContextBuilder {
    pub fn new() -> Self {
        Self {
            environment: Arc::new(Environment::new()),
            definitions: Vec::new(),
            app_name: None,
        }
    }

    /// 使用已有的 Environment
    pub fn environment(mut self, environment: Arc<Environment>) -> Self {
        self.environment = environment;
        self
    }

    /// 添加配置源到 Environment
    pub fn add_property_source(self, source: Box<dyn PropertySource>) -> Self {
        self.environment.add_property_source(source);
        self
    }

    /// 设置激活的 profiles
    pub fn set_active_profiles(self, profiles: Vec<String>) -> Self {
        self.environment.set_active_profiles(profiles);
        self
    }

    /// 设置应用名称
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    /// 注册 Bean，构建时按顺序加入容器
    pub fn register(mut self, definition: BeanDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    /// 构建上下文
    pub fn build(self) -> ContainerResult<Arc<ApplicationContext>> {
        let context = ApplicationContext::with_environment(self.environment);

        if let Some(name) = self.app_name {
            context.set_app_name(name);
        }

        for definition in self.definitions {
            context.register(definition)?;
        }

        Ok(Arc::new(context))
    }
}

impl Default for ApplicationContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
