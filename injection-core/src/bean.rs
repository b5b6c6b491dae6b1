use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::{ContainerError, ContainerResult, Scope};

/// 容器中共享的 Bean 实例
pub type SharedBean = Arc<dyn Any + Send + Sync>;

/// 实例工厂 trait - 用于创建 Bean 实例
pub trait InstanceFactory: Send + Sync {
    /// 创建 Bean 实例
    fn create(&self) -> ContainerResult<Box<dyn Any + Send + Sync>>;

    /// 获取 Bean 的类型 ID
    fn bean_type_id(&self) -> TypeId;

    /// 获取 Bean 的类型名称
    fn type_name(&self) -> &'static str;

    /// 将共享实例包装为 `Box<Arc<T>>`（T 为工厂产出的具体类型）
    fn wrap(&self, bean: SharedBean) -> Option<Box<dyn Any + Send + Sync>>;
}

/// 生命周期回调类型（@PostConstruct）
pub type InitCallback = Box<dyn Fn(&mut dyn Any) -> ContainerResult<()> + Send + Sync>;

type ViewCaster = Box<dyn Fn(SharedBean) -> Option<Box<dyn Any + Send + Sync>> + Send + Sync>;

/// Bean 对外暴露的 trait object 视图
struct ExposedType {
    type_name: &'static str,
    cast: ViewCaster,
}

/// Bean 定义 - 描述如何创建和管理 Bean
pub struct BeanDefinition {
    /// Bean 的名称
    pub name: String,

    /// Bean 的作用域
    pub scope: Scope,

    /// 实例工厂
    pub factory: Box<dyn InstanceFactory>,

    /// 是否延迟初始化（仅对单例有效）
    pub lazy: bool,

    /// 多个候选时是否优先注入（@Primary）
    pub primary: bool,

    /// 按名称声明的依赖（用于静态依赖校验）
    pub dependencies: Vec<String>,

    /// 初始化回调（@PostConstruct）
    pub init_callback: Option<InitCallback>,

    exposed: HashMap<TypeId, ExposedType>,
}

impl BeanDefinition {
    /// 创建新的 Bean 定义
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: InstanceFactory + 'static,
    {
        Self {
            name: name.into(),
            scope: Scope::default(),
            factory: Box::new(factory),
            lazy: false,
            primary: false,
            dependencies: Vec::new(),
            init_callback: None,
            exposed: HashMap::new(),
        }
    }

    /// 使用工厂函数创建 Bean 定义
    pub fn from_fn<T, F>(name: impl Into<String>, factory_fn: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn() -> ContainerResult<T> + Send + Sync + 'static,
    {
        Self::new(name, FunctionFactory::new(factory_fn))
    }

    /// 设置作用域
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// 设置延迟初始化
    pub fn with_lazy(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }

    /// 标记为首选候选
    pub fn with_primary(mut self, primary: bool) -> Self {
        self.primary = primary;
        self
    }

    /// 设置依赖列表
    pub fn with_dependencies(mut self, dependencies: Vec<String>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// 设置初始化回调
    pub fn with_init<F>(mut self, init_fn: F) -> Self
    where
        F: Fn(&mut dyn Any) -> ContainerResult<()> + Send + Sync + 'static,
    {
        self.init_callback = Some(Box::new(init_fn));
        self
    }

    /// 设置带类型的初始化回调，内部完成向下转型
    pub fn with_typed_init<T>(self, init_fn: fn(&mut T) -> ContainerResult<()>) -> Self
    where
        T: Any + Send + Sync,
    {
        let bean_name = self.name.clone();
        self.with_init(move |bean: &mut dyn Any| match bean.downcast_mut::<T>() {
            Some(typed_bean) => init_fn(typed_bean),
            None => Err(ContainerError::Other(anyhow::anyhow!(
                "Failed to downcast bean '{}' to '{}' in init callback",
                bean_name,
                std::any::type_name::<T>()
            ))),
        })
    }

    /// 声明该 Bean 可以作为 `Arc<I>` 注入
    ///
    /// ```ignore
    /// BeanDefinition::from_fn("component1", || Ok(FirstComponent))
    ///     .exposes::<FirstComponent, dyn Capability>(|bean| bean);
    /// ```
    pub fn exposes<T, I>(mut self, cast: fn(Arc<T>) -> Arc<I>) -> Self
    where
        T: Any + Send + Sync,
        I: ?Sized + Send + Sync + 'static,
    {
        let caster: ViewCaster = Box::new(move |bean: SharedBean| {
            bean.downcast::<T>()
                .ok()
                .map(|typed| Box::new(cast(typed)) as Box<dyn Any + Send + Sync>)
        });

        self.exposed.insert(
            TypeId::of::<I>(),
            ExposedType {
                type_name: std::any::type_name::<I>(),
                cast: caster,
            },
        );
        self
    }

    /// 具体类型名称
    pub fn type_name(&self) -> &'static str {
        self.factory.type_name()
    }

    /// 是否能以指定类型注入（具体类型或暴露的 trait object）
    pub fn matches_type(&self, type_id: TypeId) -> bool {
        self.factory.bean_type_id() == type_id || self.exposed.contains_key(&type_id)
    }

    /// 暴露的 trait object 类型名称
    pub fn exposed_type_names(&self) -> Vec<&'static str> {
        self.exposed.values().map(|e| e.type_name).collect()
    }

    /// 把共享实例转换为 `Arc<I>`
    pub(crate) fn view<I>(&self, bean: SharedBean) -> Option<Arc<I>>
    where
        I: ?Sized + Send + Sync + 'static,
    {
        let target = TypeId::of::<I>();

        let boxed = if target == self.factory.bean_type_id() {
            self.factory.wrap(bean)?
        } else {
            (self.exposed.get(&target)?.cast)(bean)?
        };

        boxed.downcast::<Arc<I>>().ok().map(|typed| *typed)
    }
}

impl fmt::Debug for BeanDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanDefinition")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .field("lazy", &self.lazy)
            .field("primary", &self.primary)
            .field("dependencies", &self.dependencies)
            .field("type_name", &self.factory.type_name())
            .field("exposed", &self.exposed_type_names())
            .finish()
    }
}

/// 简单的函数工厂实现
pub struct FunctionFactory<T, F>
where
    T: Any + Send + Sync,
    F: Fn() -> ContainerResult<T> + Send + Sync,
{
    factory_fn: F,
    _phantom: std::marker::PhantomData<fn() -> T>,
}

impl<T, F> FunctionFactory<T, F>
where
    T: Any + Send + Sync,
    F: Fn() -> ContainerResult<T> + Send + Sync,
{
    pub fn new(factory_fn: F) -> Self {
        Self {
            factory_fn,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T, F> InstanceFactory for FunctionFactory<T, F>
where
    T: Any + Send + Sync,
    F: Fn() -> ContainerResult<T> + Send + Sync,
{
    fn create(&self) -> ContainerResult<Box<dyn Any + Send + Sync>> {
        let instance = (self.factory_fn)()?;
        Ok(Box::new(instance))
    }

    fn bean_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn wrap(&self, bean: SharedBean) -> Option<Box<dyn Any + Send + Sync>> {
        bean.downcast::<T>()
            .ok()
            .map(|typed| Box::new(typed) as Box<dyn Any + Send + Sync>)
    }
}
