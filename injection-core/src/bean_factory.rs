//! Bean Factory - 核心容器接口
//!
//! 参考 Spring 的 BeanFactory 架构设计：定义存储、单例缓存、
//! 按名称/按类型的依赖解析都在这里完成。

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::{
    bean::{BeanDefinition, SharedBean},
    error::{ContainerError, ContainerResult, ResolutionError},
    injection_point::InjectionPoint,
    utils::{dependency::CreationTracker, naming},
};

/// BeanFactory - 最基础的容器接口
///
/// 注意：此 trait 不包含泛型方法，因此可以作为 trait object 使用
pub trait BeanFactory: Send + Sync {
    /// 通过名称获取 Bean
    fn get_bean(&self, name: &str) -> ContainerResult<SharedBean>;

    /// 检查是否包含指定名称的 Bean
    fn contains_bean(&self, name: &str) -> bool;
}

/// BeanFactoryExt - BeanFactory 的扩展 trait
///
/// 提供泛型方法，不能作为 trait object 使用。
/// `I` 既可以是具体类型，也可以是 Bean 暴露的 `dyn Trait`。
pub trait BeanFactoryExt: BeanFactory {
    /// 通过名称获取指定类型的 Bean
    fn get_bean_of<I>(&self, name: &str) -> ContainerResult<Arc<I>>
    where
        I: ?Sized + Send + Sync + 'static;

    /// 通过类型获取唯一的 Bean（不做名称回退）
    fn get_bean_by_type<I>(&self) -> ContainerResult<Arc<I>>
    where
        I: ?Sized + Send + Sync + 'static;

    /// 为注入点解析依赖
    fn resolve<I>(&self, point: &InjectionPoint) -> ContainerResult<Arc<I>>
    where
        I: ?Sized + Send + Sync + 'static;

    /// 为可选注入点解析依赖，没有候选时返回 `None`
    fn resolve_optional<I>(&self, point: &InjectionPoint) -> ContainerResult<Option<Arc<I>>>
    where
        I: ?Sized + Send + Sync + 'static;

    /// 检查是否包含指定类型的 Bean
    fn contains_bean_by_type<I>(&self) -> bool
    where
        I: ?Sized + Send + Sync + 'static;
}

/// ListableBeanFactory - 可列举的 Bean 工厂
pub trait ListableBeanFactory: BeanFactory {
    /// 获取所有 Bean 的名称（按注册顺序）
    fn get_bean_names(&self) -> Vec<String>;

    /// 获取能以指定类型注入的所有 Bean 名称（按注册顺序）
    fn get_bean_names_for_type(&self, type_id: TypeId) -> Vec<String>;

    /// 获取 Bean 定义的数量
    fn get_bean_definition_count(&self) -> usize;
}

/// ConfigurableBeanFactory - 可配置的 Bean 工厂
pub trait ConfigurableBeanFactory: BeanFactory {
    /// 注册 Bean 定义
    fn register_bean_definition(&self, definition: BeanDefinition) -> ContainerResult<()>;

    /// 检查是否包含指定的 Bean 定义
    fn contains_bean_definition(&self, name: &str) -> bool;

    /// 单例是否已经创建并缓存
    fn contains_singleton(&self, name: &str) -> bool;
}

/// ConfigurableListableBeanFactory - 可配置且可列举的 Bean 工厂
pub trait ConfigurableListableBeanFactory: ListableBeanFactory + ConfigurableBeanFactory {
    /// 按注册顺序预实例化所有非延迟单例 Bean
    fn preinstantiate_singletons(&self) -> ContainerResult<()>;

    /// 冻结配置（不再允许注册 Bean 定义）
    fn freeze_configuration(&self);

    /// 检查配置是否已冻结
    fn is_configuration_frozen(&self) -> bool;

    /// 获取所有 Bean 声明的按名称依赖（用于依赖验证）
    fn get_bean_definitions(&self) -> HashMap<String, Vec<String>>;
}

/// 定义存储，名称表与注册顺序放在同一把锁下
#[derive(Default)]
struct DefinitionRegistry {
    definitions: HashMap<String, Arc<BeanDefinition>>,
    order: Vec<String>,
}

/// DefaultListableBeanFactory - ConfigurableListableBeanFactory 的默认实现
///
/// 创建 Bean 时不持有锁。两个线程同时请求同一个尚未创建的单例时，工厂和初始化回调
/// 可能各执行一次，但缓存只保留先写入的实例。启动流程是单线程的，不会出现这种情况。
pub struct DefaultListableBeanFactory {
    /// Bean 定义存储
    registry: RwLock<DefinitionRegistry>,

    /// 单例 Bean 缓存
    singletons: RwLock<HashMap<String, SharedBean>>,

    /// 循环依赖检测
    creation_tracker: CreationTracker,

    /// 配置是否已冻结
    configuration_frozen: RwLock<bool>,
}

impl DefaultListableBeanFactory {
    /// 创建新的 Bean 工厂
    pub fn new() -> Self {
        Self {
            registry: RwLock::new(DefinitionRegistry::default()),
            singletons: RwLock::new(HashMap::new()),
            creation_tracker: CreationTracker::new(),
            configuration_frozen: RwLock::new(false),
        }
    }

    /// 取出定义的共享引用，调用方不持有锁
    fn get_definition(&self, name: &str) -> ContainerResult<Arc<BeanDefinition>> {
        self.registry
            .read()
            .definitions
            .get(name)
            .cloned()
            .ok_or_else(|| {
                tracing::debug!("Bean '{}' not found in container", name);
                ResolutionError::NoSuchBean(name.to_string()).into()
            })
    }

    /// 按注册顺序列出能以指定类型注入的 Bean，附带 primary 标记
    fn candidates_for(&self, type_id: TypeId) -> Vec<(String, bool)> {
        let registry = self.registry.read();
        registry
            .order
            .iter()
            .filter_map(|name| {
                registry
                    .definitions
                    .get(name)
                    .filter(|def| def.matches_type(type_id))
                    .map(|def| (name.clone(), def.primary))
            })
            .collect()
    }

    /// 确定注入点对应的 Bean 名称
    ///
    /// 解析规则：
    /// 1. 有限定名时直接按名称查找
    /// 2. 只有一个候选时直接使用
    /// 3. 多个候选时，唯一的 primary 候选胜出
    /// 4. 否则用注入点名称（字段名/参数名）匹配 Bean 名称
    fn determine_candidate(
        &self,
        type_id: TypeId,
        type_name: &str,
        point: &InjectionPoint,
    ) -> ContainerResult<Option<String>> {
        if let Some(qualifier) = point.qualifier() {
            let definition = self.get_definition(qualifier)?;
            if !definition.matches_type(type_id) {
                return Err(ResolutionError::TypeMismatch {
                    name: qualifier.to_string(),
                    expected: type_name.to_string(),
                }
                .into());
            }
            return Ok(Some(qualifier.to_string()));
        }

        let candidates = self.candidates_for(type_id);
        if candidates.len() <= 1 {
            return Ok(candidates.into_iter().next().map(|(name, _)| name));
        }

        let primaries: Vec<String> = candidates
            .iter()
            .filter(|(_, primary)| *primary)
            .map(|(name, _)| name.clone())
            .collect();

        match primaries.len() {
            1 => return Ok(primaries.into_iter().next()),
            0 => {}
            _ => {
                return Err(ResolutionError::NotUnique {
                    type_name: type_name.to_string(),
                    point: point.to_string(),
                    candidates: primaries,
                }
                .into())
            }
        }

        if let Some(point_name) = point.name() {
            if let Some((name, _)) = candidates
                .iter()
                .find(|(name, _)| naming::matches_bean_name(point_name, name))
            {
                tracing::trace!("{} matched candidate '{}' by name", point, name);
                return Ok(Some(name.clone()));
            }
        }

        Err(ResolutionError::NotUnique {
            type_name: type_name.to_string(),
            point: point.to_string(),
            candidates: candidates.into_iter().map(|(name, _)| name).collect(),
        }
        .into())
    }

    /// 按解析规则找到 Bean 并取出 `I` 视图，没有候选时返回 `None`
    fn lookup<I>(&self, point: &InjectionPoint) -> ContainerResult<Option<Arc<I>>>
    where
        I: ?Sized + Send + Sync + 'static,
    {
        let type_name = std::any::type_name::<I>();

        match self.determine_candidate(TypeId::of::<I>(), type_name, point)? {
            Some(name) => {
                tracing::debug!("Resolved {} to bean '{}'", point, name);
                self.get_bean_of::<I>(&name).map(Some)
            }
            None => {
                tracing::debug!("No bean of type '{}' for {}", type_name, point);
                Ok(None)
            }
        }
    }

    /// 创建 Bean 实例并调用初始化回调
    ///
    /// 生命周期顺序：
    /// 1. 实例化（工厂函数，依赖在其中解析）
    /// 2. 初始化回调（@PostConstruct）
    /// 3. 交给调用方（缓存或直接返回）
    fn create_bean_internal(
        &self,
        name: &str,
        definition: &BeanDefinition,
    ) -> ContainerResult<SharedBean> {
        if !self.creation_tracker.start_creating(name) {
            let mut chain = self.creation_tracker.current_creating();
            chain.push(name.to_string());
            return Err(ContainerError::CircularDependency(chain.join(" -> ")));
        }

        // 使用 RAII 模式确保在任何情况下都会清理标记
        struct CreationGuard<'a> {
            tracker: &'a CreationTracker,
            name: &'a str,
        }

        impl Drop for CreationGuard<'_> {
            fn drop(&mut self) {
                self.tracker.finish_creating(self.name);
            }
        }

        let _guard = CreationGuard {
            tracker: &self.creation_tracker,
            name,
        };

        let mut instance = definition.factory.create().map_err(|e| match e {
            // 保留循环依赖错误，不要包装它
            ContainerError::CircularDependency(_) => e,
            _ => ContainerError::BeanCreationFailed {
                name: name.to_string(),
                source: Box::new(e),
            },
        })?;

        if let Some(init_fn) = &definition.init_callback {
            tracing::debug!("Invoking init callback on bean '{}'", name);
            init_fn(&mut *instance).map_err(|e| ContainerError::BeanCreationFailed {
                name: name.to_string(),
                source: Box::new(e),
            })?;
        }

        Ok(Arc::from(instance))
    }
}

impl Default for DefaultListableBeanFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl BeanFactory for DefaultListableBeanFactory {
    fn get_bean(&self, name: &str) -> ContainerResult<SharedBean> {
        tracing::trace!("Requesting bean: '{}'", name);

        let definition = self.get_definition(name)?;

        if !definition.scope.is_singleton() {
            tracing::debug!("Creating new instance of prototype bean '{}'", name);
            return self.create_bean_internal(name, &definition);
        }

        if let Some(bean) = self.singletons.read().get(name) {
            tracing::trace!("Returning cached instance of singleton bean '{}'", name);
            return Ok(Arc::clone(bean));
        }

        tracing::debug!("Creating shared instance of singleton bean '{}'", name);
        let bean = self.create_bean_internal(name, &definition)?;

        // 并发创建时先写入缓存的实例胜出，所有调用方拿到同一个实例
        let cached = self
            .singletons
            .write()
            .entry(name.to_string())
            .or_insert(bean)
            .clone();

        Ok(cached)
    }

    fn contains_bean(&self, name: &str) -> bool {
        self.registry.read().definitions.contains_key(name)
    }
}

impl BeanFactoryExt for DefaultListableBeanFactory {
    fn get_bean_of<I>(&self, name: &str) -> ContainerResult<Arc<I>>
    where
        I: ?Sized + Send + Sync + 'static,
    {
        let type_mismatch = || ResolutionError::TypeMismatch {
            name: name.to_string(),
            expected: std::any::type_name::<I>().to_string(),
        };

        let definition = self.get_definition(name)?;
        if !definition.matches_type(TypeId::of::<I>()) {
            return Err(type_mismatch().into());
        }

        let bean = self.get_bean(name)?;
        definition
            .view::<I>(bean)
            .ok_or_else(|| type_mismatch().into())
    }

    fn get_bean_by_type<I>(&self) -> ContainerResult<Arc<I>>
    where
        I: ?Sized + Send + Sync + 'static,
    {
        self.resolve::<I>(&InjectionPoint::lookup())
    }

    fn resolve<I>(&self, point: &InjectionPoint) -> ContainerResult<Arc<I>>
    where
        I: ?Sized + Send + Sync + 'static,
    {
        match self.lookup::<I>(point)? {
            Some(bean) => Ok(bean),
            None => Err(ResolutionError::NoCandidate {
                type_name: std::any::type_name::<I>().to_string(),
                point: point.to_string(),
            }
            .into()),
        }
    }

    fn resolve_optional<I>(&self, point: &InjectionPoint) -> ContainerResult<Option<Arc<I>>>
    where
        I: ?Sized + Send + Sync + 'static,
    {
        // 可选注入点的限定名未注册时视为没有候选，类型不符仍然报错
        if let Some(qualifier) = point.qualifier() {
            if !self.contains_bean(qualifier) {
                tracing::debug!("Optional {} left empty, no bean named '{}'", point, qualifier);
                return Ok(None);
            }
        }

        self.lookup::<I>(point)
    }

    fn contains_bean_by_type<I>(&self) -> bool
    where
        I: ?Sized + Send + Sync + 'static,
    {
        !self.candidates_for(TypeId::of::<I>()).is_empty()
    }
}

impl ListableBeanFactory for DefaultListableBeanFactory {
    fn get_bean_names(&self) -> Vec<String> {
        self.registry.read().order.clone()
    }

    fn get_bean_names_for_type(&self, type_id: TypeId) -> Vec<String> {
        self.candidates_for(type_id)
            .into_iter()
            .map(|(name, _)| name)
            .collect()
    }

    fn get_bean_definition_count(&self) -> usize {
        self.registry.read().definitions.len()
    }
}

impl ConfigurableBeanFactory for DefaultListableBeanFactory {
    fn register_bean_definition(&self, definition: BeanDefinition) -> ContainerResult<()> {
        if self.is_configuration_frozen() {
            return Err(ContainerError::ConfigurationFrozen(format!(
                "register bean definition '{}'",
                definition.name
            )));
        }

        let name = definition.name.clone();
        tracing::trace!(
            "Attempting to register bean: name='{}', type='{}', scope={}",
            name,
            definition.type_name(),
            definition.scope
        );

        let mut registry = self.registry.write();
        if registry.definitions.contains_key(&name) {
            tracing::warn!("Bean '{}' already exists, registration failed", name);
            return Err(ContainerError::BeanAlreadyExists(name));
        }

        registry.definitions.insert(name.clone(), Arc::new(definition));
        registry.order.push(name.clone());

        tracing::debug!("Bean definition registered successfully: '{}'", name);
        Ok(())
    }

    fn contains_bean_definition(&self, name: &str) -> bool {
        self.contains_bean(name)
    }

    fn contains_singleton(&self, name: &str) -> bool {
        self.singletons.read().contains_key(name)
    }
}

impl ConfigurableListableBeanFactory for DefaultListableBeanFactory {
    fn preinstantiate_singletons(&self) -> ContainerResult<()> {
        let bean_names: Vec<String> = {
            let registry = self.registry.read();
            registry
                .order
                .iter()
                .filter(|name| {
                    registry
                        .definitions
                        .get(*name)
                        .is_some_and(|def| def.scope.is_singleton() && !def.lazy)
                })
                .cloned()
                .collect()
        };

        tracing::debug!("Pre-instantiating {} singleton beans", bean_names.len());

        for name in bean_names {
            self.get_bean(&name)?;
        }

        Ok(())
    }

    fn freeze_configuration(&self) {
        *self.configuration_frozen.write() = true;
        tracing::debug!("Bean factory configuration frozen");
    }

    fn is_configuration_frozen(&self) -> bool {
        *self.configuration_frozen.read()
    }

    fn get_bean_definitions(&self) -> HashMap<String, Vec<String>> {
        self.registry
            .read()
            .definitions
            .iter()
            .map(|(name, definition)| (name.clone(), definition.dependencies.clone()))
            .collect()
    }
}
