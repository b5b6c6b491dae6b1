use std::sync::Arc;

use crate::{ApplicationContext, BeanDefinition, Container, ContainerResult, Scope};

/// Component注册函数类型
pub type ComponentRegistrar = fn(&Arc<ApplicationContext>) -> ContainerResult<()>;

/// Component注册表 - 用于inventory收集
pub struct ComponentRegistry {
    pub registrar: ComponentRegistrar,
    pub name: &'static str,
}

inventory::collect!(ComponentRegistry);

/// Component trait - 用于标记可以自动注册到容器的组件
///
/// 通常通过 #[derive(Component)] 宏实现，也可以手写以演示构造函数注入
///
/// # 示例
///
/// ```ignore
/// use injection_core::prelude::*;
/// use injection_macros::Component;
/// use std::sync::Arc;
///
/// #[derive(Component)]
/// #[init("execute")]
/// struct FirstComponentService {
///     #[autowired]
///     first_component: Arc<dyn Capability>,
/// }
/// ```
pub trait Component: Sized + Send + Sync + 'static {
    /// 获取 Bean 名称
    fn bean_name() -> &'static str;

    /// 获取作用域
    fn scope() -> Scope {
        Scope::Singleton
    }

    /// 是否延迟初始化
    fn lazy() -> bool {
        false
    }

    /// 多个候选时是否优先注入
    fn primary() -> bool {
        false
    }

    /// 按名称声明的依赖（限定名），用于启动前的依赖校验
    fn dependencies() -> Vec<String> {
        Vec::new()
    }

    /// 初始化回调（类似 @PostConstruct）
    ///
    /// 返回 None 表示没有初始化逻辑
    fn init_callback() -> Option<fn(&mut Self) -> ContainerResult<()>> {
        None
    }

    /// 声明额外可注入的 trait object 视图
    fn expose(definition: BeanDefinition) -> BeanDefinition {
        definition
    }

    /// 从容器创建实例，解析所有依赖
    fn create_from_context(context: &Arc<ApplicationContext>) -> ContainerResult<Self>;

    /// 注册到容器
    fn register(context: &Arc<ApplicationContext>) -> ContainerResult<()> {
        // 工厂只持有弱引用，避免上下文自身形成引用环
        let weak = Arc::downgrade(context);

        let mut definition = BeanDefinition::from_fn(Self::bean_name(), move || {
            let context = weak.upgrade().ok_or_else(|| {
                anyhow::anyhow!(
                    "ApplicationContext dropped before bean '{}' was created",
                    Self::bean_name()
                )
            })?;
            Self::create_from_context(&context)
        })
        .with_scope(Self::scope())
        .with_lazy(Self::lazy())
        .with_primary(Self::primary())
        .with_dependencies(Self::dependencies());

        if let Some(init_fn) = Self::init_callback() {
            definition = definition.with_typed_init(init_fn);
        }

        context.register(Self::expose(definition))
    }
}

/// 初始化回调的返回值，允许 `()` 或 `ContainerResult<()>`
pub trait IntoResult {
    fn into_result(self) -> ContainerResult<()>;
}

impl IntoResult for () {
    fn into_result(self) -> ContainerResult<()> {
        Ok(())
    }
}

impl IntoResult for ContainerResult<()> {
    fn into_result(self) -> ContainerResult<()> {
        self
    }
}

/// 配置类 - 显式声明一组 Bean（类似 @Configuration + @Bean）
pub trait Configuration: Send + Sync {
    /// 配置类名称，用于日志
    fn name(&self) -> &str;

    /// 注册该配置类声明的所有 Bean
    fn register_beans(&self, context: &Arc<ApplicationContext>) -> ContainerResult<()>;
}

impl ApplicationContext {
    /// 自动扫描并注册所有Component
    ///
    /// 注册顺序按 Bean 名称排序，保证启动顺序稳定
    pub fn scan_components(self: &Arc<Self>) -> ContainerResult<()> {
        tracing::info!("Starting component scan");

        let mut components: Vec<_> = inventory::iter::<ComponentRegistry>().collect();
        components.sort_by_key(|component| component.name);
        let total = components.len();

        if total == 0 {
            tracing::warn!("No components found to register");
            return Ok(());
        }

        tracing::debug!("Found {} component(s) to register", total);

        for (idx, component) in components.iter().enumerate() {
            tracing::debug!(
                "Registering component [{}/{}]: '{}'",
                idx + 1,
                total,
                component.name
            );

            (component.registrar)(self).map_err(|e| {
                tracing::error!("Failed to register component '{}': {}", component.name, e);
                e
            })?;
        }

        tracing::info!("Component scan completed, registered {} bean(s)", total);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ContainerError;

    trait Named: Send + Sync {
        fn label(&self) -> &'static str;
    }

    struct Widget;

    impl Named for Widget {
        fn label(&self) -> &'static str {
            "widget"
        }
    }

    impl Component for Widget {
        fn bean_name() -> &'static str {
            "widget"
        }

        fn primary() -> bool {
            true
        }

        fn expose(definition: BeanDefinition) -> BeanDefinition {
            definition.exposes::<Self, dyn Named>(|bean| bean)
        }

        fn create_from_context(_context: &Arc<ApplicationContext>) -> ContainerResult<Self> {
            Ok(Widget)
        }
    }

    struct Gadget;

    impl Named for Gadget {
        fn label(&self) -> &'static str {
            "gadget"
        }
    }

    struct Shop;

    impl Configuration for Shop {
        fn name(&self) -> &str {
            "shop"
        }

        fn register_beans(&self, context: &Arc<ApplicationContext>) -> ContainerResult<()> {
            context.register(
                BeanDefinition::from_fn("gadget", || Ok(Gadget))
                    .exposes::<Gadget, dyn Named>(|bean| bean),
            )
        }
    }

    #[test]
    fn test_component_registers_exposed_view_and_flags() {
        let context = Arc::new(ApplicationContext::new());
        context.register_configuration(&Shop).unwrap();
        context.register_component::<Widget>().unwrap();

        assert_eq!(context.get_bean_names(), vec!["gadget", "widget"]);

        // Widget 是 primary，类型查找时优先
        let named = context.get_bean_by_type::<dyn Named>().unwrap();
        assert_eq!(named.label(), "widget");

        let gadget = context.get_bean_of::<dyn Named>("gadget").unwrap();
        assert_eq!(gadget.label(), "gadget");
    }

    #[test]
    fn test_factory_fails_after_context_dropped() {
        let context = Arc::new(ApplicationContext::new());
        context.register_component::<Widget>().unwrap();

        let factory = Arc::clone(context.get_bean_factory());
        drop(context);

        let err = crate::BeanFactory::get_bean(factory.as_ref(), "widget").err().unwrap();
        assert!(matches!(err, ContainerError::BeanCreationFailed { .. }));
    }
}

#[cfg(test)]
mod derive_tests {
    use std::sync::Arc;

    use injection_macros::Component;

    use super::Component;
    use crate::bean_factory::ConfigurableBeanFactory;
    use crate::{ApplicationContext, Container, ContainerResult, Scope};

    trait Channel: Send + Sync {
        fn label(&self) -> &'static str;
    }

    trait Archive: Send + Sync {}

    #[derive(Component)]
    #[component("emailChannel")]
    #[provides(dyn Channel)]
    struct EmailChannel;

    impl Channel for EmailChannel {
        fn label(&self) -> &'static str {
            "email"
        }
    }

    #[derive(Component)]
    #[component(name = "smsChannel")]
    #[primary]
    #[provides(dyn Channel)]
    struct SmsChannel;

    impl Channel for SmsChannel {
        fn label(&self) -> &'static str {
            "sms"
        }
    }

    #[derive(Component)]
    struct Notifier {
        // 字段名对应 emailChannel，但 smsChannel 是 primary
        #[autowired]
        email_channel: Arc<dyn Channel>,

        #[qualifier("emailChannel")]
        audit: Arc<dyn Channel>,

        #[qualifier("pagerChannel")]
        pager: Option<Arc<dyn Channel>>,

        #[autowired]
        archive: Option<Arc<dyn Archive>>,

        sent: u32,
    }

    #[derive(Component)]
    #[scope("prototype")]
    #[init("open")]
    struct Draft {
        opened: bool,
    }

    impl Draft {
        fn open(&mut self) {
            self.opened = true;
        }
    }

    #[derive(Component)]
    #[lazy]
    #[init]
    struct ReportCache {
        warmed: bool,
    }

    impl ReportCache {
        fn init(&mut self) -> ContainerResult<()> {
            self.warmed = true;
            Ok(())
        }
    }

    fn context() -> Arc<ApplicationContext> {
        let context = Arc::new(ApplicationContext::new());
        context.register_component::<EmailChannel>().unwrap();
        context.register_component::<SmsChannel>().unwrap();
        context.register_component::<Notifier>().unwrap();
        context.register_component::<Draft>().unwrap();
        context.register_component::<ReportCache>().unwrap();
        context
    }

    #[test]
    fn test_bean_names_and_flags() {
        let context = context();

        assert_eq!(
            context.get_bean_names(),
            vec!["emailChannel", "smsChannel", "notifier", "draft", "reportCache"]
        );
        assert!(SmsChannel::primary());
        assert!(!EmailChannel::primary());
        assert_eq!(Draft::scope(), Scope::Prototype);
        assert_eq!(Notifier::scope(), Scope::Singleton);
        assert!(ReportCache::lazy());
    }

    #[test]
    fn test_primary_wins_over_field_name() {
        let context = context();

        let notifier = context.get_bean_by_type::<Notifier>().unwrap();
        assert_eq!(notifier.email_channel.label(), "sms");
        assert_eq!(notifier.sent, 0);
    }

    #[test]
    fn test_qualified_field_and_declared_dependencies() {
        let context = context();

        let notifier = context.get_bean_by_type::<Notifier>().unwrap();
        let email = context.get_bean_of::<dyn Channel>("emailChannel").unwrap();
        assert!(Arc::ptr_eq(&notifier.audit, &email));

        // 可选的限定名依赖不参与启动前校验
        assert_eq!(Notifier::dependencies(), vec!["emailChannel".to_string()]);
    }

    #[test]
    fn test_optional_fields_without_bean_are_none() {
        let context = context();

        context.validate_dependencies().unwrap();
        context.initialize().unwrap();

        let notifier = context.get_bean_by_type::<Notifier>().unwrap();
        assert!(notifier.pager.is_none());
        assert!(notifier.archive.is_none());
    }

    #[test]
    fn test_optional_qualified_field_is_injected_when_registered() {
        let context = context();
        context
            .register(
                crate::BeanDefinition::from_fn("pagerChannel", || Ok(EmailChannel))
                    .exposes::<EmailChannel, dyn Channel>(|bean| bean),
            )
            .unwrap();

        let notifier = context.get_bean_by_type::<Notifier>().unwrap();
        let pager = context.get_bean_of::<dyn Channel>("pagerChannel").unwrap();
        assert!(Arc::ptr_eq(notifier.pager.as_ref().unwrap(), &pager));
    }

    #[test]
    fn test_prototype_creates_fresh_instance_and_runs_hook_each_time() {
        let context = context();

        let first = context.get_bean_by_type::<Draft>().unwrap();
        let second = context.get_bean_by_type::<Draft>().unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert!(first.opened);
        assert!(second.opened);
    }

    #[test]
    fn test_lazy_bean_created_on_first_request() {
        let context = context();
        context.initialize().unwrap();

        let factory = context.get_bean_factory();
        assert!(factory.contains_singleton("notifier"));
        assert!(!factory.contains_singleton("draft"));
        assert!(!factory.contains_singleton("reportCache"));

        let cache = context.get_bean_by_type::<ReportCache>().unwrap();
        assert!(cache.warmed);
        assert!(factory.contains_singleton("reportCache"));
    }
}
