use std::sync::Arc;

use injection_core::prelude::*;

use crate::component::{Capability, FirstComponent, SecondComponent};

/// 显式声明两个具名能力实例（类似 @Configuration + @Bean）
///
/// - `component1` -> FirstComponent
/// - `component2` -> SecondComponent
#[derive(Debug, Default, Clone, Copy)]
pub struct AppConfig;

impl AppConfig {
    pub const COMPONENT1: &'static str = "component1";
    pub const COMPONENT2: &'static str = "component2";
}

impl Configuration for AppConfig {
    fn name(&self) -> &str {
        "appConfig"
    }

    fn register_beans(&self, context: &Arc<ApplicationContext>) -> ContainerResult<()> {
        context.register(
            BeanDefinition::from_fn(Self::COMPONENT1, || Ok(FirstComponent))
                .exposes::<FirstComponent, dyn Capability>(|bean| bean),
        )?;

        context.register(
            BeanDefinition::from_fn(Self::COMPONENT2, || Ok(SecondComponent))
                .exposes::<SecondComponent, dyn Capability>(|bean| bean),
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::LogCapture;

    fn context() -> Arc<ApplicationContext> {
        let context = Arc::new(ApplicationContext::new());
        context.register_configuration(&AppConfig).unwrap();
        context
    }

    #[test]
    fn test_named_components_resolve_to_their_variants() {
        let context = context();

        let (_, lines) = LogCapture::capture(|| {
            context
                .get_bean_of::<dyn Capability>(AppConfig::COMPONENT1)
                .unwrap()
                .execute();
            context
                .get_bean_of::<dyn Capability>(AppConfig::COMPONENT2)
                .unwrap()
                .execute();
        });

        assert_eq!(lines, vec!["First", "Second"]);
    }

    #[test]
    fn test_named_lookup_returns_the_same_instance() {
        let context = context();

        let first = context.get_bean_of::<dyn Capability>("component1").unwrap();
        let again = context.get_bean_of::<dyn Capability>("component1").unwrap();
        let concrete = context.get_bean_of::<FirstComponent>("component1").unwrap();

        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(
            Arc::as_ptr(&first) as *const u8,
            Arc::as_ptr(&concrete) as *const u8
        );
    }

    #[test]
    fn test_unregistered_name_is_a_resolution_error() {
        let context = context();

        let err = context.get_bean_of::<dyn Capability>("component3").err().unwrap();
        assert_eq!(
            err.resolution_error(),
            Some(&ResolutionError::NoSuchBean("component3".to_string()))
        );
    }

    #[test]
    fn test_registering_a_name_twice_fails() {
        let context = context();

        let err = context.register_configuration(&AppConfig).err().unwrap();
        assert!(matches!(err, ContainerError::BeanAlreadyExists(ref name) if name == "component1"));
    }
}
