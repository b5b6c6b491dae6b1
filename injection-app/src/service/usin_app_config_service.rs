use std::sync::Arc;

use injection_core::prelude::*;
use injection_core::ComponentRegistry;

use super::{run_startup, Service, ServiceState};
use crate::component::Capability;
use crate::config::AppConfig;

/// 限定名注入：构造参数带限定名 `component1`
pub struct UsinAppConfigService {
    component: Arc<dyn Capability>,
    state: ServiceState,
}

impl UsinAppConfigService {
    pub fn new(component: Arc<dyn Capability>) -> Self {
        Self {
            component,
            state: ServiceState::Uninitialized,
        }
    }

    pub fn execute(&mut self) {
        run_startup(self.component.as_ref(), &mut self.state);
    }

    fn on_startup(&mut self) -> ContainerResult<()> {
        self.execute();
        Ok(())
    }
}

impl Component for UsinAppConfigService {
    fn bean_name() -> &'static str {
        "usinAppConfigService"
    }

    fn dependencies() -> Vec<String> {
        vec![AppConfig::COMPONENT1.to_string()]
    }

    fn init_callback() -> Option<fn(&mut Self) -> ContainerResult<()>> {
        Some(Self::on_startup)
    }

    fn create_from_context(context: &Arc<ApplicationContext>) -> ContainerResult<Self> {
        let component = context.resolve::<dyn Capability>(
            &InjectionPoint::parameter(Self::bean_name(), "component")
                .with_qualifier(AppConfig::COMPONENT1),
        )?;

        Ok(Self::new(component))
    }
}

inventory::submit! {
    ComponentRegistry {
        registrar: <UsinAppConfigService as Component>::register,
        name: "usinAppConfigService",
    }
}

impl Service for UsinAppConfigService {
    fn component(&self) -> &Arc<dyn Capability> {
        &self.component
    }

    fn state(&self) -> ServiceState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::fixtures::full_context;
    use crate::test_support::LogCapture;

    #[test]
    fn test_qualifier_selects_component1() {
        let context = full_context();
        context.register_component::<UsinAppConfigService>().unwrap();

        let (service, lines) = LogCapture::capture(|| {
            context.get_bean_by_type::<UsinAppConfigService>().unwrap()
        });

        let component1 = context.get_bean_of::<dyn Capability>("component1").unwrap();
        let first_component = context.get_bean_of::<dyn Capability>("firstComponent").unwrap();
        assert!(Arc::ptr_eq(service.component(), &component1));
        assert!(!Arc::ptr_eq(service.component(), &first_component));
        assert_eq!(lines, vec!["execute()", "First"]);
    }

    #[test]
    fn test_missing_qualified_bean_fails_validation_and_startup() {
        let context = Arc::new(ApplicationContext::new());
        context.register_component::<crate::component::FirstComponent>().unwrap();
        context.register_component::<UsinAppConfigService>().unwrap();

        let err = context.validate_dependencies().err().unwrap();
        assert!(matches!(err, ContainerError::DependencyValidationFailed(_)));

        let err = context.initialize().err().unwrap();
        assert_eq!(
            err.resolution_error(),
            Some(&ResolutionError::NoSuchBean("component1".to_string()))
        );
    }
}
