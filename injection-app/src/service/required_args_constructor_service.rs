use std::sync::Arc;

use injection_macros::Component;

use super::{run_startup, Service, ServiceState};
use crate::component::Capability;

/// 派生构造函数注入：`#[required_args]` 由依赖字段生成 `new(first_component)`
#[derive(Component)]
#[required_args]
#[init("execute")]
pub struct RequiredArgsConstructorService {
    first_component: Arc<dyn Capability>,
    state: ServiceState,
}

impl RequiredArgsConstructorService {
    pub fn execute(&mut self) {
        run_startup(self.first_component.as_ref(), &mut self.state);
    }
}

impl Service for RequiredArgsConstructorService {
    fn component(&self) -> &Arc<dyn Capability> {
        &self.first_component
    }

    fn state(&self) -> ServiceState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::FirstComponent;
    use crate::service::fixtures::full_context;
    use crate::test_support::LogCapture;
    use injection_core::prelude::*;

    #[test]
    fn test_derived_constructor_selects_first_component() {
        let context = full_context();
        context.register_component::<RequiredArgsConstructorService>().unwrap();

        let (service, lines) = LogCapture::capture(|| {
            context.get_bean_by_type::<RequiredArgsConstructorService>().unwrap()
        });

        let expected = context.get_bean_of::<dyn Capability>("firstComponent").unwrap();
        assert!(Arc::ptr_eq(service.component(), &expected));
        assert_eq!(service.state(), ServiceState::Ready);
        assert_eq!(lines, vec!["execute()", "First"]);
    }

    #[test]
    fn test_generated_constructor() {
        let component: Arc<dyn Capability> = Arc::new(FirstComponent);
        let service = RequiredArgsConstructorService::new(Arc::clone(&component));

        assert!(Arc::ptr_eq(service.component(), &component));
        assert_eq!(service.state(), ServiceState::Uninitialized);
    }
}
