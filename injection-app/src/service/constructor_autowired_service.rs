use std::sync::Arc;

use injection_core::prelude::*;
use injection_core::ComponentRegistry;

use super::{run_startup, Service, ServiceState};
use crate::component::Capability;

/// 构造函数注入：手写构造函数，参数名 `second_component` 匹配到 `secondComponent`
pub struct ConstructorAutowiredService {
    component: Arc<dyn Capability>,
    state: ServiceState,
}

impl ConstructorAutowiredService {
    pub fn new(second_component: Arc<dyn Capability>) -> Self {
        Self {
            component: second_component,
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

impl Component for ConstructorAutowiredService {
    fn bean_name() -> &'static str {
        "constructorAutowiredService"
    }

    fn init_callback() -> Option<fn(&mut Self) -> ContainerResult<()>> {
        Some(Self::on_startup)
    }

    fn create_from_context(context: &Arc<ApplicationContext>) -> ContainerResult<Self> {
        let second_component = context.resolve::<dyn Capability>(&InjectionPoint::parameter(
            Self::bean_name(),
            "second_component",
        ))?;

        Ok(Self::new(second_component))
    }
}

inventory::submit! {
    ComponentRegistry {
        registrar: <ConstructorAutowiredService as Component>::register,
        name: "constructorAutowiredService",
    }
}

impl Service for ConstructorAutowiredService {
    fn component(&self) -> &Arc<dyn Capability> {
        &self.component
    }

    fn state(&self) -> ServiceState {
        self.state
    }
}
