use std::sync::Arc;

use injection_macros::Component;

use super::{run_startup, Service, ServiceState};
use crate::component::Capability;

/// 字段注入：字段名 `second_component` 匹配到 `secondComponent`
#[derive(Component)]
#[init("execute")]
pub struct SecondComponentService {
    #[autowired]
    second_component: Arc<dyn Capability>,

    state: ServiceState,
}

impl SecondComponentService {
    pub fn execute(&mut self) {
        run_startup(self.second_component.as_ref(), &mut self.state);
    }
}

impl Service for SecondComponentService {
    fn component(&self) -> &Arc<dyn Capability> {
        &self.second_component
    }

    fn state(&self) -> ServiceState {
        self.state
    }
}
