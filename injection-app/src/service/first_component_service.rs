use std::sync::Arc;

use injection_macros::Component;

use super::{run_startup, Service, ServiceState};
use crate::component::Capability;

/// 字段注入：按类型注入，多个候选时按字段名匹配到 `firstComponent`
#[derive(Component)]
#[init("execute")]
pub struct FirstComponentService {
    #[autowired]
    first_component: Arc<dyn Capability>,

    state: ServiceState,
}

impl FirstComponentService {
    /// 启动回调
    pub fn execute(&mut self) {
        run_startup(self.first_component.as_ref(), &mut self.state);
    }
}

impl Service for FirstComponentService {
    fn component(&self) -> &Arc<dyn Capability> {
        &self.first_component
    }

    fn state(&self) -> ServiceState {
        self.state
    }
}
