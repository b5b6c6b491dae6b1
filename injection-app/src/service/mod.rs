//! 五种依赖解析方式的服务
//!
//! 每个服务只持有一个能力实例的共享引用，启动回调里先输出 `execute()`，
//! 再调用所持能力的 `execute()`。

mod constructor_autowired_service;
mod first_component_service;
mod required_args_constructor_service;
mod second_component_service;
mod usin_app_config_service;

use std::sync::Arc;

pub use constructor_autowired_service::ConstructorAutowiredService;
pub use first_component_service::FirstComponentService;
pub use required_args_constructor_service::RequiredArgsConstructorService;
pub use second_component_service::SecondComponentService;
pub use usin_app_config_service::UsinAppConfigService;

use crate::component::Capability;

/// 服务状态：构造完成后为 Uninitialized，启动回调执行后为 Ready
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceState {
    #[default]
    Uninitialized,
    Ready,
}

/// 服务的公共视图
pub trait Service: Send + Sync {
    /// 解析得到的能力实例
    fn component(&self) -> &Arc<dyn Capability>;

    fn state(&self) -> ServiceState;
}

/// 启动回调的公共部分
fn run_startup(component: &dyn Capability, state: &mut ServiceState) {
    tracing::info!("execute()");
    component.execute();
    *state = ServiceState::Ready;
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::Arc;

    use injection_core::prelude::*;

    use crate::component::{FirstComponent, SecondComponent};
    use crate::config::AppConfig;

    /// `component1`、`component2`、`firstComponent`、`secondComponent` 四个候选
    pub(crate) fn full_context() -> Arc<ApplicationContext> {
        let context = Arc::new(ApplicationContext::new());
        context.register_configuration(&AppConfig).unwrap();
        context.register_component::<FirstComponent>().unwrap();
        context.register_component::<SecondComponent>().unwrap();
        context
    }
}
