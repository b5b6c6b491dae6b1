use injection_macros::Component;

use super::Capability;

/// 输出 `First` 的实现，以 `firstComponent` 注册
#[derive(Component, Debug, Default)]
#[provides(dyn Capability)]
pub struct FirstComponent;

impl Capability for FirstComponent {
    fn execute(&self) {
        tracing::info!("First");
    }
}
