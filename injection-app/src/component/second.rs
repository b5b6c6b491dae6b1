use injection_macros::Component;

use super::Capability;

/// 输出 `Second` 的实现，以 `secondComponent` 注册
#[derive(Component, Debug, Default)]
#[provides(dyn Capability)]
pub struct SecondComponent;

impl Capability for SecondComponent {
    fn execute(&self) {
        tracing::info!("Second");
    }
}
