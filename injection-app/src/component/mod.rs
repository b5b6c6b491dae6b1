//! 能力接口及其两个实现

mod first;
mod second;

pub use first::FirstComponent;
pub use second::SecondComponent;

/// 能力接口：执行时输出一行固定日志
pub trait Capability: Send + Sync {
    fn execute(&self);
}
