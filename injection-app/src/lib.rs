//! 依赖注入方式演示
//!
//! 两个能力实现（`First` / `Second`），一个显式注册 `component1`/`component2`
//! 的配置类，以及五个按不同方式解析依赖的服务。

pub mod component;
pub mod config;
pub mod service;

use injection_core::InjectionApplication;

use crate::config::AppConfig;

/// 应用名称
pub const APP_NAME: &str = "injection-demo";

/// 构建演示应用：先注册配置类，再扫描组件
pub fn application() -> InjectionApplication {
    InjectionApplication::new(APP_NAME).configuration(AppConfig)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::fmt;
    use std::sync::Arc;

    use parking_lot::Mutex;
    use tracing::field::{Field, Visit};
    use tracing::{Event, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
    use tracing_subscriber::Registry;

    /// 记录本 crate 发出的日志消息
    #[derive(Clone, Default)]
    pub(crate) struct LogCapture {
        lines: Arc<Mutex<Vec<String>>>,
    }

    impl LogCapture {
        /// 在线程本地订阅者下运行 `f`，返回其结果和捕获到的消息
        pub(crate) fn capture<R>(f: impl FnOnce() -> R) -> (R, Vec<String>) {
            let capture = LogCapture::default();
            let subscriber = Registry::default().with(capture.clone());
            let result = tracing::subscriber::with_default(subscriber, f);
            let lines = capture.lines.lock().clone();
            (result, lines)
        }
    }

    struct MessageVisitor(Option<String>);

    impl Visit for MessageVisitor {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            if field.name() == "message" {
                self.0 = Some(format!("{:?}", value));
            }
        }
    }

    impl<S: Subscriber> Layer<S> for LogCapture {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if !event.metadata().target().starts_with("injection_app") {
                return;
            }

            let mut visitor = MessageVisitor(None);
            event.record(&mut visitor);
            if let Some(message) = visitor.0 {
                self.lines.lock().push(message);
            }
        }
    }
}
