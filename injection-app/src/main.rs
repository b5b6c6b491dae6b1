use std::path::Path;

use anyhow::Context;
use injection_core::prelude::*;

fn main() -> anyhow::Result<()> {
    // 从工作区根目录或 crate 目录运行都能找到配置文件
    let config_file = ["injection-app/application.toml", "application.toml"]
        .into_iter()
        .find(|path| Path::new(path).exists())
        .unwrap_or("application.toml");

    let context = injection_app::application()
        .config_file(config_file)
        .run()
        .context("Application failed to start")?;

    let bean_names = context.get_bean_names();
    tracing::info!("{} bean(s) ready: {}", bean_names.len(), bean_names.join(", "));

    Ok(())
}
