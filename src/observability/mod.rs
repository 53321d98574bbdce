//! 可观测性：tracing 订阅器初始化
//!
//! 默认 info 级别，`RUST_LOG` 可覆盖（如 `RUST_LOG=cab_sahayak=debug` 查看网关请求与响应）。

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 安装全局订阅器；重复调用时静默忽略
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init();
}
