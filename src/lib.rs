//! sqlshift 命令行入口库
//!
//! 解析参数、合并配置、初始化日志后分发到各子命令。

pub mod cli;
pub mod commands;
pub mod context;

pub use cli::{Cli, Commands, GlobalArgs};
pub use context::AppContext;

/// 执行一次命令行调用
pub fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = AppContext::load(&cli.global, |key| std::env::var(key).ok())?;
    ctx.init_logging()?;

    tracing::debug!(
        "[配置] database={}, migrations={}",
        ctx.config.database.path,
        ctx.config.migrations.directory
    );

    commands::dispatch(&ctx, &cli.command)
}
