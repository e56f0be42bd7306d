//! 日志初始化模块
//!
//! 库 crate 只通过 `tracing` 宏输出日志，订阅者只在可执行入口安装一次。

use crate::config::LoggingConfig;
use crate::errors::ConfigError;
use tracing_subscriber::EnvFilter;

/// 安装全局 `fmt` 订阅者
///
/// 设置了 `RUST_LOG` 时以其为准，否则使用配置中的过滤指令。
/// 若全局订阅者已经存在（例如测试中重复初始化），直接跳过。
pub fn init_logging(config: &LoggingConfig) -> Result<(), ConfigError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| ConfigError::Invalid {
            key: "logging.level",
            reason: e.to_string(),
        })?,
    };

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok();

    if !installed {
        tracing::debug!("[日志] 全局订阅者已存在，跳过初始化");
    }

    Ok(())
}
