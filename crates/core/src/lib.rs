//! 核心类型和工具模块
//!
//! 包含 config, errors, logger 等基础功能，供迁移引擎与命令行共享。

pub mod config;
pub mod errors;
pub mod logger;

pub use config::{Config, DatabaseConfig, LoggingConfig, MigrationsConfig};
pub use errors::ConfigError;
