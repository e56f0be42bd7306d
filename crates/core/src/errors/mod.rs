//! 错误类型模块
//!
//! ## 模块结构
//! - `config_error`: 配置加载与校验错误（ConfigError）

pub mod config_error;

pub use config_error::ConfigError;
