//! 配置相关错误类型
//!
//! 配置在进程启动时一次性构建并校验，任何缺失或非法的配置项都在这里报告，
//! 而不是推迟到第一次使用时。

use std::path::PathBuf;
use thiserror::Error;

/// 配置加载与校验错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 配置文件读取失败
    #[error("读取配置文件失败: {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 配置文件格式错误
    #[error("解析配置文件失败: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// 必填配置项缺失
    #[error("缺少必填配置项: {0}")]
    MissingKey(&'static str),

    /// 配置项取值非法
    #[error("配置项 {key} 无效: {reason}")]
    Invalid { key: &'static str, reason: String },
}
