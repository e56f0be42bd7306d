//! 配置管理模块
//!
//! 配置来源按优先级从低到高：
//! 1. 内置默认值
//! 2. YAML 配置文件（默认 `sqlshift.yaml`）
//! 3. 环境变量（`SQLSHIFT_*`，命令行入口会先加载 `.env`）
//! 4. 命令行参数（由调用方直接写入字段）
//!
//! 构建完成后必须调用 [`Config::validate`]，之后以引用形式传给各组件。

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "sqlshift.yaml";

/// 数据库路径环境变量
pub const ENV_DATABASE: &str = "SQLSHIFT_DATABASE";
/// 迁移脚本目录环境变量
pub const ENV_MIGRATIONS_DIR: &str = "SQLSHIFT_MIGRATIONS_DIR";
/// 日志级别环境变量
pub const ENV_LOG_LEVEL: &str = "SQLSHIFT_LOG_LEVEL";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub migrations: MigrationsConfig,
    pub logging: LoggingConfig,
}

/// 数据库连接配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite 数据库文件路径（必填）
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationsConfig {
    /// 迁移脚本所在目录
    pub directory: String,
}

impl Default for MigrationsConfig {
    fn default() -> Self {
        Self {
            directory: "db/migrations".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` 过滤指令，例如 `info` 或 `sqlshift_migrator=debug`
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// 从 YAML 文本解析配置
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// 加载配置文件
    ///
    /// 显式指定的文件必须存在；未指定时尝试当前目录下的 `sqlshift.yaml`，
    /// 不存在则使用默认值。
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !required && !path.exists() {
            tracing::debug!("[配置] 未找到 {}，使用默认配置", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;

        tracing::debug!("[配置] 已加载配置文件: {}", path.display());
        Self::from_yaml_str(&content)
    }

    /// 使用环境变量覆盖配置
    ///
    /// `lookup` 通常是 `|key| std::env::var(key).ok()`，空字符串视为未设置。
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(path) = lookup(ENV_DATABASE) {
            self.database.path = path;
        }
        if let Some(dir) = lookup(ENV_MIGRATIONS_DIR) {
            self.migrations.directory = dir;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
    }

    /// 校验必填项与取值
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.path.trim().is_empty() {
            return Err(ConfigError::MissingKey("database.path"));
        }

        if self.migrations.directory.trim().is_empty() {
            return Err(ConfigError::MissingKey("migrations.directory"));
        }

        if let Err(e) = EnvFilter::try_new(&self.logging.level) {
            return Err(ConfigError::Invalid {
                key: "logging.level",
                reason: e.to_string(),
            });
        }

        Ok(())
    }

    pub fn migrations_dir(&self) -> PathBuf {
        PathBuf::from(&self.migrations.directory)
    }

    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.database.path)
    }
}
