//! 启动上下文：按优先级合并配置并初始化日志
//!
//! 优先级从低到高：默认值 → 配置文件 → `.env` / 环境变量 → 命令行参数。

use crate::cli::GlobalArgs;
use anyhow::Context as _;
use sqlshift_core::logger::init_logging;
use sqlshift_core::Config;
use sqlshift_migrator::{DirectoryStore, MigrationDatabase, Migrator};
use sqlshift_scaffold::Scaffold;

#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: Config,
}

impl AppContext {
    /// 读取配置并完成校验，任何配置问题都会在执行命令前报出
    pub fn load<F>(args: &GlobalArgs, env: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::load(args.config.as_deref()).context("加载配置失败")?;
        config.apply_env_overrides(env);
        args.apply_to(&mut config);
        config.validate().context("配置校验失败")?;

        Ok(Self { config })
    }

    pub fn init_logging(&self) -> anyhow::Result<()> {
        init_logging(&self.config.logging).context("初始化日志失败")
    }

    pub fn open_database(&self) -> anyhow::Result<MigrationDatabase> {
        let path = self.config.database_path();
        tracing::debug!("[数据库] 打开数据库: {}", path.display());
        MigrationDatabase::open(&path)
            .with_context(|| format!("无法打开数据库 {}", path.display()))
    }

    pub fn migrator(&self) -> Migrator<DirectoryStore> {
        Migrator::new(DirectoryStore::new(self.config.migrations_dir()))
    }

    pub fn scaffold(&self) -> Scaffold {
        Scaffold::new(self.config.migrations_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlshift_core::config::{ENV_DATABASE, ENV_LOG_LEVEL};
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_cli_beats_env_beats_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("sqlshift.yaml");
        fs::write(
            &file,
            "database:\n  path: file.db\nmigrations:\n  directory: file_dir\nlogging:\n  level: warn\n",
        )
        .unwrap();

        let args = GlobalArgs {
            config: Some(file),
            database: Some("cli.db".to_string()),
            ..Default::default()
        };
        let ctx = AppContext::load(
            &args,
            env_of(&[(ENV_DATABASE, "env.db"), (ENV_LOG_LEVEL, "debug")]),
        )
        .unwrap();

        assert_eq!(ctx.config.database.path, "cli.db");
        assert_eq!(ctx.config.migrations.directory, "file_dir");
        assert_eq!(ctx.config.logging.level, "debug");
    }

    #[test]
    fn test_missing_database_path_fails_fast() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("empty.yaml");
        fs::write(&file, "migrations:\n  directory: db/migrations\n").unwrap();

        let args = GlobalArgs {
            config: Some(file),
            ..Default::default()
        };
        let err = AppContext::load(&args, env_of(&[])).unwrap_err();
        assert!(err.downcast_ref::<sqlshift_core::ConfigError>().is_some());
    }
}
