//! 命令行参数定义

use clap::{Args, Parser, Subcommand};
use sqlshift_core::Config;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "sqlshift",
    version,
    about = "带校验和与批次回滚的 SQL 结构迁移工具",
    after_help = "Examples:\n  \
    sqlshift create:migration create users table\n  \
    sqlshift migrate\n  \
    sqlshift migrate:status --json\n  \
    sqlshift migrate:rollback"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// 所有子命令共享的参数，优先级高于配置文件与环境变量
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// 配置文件路径（默认读取当前目录下的 sqlshift.yaml）
    #[arg(long, global = true, env = "SQLSHIFT_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// SQLite 数据库文件路径
    #[arg(long, global = true, value_name = "PATH")]
    pub database: Option<String>,

    /// 迁移脚本目录
    #[arg(long, global = true, value_name = "DIR")]
    pub migrations_dir: Option<String>,

    /// 日志过滤规则，例如 `info` 或 `sqlshift=debug`
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_level: Option<String>,
}

impl GlobalArgs {
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(path) = &self.database {
            config.database.path = path.clone();
        }
        if let Some(dir) = &self.migrations_dir {
            config.migrations.directory = dir.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 执行所有待执行的迁移
    #[command(name = "migrate")]
    Migrate,

    /// 回滚最近一个批次
    #[command(name = "migrate:rollback")]
    Rollback,

    /// 查看迁移状态
    #[command(name = "migrate:status")]
    Status {
        /// 以 JSON 输出
        #[arg(long)]
        json: bool,
    },

    /// 生成新的迁移脚本
    #[command(name = "create:migration")]
    CreateMigration {
        /// 迁移名称，多个单词以下划线连接
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
}
