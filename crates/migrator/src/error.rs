//! 迁移引擎错误类型
//!
//! 除 [`MigrationError::Commit`] 外，所有错误返回前都已回滚事务，
//! 数据库与迁移记录表保持调用前的状态。

use crate::blocks::{BlockError, BlockKind};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrationError {
    /// 无法列出迁移脚本目录
    #[error("扫描迁移目录失败: {}: {source}", .path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 无法读取迁移脚本内容
    #[error("读取迁移脚本 {name} 失败: {source}")]
    ReadScript {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// 已执行的脚本内容被修改
    #[error("迁移脚本 {name} 校验和不一致（记录: {expected}，当前: {actual}）")]
    Integrity {
        name: String,
        expected: String,
        actual: String,
    },

    /// Up 或 Down 区块缺失或为空
    #[error("迁移脚本 {name} 缺少 {block} 区块")]
    MissingBlock { name: String, block: BlockKind },

    /// 标记行重复或顺序错误
    #[error("迁移脚本 {name} 格式错误: {source}")]
    MalformedScript {
        name: String,
        #[source]
        source: BlockError,
    },

    /// SQL 执行失败
    #[error("执行迁移脚本 {name} 失败: {source}")]
    Execution {
        name: String,
        #[source]
        source: rusqlite::Error,
    },

    /// 已存在的迁移记录表结构不符合要求
    #[error("迁移记录表结构不兼容，缺少列: {}", .missing.join(", "))]
    LedgerSchema { missing: Vec<String> },

    /// 提交失败，最终状态不确定
    #[error("提交事务失败，数据库状态不确定，需要人工核查: {0}")]
    Commit(#[source] rusqlite::Error),

    /// 数据库错误
    #[error("数据库错误: {0}")]
    Database(#[from] rusqlite::Error),
}

impl MigrationError {
    pub(crate) fn from_block(name: &str, err: BlockError) -> Self {
        match err {
            BlockError::Missing(block) => MigrationError::MissingBlock {
                name: name.to_string(),
                block,
            },
            other => MigrationError::MalformedScript {
                name: name.to_string(),
                source: other,
            },
        }
    }

    /// 提交失败时数据库可能处于部分生效状态
    pub fn is_indeterminate(&self) -> bool {
        matches!(self, MigrationError::Commit(_))
    }

    /// 出错的脚本名称（如果错误与具体脚本相关）
    pub fn script_name(&self) -> Option<&str> {
        match self {
            MigrationError::ReadScript { name, .. }
            | MigrationError::Integrity { name, .. }
            | MigrationError::MissingBlock { name, .. }
            | MigrationError::MalformedScript { name, .. }
            | MigrationError::Execution { name, .. } => Some(name),
            _ => None,
        }
    }
}
