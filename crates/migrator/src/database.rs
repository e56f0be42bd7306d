//! 迁移数据库连接
//!
//! [`MigrationDatabase`] 是获取迁移引擎可用连接的唯一入口：构造时确认
//! 迁移记录表存在（不存在则创建），之后无需任何全局标志。

use crate::error::MigrationError;
use rusqlite::{params, Connection, Transaction};
use std::collections::HashSet;
use std::path::Path;

/// 迁移记录表名
pub const LEDGER_TABLE: &str = "migrations";

/// 迁移记录表必须具备的列
const LEDGER_COLUMNS: [&str; 5] = ["id", "name", "batch", "checksum", "executed_at"];

const CREATE_LEDGER_SQL: &str = "CREATE TABLE IF NOT EXISTS migrations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    batch INTEGER NOT NULL,
    checksum TEXT NOT NULL,
    executed_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)";

#[derive(Debug)]
pub struct MigrationDatabase {
    conn: Connection,
}

impl MigrationDatabase {
    /// 打开（或创建）数据库文件
    pub fn open(path: impl AsRef<Path>) -> Result<Self, MigrationError> {
        let path = path.as_ref();
        tracing::debug!("[迁移] 打开数据库: {}", path.display());
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, MigrationError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// 接管已有连接并确保迁移记录表存在
    pub fn from_connection(conn: Connection) -> Result<Self, MigrationError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        ensure_ledger(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub(crate) fn begin(&mut self) -> Result<Transaction<'_>, MigrationError> {
        Ok(self.conn.transaction()?)
    }

    pub fn into_inner(self) -> Connection {
        self.conn
    }
}

fn ledger_exists(conn: &Connection) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
        params![LEDGER_TABLE],
        |row| row.get(0),
    )
}

fn ledger_columns(conn: &Connection) -> rusqlite::Result<HashSet<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
    let columns = stmt
        .query_map(params![LEDGER_TABLE], |row| row.get::<_, String>(0))?
        .collect::<Result<HashSet<_>, _>>()?;
    Ok(columns)
}

/// 不存在则创建；已存在则确认列齐全，同名的业务表不会被当作迁移记录表使用
fn ensure_ledger(conn: &Connection) -> Result<(), MigrationError> {
    if ledger_exists(conn)? {
        let columns = ledger_columns(conn)?;
        let missing: Vec<String> = LEDGER_COLUMNS
            .iter()
            .filter(|column| !columns.contains(**column))
            .map(|column| column.to_string())
            .collect();

        if !missing.is_empty() {
            tracing::error!(
                "[迁移] 已存在的 {} 表缺少列: {}",
                LEDGER_TABLE,
                missing.join(", ")
            );
            return Err(MigrationError::LedgerSchema { missing });
        }
        return Ok(());
    }

    tracing::info!("[迁移] 创建迁移记录表 {}", LEDGER_TABLE);
    conn.execute_batch(CREATE_LEDGER_SQL)?;
    tracing::info!("[迁移] 迁移记录表创建完成");
    Ok(())
}

/// 放弃事务，返回前调用
pub(crate) fn abort(tx: Transaction<'_>, cause: &MigrationError) {
    match tx.rollback() {
        Ok(()) => tracing::warn!("[迁移] 已回滚事务: {}", cause),
        Err(e) => tracing::error!("[迁移] 回滚事务失败: {} (原因: {})", e, cause),
    }
}
