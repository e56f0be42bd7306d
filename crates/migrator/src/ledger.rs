//! 迁移记录表数据访问对象
//!
//! 所有写操作都在调用方提供的事务内执行（`Transaction` 可解引用为 `Connection`）。

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use std::collections::BTreeSet;

/// `executed_at` 可接受的格式，第一个对应 SQLite `CURRENT_TIMESTAMP`
const EXECUTED_AT_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// 迁移记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationRecord {
    pub id: i64,
    pub name: String,
    pub batch: i64,
    pub checksum: String,
    /// `executed_at` 为 NULL 或无法识别时为 `None`
    pub applied_at: Option<NaiveDateTime>,
}

pub struct LedgerDao;

impl LedgerDao {
    /// 所有已执行脚本名称
    pub fn recorded_names(conn: &Connection) -> Result<BTreeSet<String>, rusqlite::Error> {
        let mut stmt = conn.prepare("SELECT name FROM migrations")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(names)
    }

    /// 最大批次号，记录表为空时返回 0
    pub fn last_batch(conn: &Connection) -> Result<i64, rusqlite::Error> {
        conn.query_row(
            "SELECT COALESCE(MAX(batch), 0) FROM migrations",
            [],
            |row| row.get(0),
        )
    }

    /// 写入迁移记录，返回新记录 ID
    pub fn insert(
        conn: &Connection,
        name: &str,
        batch: i64,
        checksum: &str,
    ) -> Result<i64, rusqlite::Error> {
        conn.execute(
            "INSERT INTO migrations (name, batch, checksum) VALUES (?1, ?2, ?3)",
            params![name, batch, checksum],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 删除迁移记录，返回删除行数
    pub fn delete(conn: &Connection, name: &str) -> Result<usize, rusqlite::Error> {
        conn.execute("DELETE FROM migrations WHERE name = ?1", params![name])
    }

    /// 指定批次的记录，按执行顺序排列
    pub fn records_for_batch(
        conn: &Connection,
        batch: i64,
    ) -> Result<Vec<MigrationRecord>, rusqlite::Error> {
        let mut stmt = conn.prepare(
            "SELECT id, name, batch, checksum, executed_at
             FROM migrations WHERE batch = ?1 ORDER BY id ASC",
        )?;
        let records = stmt
            .query_map(params![batch], map_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// 指定批次的脚本名称，按执行顺序排列，回滚只依赖这一列
    pub fn names_for_batch(
        conn: &Connection,
        batch: i64,
    ) -> Result<Vec<String>, rusqlite::Error> {
        let mut stmt =
            conn.prepare("SELECT name FROM migrations WHERE batch = ?1 ORDER BY id ASC")?;
        let names = stmt
            .query_map(params![batch], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    pub fn records(conn: &Connection) -> Result<Vec<MigrationRecord>, rusqlite::Error> {
        let mut stmt = conn.prepare(
            "SELECT id, name, batch, checksum, executed_at FROM migrations ORDER BY id ASC",
        )?;
        let records = stmt
            .query_map([], map_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    pub fn checksum_of(conn: &Connection, name: &str) -> Result<Option<String>, rusqlite::Error> {
        conn.query_row(
            "SELECT checksum FROM migrations WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()
    }

    pub fn count(conn: &Connection) -> Result<i64, rusqlite::Error> {
        conn.query_row("SELECT COUNT(*) FROM migrations", [], |row| row.get(0))
    }
}

fn map_record(row: &Row<'_>) -> Result<MigrationRecord, rusqlite::Error> {
    let name: String = row.get(1)?;
    let executed_at: Option<String> = row.get(4)?;
    let applied_at = executed_at.as_deref().and_then(|raw| {
        let parsed = parse_executed_at(raw);
        if parsed.is_none() {
            tracing::warn!("[迁移] 无法解析 {} 的执行时间: {}", name, raw);
        }
        parsed
    });

    Ok(MigrationRecord {
        id: row.get(0)?,
        name,
        batch: row.get(2)?,
        checksum: row.get(3)?,
        applied_at,
    })
}

fn parse_executed_at(raw: &str) -> Option<NaiveDateTime> {
    EXECUTED_AT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw.trim(), format).ok())
}
