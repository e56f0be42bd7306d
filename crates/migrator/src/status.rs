//! 迁移状态查询（只读）

use crate::checksum;
use crate::database::MigrationDatabase;
use crate::error::MigrationError;
use crate::ledger::{LedgerDao, MigrationRecord};
use crate::scanner;
use crate::store::ScriptStore;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptStatus {
    pub name: String,
    pub applied: bool,
    pub batch: Option<i64>,
    pub applied_at: Option<NaiveDateTime>,
    /// 已执行且内容与记录的校验和不一致
    pub drifted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub last_batch: i64,
    pub scripts: Vec<ScriptStatus>,
    /// 记录表中存在、但脚本文件已不存在的记录
    pub orphaned: Vec<MigrationRecord>,
}

impl StatusReport {
    pub fn pending(&self) -> impl Iterator<Item = &ScriptStatus> {
        self.scripts.iter().filter(|s| !s.applied)
    }

    pub fn pending_count(&self) -> usize {
        self.pending().count()
    }

    pub fn drifted(&self) -> impl Iterator<Item = &ScriptStatus> {
        self.scripts.iter().filter(|s| s.drifted)
    }
}

pub fn status<S: ScriptStore + ?Sized>(
    db: &MigrationDatabase,
    store: &S,
) -> Result<StatusReport, MigrationError> {
    let conn = db.connection();
    let scripts = scanner::scan(store)?;

    let mut records: HashMap<String, MigrationRecord> = LedgerDao::records(conn)?
        .into_iter()
        .map(|record| (record.name.clone(), record))
        .collect();

    let mut statuses = Vec::with_capacity(scripts.len());
    for script in &scripts {
        let status = match records.remove(&script.name) {
            Some(record) => {
                let drifted = checksum::checksum(&script.read(store)?) != record.checksum;
                ScriptStatus {
                    name: script.name.clone(),
                    applied: true,
                    batch: Some(record.batch),
                    applied_at: record.applied_at,
                    drifted,
                }
            }
            None => ScriptStatus {
                name: script.name.clone(),
                applied: false,
                batch: None,
                applied_at: None,
                drifted: false,
            },
        };
        statuses.push(status);
    }

    let mut orphaned: Vec<MigrationRecord> = records.into_values().collect();
    orphaned.sort_by_key(|record| record.id);

    if !orphaned.is_empty() {
        tracing::warn!("[迁移] 有 {} 条迁移记录找不到对应脚本", orphaned.len());
    }

    Ok(StatusReport {
        last_batch: LedgerDao::last_batch(conn)?,
        scripts: statuses,
        orphaned,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::apply;
    use crate::store::MemoryStore;

    #[test]
    fn test_status_reports_applied_pending_and_orphaned() {
        let mut db = MigrationDatabase::open_in_memory().unwrap();
        let store = MemoryStore::new();
        store.insert(
            "20240101000000_a.sql",
            "-- +migrate Up\nCREATE TABLE a (id INTEGER);\n-- +migrate Down\nDROP TABLE a;",
        );
        store.insert(
            "20240102000000_gone.sql",
            "-- +migrate Up\nCREATE TABLE g (id INTEGER);\n-- +migrate Down\nDROP TABLE g;",
        );
        apply(&mut db, &store).unwrap();

        store.remove("20240102000000_gone.sql");
        store.insert(
            "20240103000000_c.sql",
            "-- +migrate Up\nCREATE TABLE c (id INTEGER);\n-- +migrate Down\nDROP TABLE c;",
        );

        let report = status(&db, &store).unwrap();

        assert_eq!(report.last_batch, 1);
        assert_eq!(report.scripts.len(), 2);
        assert!(report.scripts[0].applied);
        assert_eq!(report.scripts[0].batch, Some(1));
        assert!(!report.scripts[0].drifted);
        assert_eq!(report.pending_count(), 1);
        assert_eq!(report.pending().next().unwrap().name, "20240103000000_c");
        assert_eq!(report.orphaned.len(), 1);
        assert_eq!(report.orphaned[0].name, "20240102000000_gone");
    }

    #[test]
    fn test_status_flags_drift() {
        let mut db = MigrationDatabase::open_in_memory().unwrap();
        let store = MemoryStore::new();
        store.insert(
            "20240101000000_a.sql",
            "-- +migrate Up\nCREATE TABLE a (id INTEGER);\n-- +migrate Down\nDROP TABLE a;",
        );
        apply(&mut db, &store).unwrap();

        store.insert(
            "20240101000000_a.sql",
            "-- +migrate Up\nCREATE TABLE a (id INTEGER, v TEXT);\n-- +migrate Down\nDROP TABLE a;",
        );

        let report = status(&db, &store).unwrap();
        assert_eq!(report.drifted().count(), 1);
    }
}
