//! 批量执行迁移
//!
//! 流程：扫描 → 校验已执行脚本 → 计算待执行集合 → 单事务执行 → 提交。
//! 同一次调用内的脚本共享一个批次号；任一脚本失败则整个批次回滚。

use crate::blocks;
use crate::checksum;
use crate::database::{self, MigrationDatabase};
use crate::error::MigrationError;
use crate::ledger::LedgerDao;
use crate::scanner::{self, MigrationScript};
use crate::store::ScriptStore;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

/// 执行结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationReport {
    /// 本次写入的批次号，没有待执行脚本时为 `None`
    pub batch: Option<i64>,
    /// 按执行顺序排列的脚本名称
    pub applied: Vec<String>,
}

impl MigrationReport {
    pub fn count(&self) -> usize {
        self.applied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }
}

/// 执行所有待执行的迁移
pub fn apply<S: ScriptStore + ?Sized>(
    db: &mut MigrationDatabase,
    store: &S,
) -> Result<MigrationReport, MigrationError> {
    let scripts = scanner::scan(store)?;

    checksum::verify(db.connection(), store, &scripts)?;

    let pending = pending_scripts(db.connection(), scripts)?;
    if pending.is_empty() {
        tracing::info!("[迁移] 没有待执行的迁移");
        return Ok(MigrationReport::default());
    }

    tracing::info!("[迁移] 发现 {} 个待执行的迁移", pending.len());

    let tx = db.begin()?;
    let report = match apply_pending(&tx, store, &pending) {
        Ok(report) => report,
        Err(e) => {
            database::abort(tx, &e);
            return Err(e);
        }
    };

    tx.commit().map_err(|e| {
        tracing::error!("[迁移] 提交批次失败，请人工核查数据库状态: {}", e);
        MigrationError::Commit(e)
    })?;

    tracing::info!(
        "[迁移] 成功执行 {} 个迁移，批次 {}",
        report.count(),
        report.batch.unwrap_or_default()
    );

    Ok(report)
}

/// 未出现在迁移记录表中的脚本，保持扫描顺序
pub fn pending_scripts(
    conn: &Connection,
    scripts: Vec<MigrationScript>,
) -> Result<Vec<MigrationScript>, MigrationError> {
    let recorded = LedgerDao::recorded_names(conn)?;
    Ok(scripts
        .into_iter()
        .filter(|script| !recorded.contains(&script.name))
        .collect())
}

fn apply_pending<S: ScriptStore + ?Sized>(
    conn: &Connection,
    store: &S,
    pending: &[MigrationScript],
) -> Result<MigrationReport, MigrationError> {
    let batch = LedgerDao::last_batch(conn)? + 1;
    let mut applied = Vec::with_capacity(pending.len());

    for script in pending {
        tracing::info!("[迁移] 执行迁移: {}", script.name);

        let content = script.read(store)?;
        let checksum = checksum::checksum(&content);

        let sql = blocks::extract_apply(&String::from_utf8_lossy(&content))
            .map_err(|e| MigrationError::from_block(&script.name, e))?;

        conn.execute_batch(&sql)
            .map_err(|source| MigrationError::Execution {
                name: script.name.clone(),
                source,
            })?;

        LedgerDao::insert(conn, &script.name, batch, &checksum)?;
        tracing::info!("[迁移] 已完成: {}", script.name);

        applied.push(script.name.clone());
    }

    Ok(MigrationReport {
        batch: Some(batch),
        applied,
    })
}
