//! 回滚最近一个批次
//!
//! 批次内的脚本按执行顺序的逆序执行 Down 区块，后执行的脚本先回滚，
//! 这样依赖前序脚本（例如外键）的对象总是先被移除。

use crate::blocks;
use crate::database::{self, MigrationDatabase};
use crate::error::MigrationError;
use crate::ledger::LedgerDao;
use crate::scanner::MigrationScript;
use crate::store::ScriptStore;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackReport {
    /// 被回滚的批次号，没有可回滚的批次时为 `None`
    pub batch: Option<i64>,
    /// 按回滚顺序排列的脚本名称
    pub reverted: Vec<String>,
}

impl RollbackReport {
    pub fn count(&self) -> usize {
        self.reverted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reverted.is_empty()
    }
}

/// 回滚最近一个批次的全部迁移
///
/// 记录表为空时直接返回空结果，不开启事务。
pub fn rollback<S: ScriptStore + ?Sized>(
    db: &mut MigrationDatabase,
    store: &S,
) -> Result<RollbackReport, MigrationError> {
    let batch = LedgerDao::last_batch(db.connection())?;
    if batch == 0 {
        tracing::info!("[回滚] 没有可回滚的迁移");
        return Ok(RollbackReport::default());
    }

    let scripts: Vec<MigrationScript> = LedgerDao::names_for_batch(db.connection(), batch)?
        .iter()
        .rev()
        .map(|name| MigrationScript::from_name(store, name))
        .collect();

    tracing::info!("[回滚] 回滚批次 {}，共 {} 个迁移", batch, scripts.len());

    let tx = db.begin()?;
    let reverted = match revert_scripts(&tx, store, &scripts) {
        Ok(reverted) => reverted,
        Err(e) => {
            database::abort(tx, &e);
            return Err(e);
        }
    };

    tx.commit().map_err(|e| {
        tracing::error!("[回滚] 提交回滚失败，请人工核查数据库状态: {}", e);
        MigrationError::Commit(e)
    })?;

    tracing::info!("[回滚] 成功回滚 {} 个迁移", reverted.len());

    Ok(RollbackReport {
        batch: Some(batch),
        reverted,
    })
}

fn revert_scripts<S: ScriptStore + ?Sized>(
    conn: &Connection,
    store: &S,
    scripts: &[MigrationScript],
) -> Result<Vec<String>, MigrationError> {
    let mut reverted = Vec::with_capacity(scripts.len());

    for script in scripts {
        tracing::info!("[回滚] 回滚迁移: {}", script.name);

        let content = script.read(store)?;
        let sql = blocks::extract_revert(&String::from_utf8_lossy(&content))
            .map_err(|e| MigrationError::from_block(&script.name, e))?;

        conn.execute_batch(&sql)
            .map_err(|source| MigrationError::Execution {
                name: script.name.clone(),
                source,
            })?;

        LedgerDao::delete(conn, &script.name)?;
        tracing::info!("[回滚] 已回滚: {}", script.name);

        reverted.push(script.name.clone());
    }

    Ok(reverted)
}
