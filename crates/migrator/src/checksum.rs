//! 迁移脚本校验和
//!
//! 对脚本原始字节计算 SHA-256，十六进制小写编码后存入迁移记录表。

use crate::error::MigrationError;
use crate::ledger::LedgerDao;
use crate::scanner::MigrationScript;
use crate::store::ScriptStore;
use rusqlite::Connection;
use sha2::{Digest, Sha256};

pub fn checksum(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

/// 校验所有已执行脚本的内容是否被修改
///
/// 未执行的脚本跳过，继续检查后续脚本；任一不一致立即返回
/// [`MigrationError::Integrity`]，此时尚未做任何写操作。
pub fn verify<S: ScriptStore + ?Sized>(
    conn: &Connection,
    store: &S,
    scripts: &[MigrationScript],
) -> Result<(), MigrationError> {
    let mut verified = 0usize;

    for script in scripts {
        let Some(expected) = LedgerDao::checksum_of(conn, &script.name)? else {
            continue;
        };

        let actual = checksum(&script.read(store)?);
        if actual != expected {
            tracing::error!("[迁移] 脚本 {} 的校验和与记录不一致", script.name);
            return Err(MigrationError::Integrity {
                name: script.name.clone(),
                expected,
                actual,
            });
        }
        verified += 1;
    }

    tracing::debug!("[迁移] 已校验 {} 个已执行脚本", verified);
    Ok(())
}
