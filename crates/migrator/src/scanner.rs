//! 迁移脚本扫描

use crate::error::MigrationError;
use crate::store::ScriptStore;
use serde::Serialize;
use std::path::PathBuf;

/// 迁移脚本后缀
pub const SCRIPT_SUFFIX: &str = ".sql";

/// 时间戳前缀长度（`YYYYMMDDHHMMSS`）
const TIMESTAMP_LEN: usize = 14;

/// 迁移脚本
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationScript {
    /// 去掉后缀的文件名，迁移记录表以此为键
    pub name: String,
    pub path: PathBuf,
}

impl MigrationScript {
    /// 由迁移记录中的名称还原脚本位置
    pub fn from_name<S: ScriptStore + ?Sized>(store: &S, name: &str) -> Self {
        Self {
            name: name.to_string(),
            path: store.locate(&format!("{name}{SCRIPT_SUFFIX}")),
        }
    }

    pub fn read<S: ScriptStore + ?Sized>(&self, store: &S) -> Result<Vec<u8>, MigrationError> {
        store
            .read(&self.path)
            .map_err(|source| MigrationError::ReadScript {
                name: self.name.clone(),
                source,
            })
    }
}

/// 扫描存储中的全部 `.sql` 脚本，按名称字典序返回
///
/// 目录与其他文件直接跳过。由于名称以时间戳开头，排序后即为创建顺序，
/// 与底层存储的列举顺序无关。
pub fn scan<S: ScriptStore + ?Sized>(store: &S) -> Result<Vec<MigrationScript>, MigrationError> {
    let entries = store.list().map_err(|source| MigrationError::Scan {
        path: store.root().to_path_buf(),
        source,
    })?;

    let mut scripts: Vec<MigrationScript> = entries
        .into_iter()
        .filter(|entry| !entry.is_dir)
        .filter_map(|entry| {
            let name = entry.file_name.strip_suffix(SCRIPT_SUFFIX)?;
            if name.is_empty() {
                return None;
            }
            if !has_timestamp_prefix(name) {
                tracing::warn!(
                    "[迁移] 脚本 {} 不符合 <时间戳>_<描述> 命名规范，排序可能不符合预期",
                    entry.file_name
                );
            }
            Some(MigrationScript {
                name: name.to_string(),
                path: store.locate(&entry.file_name),
            })
        })
        .collect();

    scripts.sort_by(|a, b| a.name.cmp(&b.name));

    tracing::debug!(
        "[迁移] 在 {} 中发现 {} 个迁移脚本",
        store.root().display(),
        scripts.len()
    );

    Ok(scripts)
}

fn has_timestamp_prefix(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() > TIMESTAMP_LEN
        && bytes[..TIMESTAMP_LEN].iter().all(u8::is_ascii_digit)
        && bytes[TIMESTAMP_LEN] == b'_'
}
