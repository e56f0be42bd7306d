//! 迁移脚本脚手架
//!
//! 在迁移目录下生成 `<YYYYMMDDHHMMSS>_<name>.sql` 文件。

pub mod error;
pub mod template;

pub use error::ScaffoldError;

use chrono::{Local, NaiveDateTime};
use regex::Regex;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::sync::OnceLock;

pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

const NAME_PATTERN: &str = r"^[a-z0-9]+(_[a-z0-9]+)*$";

fn name_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(NAME_PATTERN).ok()).as_ref()
}

/// 规范化迁移名称：空白替换为下划线后校验 snake_case
pub fn normalize_name(input: &str) -> Result<String, ScaffoldError> {
    let name = input.split_whitespace().collect::<Vec<_>>().join("_");

    if name_pattern().is_some_and(|re| re.is_match(&name)) {
        Ok(name)
    } else {
        Err(ScaffoldError::InvalidName(input.to_string()))
    }
}

pub fn file_name(at: NaiveDateTime, name: &str) -> String {
    format!("{}_{}.sql", at.format(TIMESTAMP_FORMAT), name)
}

/// 迁移脚本生成器
#[derive(Debug, Clone)]
pub struct Scaffold {
    dir: PathBuf,
}

impl Scaffold {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 以当前本地时间生成迁移脚本，返回文件路径
    pub fn create(&self, input: &str) -> Result<PathBuf, ScaffoldError> {
        self.create_at(input, Local::now().naive_local())
    }

    pub fn create_at(&self, input: &str, at: NaiveDateTime) -> Result<PathBuf, ScaffoldError> {
        let name = normalize_name(input)?;

        fs::create_dir_all(&self.dir).map_err(|source| ScaffoldError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.dir.join(file_name(at, &name));

        // create_new 保证不会覆盖已有文件
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|source| match source.kind() {
                ErrorKind::AlreadyExists => ScaffoldError::AlreadyExists(path.clone()),
                _ => ScaffoldError::Io {
                    path: path.clone(),
                    source,
                },
            })?;

        file.write_all(template::render(&name).as_bytes())
            .map_err(|source| ScaffoldError::Io {
                path: path.clone(),
                source,
            })?;

        tracing::info!("[脚手架] 已创建迁移文件: {}", path.display());
        Ok(path)
    }
}
