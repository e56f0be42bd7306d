//! 迁移脚本存储
//!
//! 迁移引擎只需要两种能力：列出目录项、按路径读取字节。
//! [`DirectoryStore`] 对应文件系统目录，[`MemoryStore`] 用于测试与嵌入场景。

use parking_lot::RwLock;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// 存储中的一个目录项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEntry {
    pub file_name: String,
    pub is_dir: bool,
}

pub trait ScriptStore {
    /// 存储根位置，用于日志与错误信息
    fn root(&self) -> &Path;

    /// 列出根目录下的直接子项，不保证顺序
    fn list(&self) -> io::Result<Vec<StoreEntry>>;

    /// 由文件名得到可读取的路径
    fn locate(&self, file_name: &str) -> PathBuf;

    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// 文件系统目录
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ScriptStore for DirectoryStore {
    fn root(&self) -> &Path {
        &self.root
    }

    fn list(&self) -> io::Result<Vec<StoreEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            entries.push(StoreEntry {
                file_name: entry.file_name().to_string_lossy().into_owned(),
                is_dir: entry.file_type()?.is_dir(),
            });
        }
        Ok(entries)
    }

    fn locate(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    name: String,
    /// `None` 表示目录
    content: Option<Vec<u8>>,
}

/// 内存存储，按插入顺序列出
#[derive(Debug)]
pub struct MemoryStore {
    root: PathBuf,
    entries: RwLock<Vec<MemoryEntry>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("memory"),
            entries: RwLock::new(Vec::new()),
        }
    }

    /// 写入文件，同名文件直接覆盖内容（保持原位置）
    pub fn insert(&self, file_name: &str, content: impl Into<Vec<u8>>) {
        let content = Some(content.into());
        let mut entries = self.entries.write();
        match entries.iter_mut().find(|e| e.name == file_name) {
            Some(existing) => existing.content = content,
            None => entries.push(MemoryEntry {
                name: file_name.to_string(),
                content,
            }),
        }
    }

    pub fn insert_dir(&self, name: &str) {
        let mut entries = self.entries.write();
        if !entries.iter().any(|e| e.name == name) {
            entries.push(MemoryEntry {
                name: name.to_string(),
                content: None,
            });
        }
    }

    pub fn remove(&self, file_name: &str) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|e| e.name != file_name);
        entries.len() != before
    }
}

impl ScriptStore for MemoryStore {
    fn root(&self) -> &Path {
        &self.root
    }

    fn list(&self) -> io::Result<Vec<StoreEntry>> {
        Ok(self
            .entries
            .read()
            .iter()
            .map(|e| StoreEntry {
                file_name: e.name.clone(),
                is_dir: e.content.is_none(),
            })
            .collect())
    }

    fn locate(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let name = path
            .strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy();

        self.entries
            .read()
            .iter()
            .find(|e| e.name == name)
            .and_then(|e| e.content.clone())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} 不存在", path.display()),
                )
            })
    }
}
