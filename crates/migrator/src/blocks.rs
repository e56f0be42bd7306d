//! 迁移脚本区块解析
//!
//! 每个脚本包含一个 Up 区块和一个 Down 区块：
//!
//! ```sql
//! -- +migrate Up
//! CREATE TABLE users (id INTEGER PRIMARY KEY);
//! -- +migrate Down
//! DROP TABLE users;
//! ```
//!
//! Up 标记之前的内容忽略；两个标记之间为 Up 区块；Down 标记之后直到文件末尾为
//! Down 区块。标记行按去除首尾空白后的内容精确匹配。
//! 标记重复出现或 Down 出现在 Up 之前都视为格式错误，不会被静默并入区块。

use std::fmt;
use thiserror::Error;

/// Up 区块标记
pub const APPLY_MARKER: &str = "-- +migrate Up";
/// Down 区块标记
pub const REVERT_MARKER: &str = "-- +migrate Down";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Apply,
    Revert,
}

impl BlockKind {
    pub fn marker(self) -> &'static str {
        match self {
            BlockKind::Apply => APPLY_MARKER,
            BlockKind::Revert => REVERT_MARKER,
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockKind::Apply => write!(f, "Up"),
            BlockKind::Revert => write!(f, "Down"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlockError {
    /// 区块不存在、为空或只包含注释
    #[error("缺少 {0} 区块")]
    Missing(BlockKind),

    #[error("第 {line} 行重复出现标记 `{marker}`", marker = .block.marker())]
    DuplicateMarker { block: BlockKind, line: usize },

    #[error("第 {line} 行的 Down 标记出现在 Up 标记之前")]
    MarkerOutOfOrder { line: usize },
}

/// 解析后的脚本内容
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptBlocks {
    pub apply: String,
    pub revert: String,
}

impl ScriptBlocks {
    pub fn get(&self, kind: BlockKind) -> &str {
        match kind {
            BlockKind::Apply => &self.apply,
            BlockKind::Revert => &self.revert,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Apply,
    Revert,
}

/// 单次扫描拆分出两个区块，区块内容已去除首尾空白
pub fn parse_blocks(content: &str) -> Result<ScriptBlocks, BlockError> {
    let mut section = Section::Preamble;
    let mut apply = Vec::new();
    let mut revert = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line_no = index + 1;

        match line.trim() {
            APPLY_MARKER => {
                if section != Section::Preamble {
                    return Err(BlockError::DuplicateMarker {
                        block: BlockKind::Apply,
                        line: line_no,
                    });
                }
                section = Section::Apply;
            }
            REVERT_MARKER => match section {
                Section::Preamble => return Err(BlockError::MarkerOutOfOrder { line: line_no }),
                Section::Apply => section = Section::Revert,
                Section::Revert => {
                    return Err(BlockError::DuplicateMarker {
                        block: BlockKind::Revert,
                        line: line_no,
                    })
                }
            },
            _ => match section {
                Section::Preamble => {}
                Section::Apply => apply.push(line),
                Section::Revert => revert.push(line),
            },
        }
    }

    Ok(ScriptBlocks {
        apply: apply.join("\n").trim().to_string(),
        revert: revert.join("\n").trim().to_string(),
    })
}

/// 提取指定区块，空区块或只有 `--` 注释的区块返回 [`BlockError::Missing`]
pub fn extract(content: &str, kind: BlockKind) -> Result<String, BlockError> {
    let blocks = parse_blocks(content)?;
    let block = blocks.get(kind);
    if !has_statement(block) {
        return Err(BlockError::Missing(kind));
    }
    Ok(block.to_string())
}

/// 至少有一行既非空白也非行注释
fn has_statement(block: &str) -> bool {
    block.lines().any(|line| {
        let line = line.trim();
        !line.is_empty() && !line.starts_with("--")
    })
}

pub fn extract_apply(content: &str) -> Result<String, BlockError> {
    extract(content, BlockKind::Apply)
}

pub fn extract_revert(content: &str) -> Result<String, BlockError> {
    extract(content, BlockKind::Revert)
}
