//! SQL 迁移引擎
//!
//! 按名称顺序执行 `db/migrations` 下的 `.sql` 脚本，记录执行批次与内容校验和，
//! 并支持回滚最近一个批次。
//!
//! ## 模块结构
//! - `store`: 脚本存储抽象（文件系统 / 内存）
//! - `scanner`: 扫描并排序迁移脚本
//! - `checksum`: SHA-256 校验和与篡改检测
//! - `blocks`: Up / Down 区块解析
//! - `database`: 迁移记录表初始化
//! - `ledger`: 迁移记录表读写
//! - `executor`: 批量执行
//! - `rollback`: 批次回滚
//! - `status`: 状态查询
//!
//! ## 使用示例
//!
//! ```no_run
//! use sqlshift_migrator::{DirectoryStore, MigrationDatabase, Migrator};
//!
//! let mut db = MigrationDatabase::open("app.db")?;
//! let migrator = Migrator::new(DirectoryStore::new("db/migrations"));
//!
//! let report = migrator.migrate(&mut db)?;
//! println!("applied {} migrations", report.count());
//! # Ok::<(), sqlshift_migrator::MigrationError>(())
//! ```
//!
//! 引擎本身不提供进程间锁，同一数据库上的并发调用需要由调用方串行化。

pub mod blocks;
pub mod checksum;
pub mod database;
pub mod error;
pub mod executor;
pub mod ledger;
pub mod rollback;
pub mod scanner;
pub mod status;
pub mod store;

pub use blocks::{BlockError, BlockKind, APPLY_MARKER, REVERT_MARKER};
pub use database::MigrationDatabase;
pub use error::MigrationError;
pub use executor::MigrationReport;
pub use ledger::{LedgerDao, MigrationRecord};
pub use rollback::RollbackReport;
pub use scanner::{MigrationScript, SCRIPT_SUFFIX};
pub use status::{ScriptStatus, StatusReport};
pub use store::{DirectoryStore, MemoryStore, ScriptStore, StoreEntry};

/// 绑定脚本存储的迁移执行器
#[derive(Debug)]
pub struct Migrator<S> {
    store: S,
}

impl<S: ScriptStore> Migrator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 执行全部待执行迁移，见 [`executor::apply`]
    pub fn migrate(&self, db: &mut MigrationDatabase) -> Result<MigrationReport, MigrationError> {
        executor::apply(db, &self.store)
    }

    /// 回滚最近一个批次，见 [`rollback::rollback`]
    pub fn rollback(&self, db: &mut MigrationDatabase) -> Result<RollbackReport, MigrationError> {
        rollback::rollback(db, &self.store)
    }

    pub fn status(&self, db: &MigrationDatabase) -> Result<StatusReport, MigrationError> {
        status::status(db, &self.store)
    }
}
