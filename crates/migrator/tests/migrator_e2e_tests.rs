//! 迁移引擎端到端测试
//!
//! 使用真实目录与 SQLite 数据库文件，覆盖执行、幂等、篡改检测、批次与回滚。

use proptest::prelude::*;
use sqlshift_migrator::{DirectoryStore, LedgerDao, MigrationDatabase, MigrationError, Migrator};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const USERS: &str = "20240101000000_create_users_table";
const ORDERS: &str = "20240102000000_create_orders_table";

struct Fixture {
    dir: TempDir,
    db: MigrationDatabase,
    migrator: Migrator<DirectoryStore>,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let migrations = dir.path().join("db").join("migrations");
        fs::create_dir_all(&migrations).unwrap();

        let db = MigrationDatabase::open(dir.path().join("app.db")).unwrap();
        let migrator = Migrator::new(DirectoryStore::new(&migrations));
        Self { dir, db, migrator }
    }

    fn migrations_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("db").join("migrations")
    }

    fn write(&self, name: &str, up: &str, down: &str) {
        write_script(&self.migrations_dir(), name, up, down);
    }

    fn table_exists(&self, table: &str) -> bool {
        self.db
            .connection()
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
                [table],
                |row| row.get(0),
            )
            .unwrap()
    }

    fn ledger(&self) -> Vec<(String, i64)> {
        LedgerDao::records(self.db.connection())
            .unwrap()
            .into_iter()
            .map(|r| (r.name, r.batch))
            .collect()
    }
}

fn write_script(dir: &Path, name: &str, up: &str, down: &str) {
    fs::write(
        dir.join(format!("{name}.sql")),
        format!("-- +migrate Up\n{up}\n-- +migrate Down\n{down}\n"),
    )
    .unwrap();
}

#[test]
fn test_users_and_orders_scenario() {
    let mut fx = Fixture::new();
    fx.write(
        USERS,
        "CREATE TABLE users (id INTEGER PRIMARY KEY);",
        "DROP TABLE users;",
    );
    fx.write(
        ORDERS,
        "CREATE TABLE orders (id INTEGER PRIMARY KEY, user_id INTEGER REFERENCES users(id));",
        "DROP TABLE orders;",
    );

    let report = fx.migrator.migrate(&mut fx.db).unwrap();
    assert_eq!(report.count(), 2);
    assert_eq!(
        fx.ledger(),
        vec![(USERS.to_string(), 1), (ORDERS.to_string(), 1)]
    );

    let rollback = fx.migrator.rollback(&mut fx.db).unwrap();
    assert_eq!(rollback.batch, Some(1));
    assert_eq!(rollback.reverted, vec![ORDERS, USERS]);
    assert!(!fx.table_exists("users"));
    assert!(!fx.table_exists("orders"));
    assert!(fx.ledger().is_empty());
}

#[test]
fn test_separate_batches_roll_back_independently() {
    let mut fx = Fixture::new();
    fx.write(
        USERS,
        "CREATE TABLE users (id INTEGER PRIMARY KEY);",
        "DROP TABLE users;",
    );
    fx.migrator.migrate(&mut fx.db).unwrap();

    fx.write(
        ORDERS,
        "CREATE TABLE orders (id INTEGER PRIMARY KEY);",
        "DROP TABLE orders;",
    );
    let second = fx.migrator.migrate(&mut fx.db).unwrap();
    assert_eq!(second.batch, Some(2));

    fx.migrator.rollback(&mut fx.db).unwrap();
    assert!(fx.table_exists("users"));
    assert!(!fx.table_exists("orders"));
    assert_eq!(fx.ledger(), vec![(USERS.to_string(), 1)]);

    // 回滚后重新执行会得到新的批次号
    let again = fx.migrator.migrate(&mut fx.db).unwrap();
    assert_eq!(again.batch, Some(2));
    assert_eq!(again.applied, vec![ORDERS]);
}

#[test]
fn test_tampered_script_blocks_apply_and_leaves_ledger() {
    let mut fx = Fixture::new();
    fx.write(
        USERS,
        "CREATE TABLE users (id INTEGER PRIMARY KEY);",
        "DROP TABLE users;",
    );
    fx.migrator.migrate(&mut fx.db).unwrap();
    let before = fx.ledger();

    fx.write(
        USERS,
        "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT);",
        "DROP TABLE users;",
    );
    fx.write(
        ORDERS,
        "CREATE TABLE orders (id INTEGER PRIMARY KEY);",
        "DROP TABLE orders;",
    );

    let err = fx.migrator.migrate(&mut fx.db).unwrap_err();
    assert!(matches!(err, MigrationError::Integrity { .. }));
    assert_eq!(err.script_name(), Some(USERS));
    assert_eq!(fx.ledger(), before);
    assert!(!fx.table_exists("orders"));
}

#[test]
fn test_failure_in_middle_of_batch_keeps_nothing() {
    let mut fx = Fixture::new();
    fx.write(
        USERS,
        "CREATE TABLE users (id INTEGER PRIMARY KEY);",
        "DROP TABLE users;",
    );
    fx.write(
        ORDERS,
        "CREATE TABLE orders (id INTEGER PRIMARY KEY);",
        "DROP TABLE orders;",
    );
    fx.write(
        "20240103000000_broken",
        "INSERT INTO no_such_table VALUES (1);",
        "SELECT 1;",
    );
    fx.write(
        "20240104000000_create_items_table",
        "CREATE TABLE items (id INTEGER);",
        "DROP TABLE items;",
    );

    let err = fx.migrator.migrate(&mut fx.db).unwrap_err();
    assert_eq!(err.script_name(), Some("20240103000000_broken"));
    assert!(!err.is_indeterminate());
    assert!(fx.ledger().is_empty());
    assert!(!fx.table_exists("users"));
    assert!(!fx.table_exists("orders"));
    assert!(!fx.table_exists("items"));
}

#[test]
fn test_non_sql_files_and_dirs_are_ignored() {
    let mut fx = Fixture::new();
    fx.write(
        USERS,
        "CREATE TABLE users (id INTEGER PRIMARY KEY);",
        "DROP TABLE users;",
    );
    fs::write(fx.migrations_dir().join("notes.txt"), "not a migration").unwrap();
    fs::create_dir(fx.migrations_dir().join("archive.sql")).unwrap();

    let report = fx.migrator.migrate(&mut fx.db).unwrap();
    assert_eq!(report.applied, vec![USERS]);
}

#[test]
fn test_status_after_partial_rollback() {
    let mut fx = Fixture::new();
    fx.write(
        USERS,
        "CREATE TABLE users (id INTEGER PRIMARY KEY);",
        "DROP TABLE users;",
    );
    fx.migrator.migrate(&mut fx.db).unwrap();
    fx.write(
        ORDERS,
        "CREATE TABLE orders (id INTEGER PRIMARY KEY);",
        "DROP TABLE orders;",
    );

    let status = fx.migrator.status(&fx.db).unwrap();
    assert_eq!(status.last_batch, 1);
    assert_eq!(status.pending_count(), 1);
    assert!(status.orphaned.is_empty());
}

#[test]
fn test_ledger_survives_reopen() {
    let mut fx = Fixture::new();
    fx.write(
        USERS,
        "CREATE TABLE users (id INTEGER PRIMARY KEY);",
        "DROP TABLE users;",
    );
    fx.migrator.migrate(&mut fx.db).unwrap();

    let mut reopened = MigrationDatabase::open(fx.dir.path().join("app.db")).unwrap();
    let report = fx.migrator.migrate(&mut reopened).unwrap();
    assert!(report.is_empty());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// 任意脚本集合首次执行：全部执行、批次号为 1、记录数等于脚本数；
    /// 随后回滚清空全部记录
    #[test]
    fn prop_fresh_apply_then_rollback(
        tables in prop::collection::btree_set("[a-z]{3,10}", 1..6),
    ) {
        let mut fx = Fixture::new();
        for (i, table) in tables.iter().enumerate() {
            fx.write(
                &format!("2024010100{:04}_create_{table}", i),
                &format!("CREATE TABLE t_{table} (id INTEGER);"),
                &format!("DROP TABLE t_{table};"),
            );
        }

        let report = fx.migrator.migrate(&mut fx.db).unwrap();
        prop_assert_eq!(report.count(), tables.len());
        prop_assert_eq!(report.batch, Some(1));

        let ledger = fx.ledger();
        prop_assert_eq!(ledger.len(), tables.len());
        prop_assert!(ledger.iter().all(|(_, batch)| *batch == 1));

        let second = fx.migrator.migrate(&mut fx.db).unwrap();
        prop_assert!(second.is_empty());

        let rollback = fx.migrator.rollback(&mut fx.db).unwrap();
        prop_assert_eq!(rollback.count(), tables.len());
        prop_assert!(fx.ledger().is_empty());
        for table in &tables {
            let exists = fx.table_exists(&format!("t_{table}"));
            prop_assert!(!exists);
        }
    }
}
