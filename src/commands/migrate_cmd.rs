//! `migrate` 命令

use crate::context::AppContext;
use anyhow::Context as _;
use sqlshift_migrator::MigrationReport;

pub fn run(ctx: &AppContext) -> anyhow::Result<()> {
    let mut db = ctx.open_database()?;
    let report = ctx.migrator().migrate(&mut db).context("migrate 执行失败")?;

    println!("{}", summarize(&report));
    Ok(())
}

pub fn summarize(report: &MigrationReport) -> String {
    match report.batch {
        None => "Nothing to migrate.".to_string(),
        Some(batch) => {
            let mut out = format!("Migrated {} script(s) in batch {}:", report.count(), batch);
            for name in &report.applied {
                out.push_str("\n  ");
                out.push_str(name);
            }
            out
        }
    }
}
