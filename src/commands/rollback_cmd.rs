//! `migrate:rollback` 命令

use crate::context::AppContext;
use anyhow::Context as _;
use sqlshift_migrator::RollbackReport;

pub fn run(ctx: &AppContext) -> anyhow::Result<()> {
    let mut db = ctx.open_database()?;
    let report = ctx
        .migrator()
        .rollback(&mut db)
        .context("migrate:rollback 执行失败")?;

    println!("{}", summarize(&report));
    Ok(())
}

pub fn summarize(report: &RollbackReport) -> String {
    match report.batch {
        None => "Nothing to rollback.".to_string(),
        Some(batch) => {
            let mut out = format!("Rolled back batch {} ({} script(s)):", batch, report.count());
            for name in &report.reverted {
                out.push_str("\n  ");
                out.push_str(name);
            }
            out
        }
    }
}
