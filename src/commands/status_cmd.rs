//! `migrate:status` 命令

use crate::context::AppContext;
use anyhow::Context as _;
use chrono::NaiveDateTime;
use sqlshift_migrator::StatusReport;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn run(ctx: &AppContext, json: bool) -> anyhow::Result<()> {
    let db = ctx.open_database()?;
    let report = ctx
        .migrator()
        .status(&db)
        .context("migrate:status 执行失败")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", render_table(&report));
    }
    Ok(())
}

pub fn render_table(report: &StatusReport) -> String {
    if report.scripts.is_empty() && report.orphaned.is_empty() {
        return "No migrations found.".to_string();
    }

    let width = report
        .scripts
        .iter()
        .map(|s| s.name.len())
        .chain(report.orphaned.iter().map(|r| r.name.len()))
        .max()
        .unwrap_or_default();

    let mut lines = Vec::with_capacity(report.scripts.len() + report.orphaned.len() + 2);
    lines.push(format!(
        "{:<8} {:<width$} {:>5}  {}",
        "Status", "Migration", "Batch", "Applied at"
    ));

    for script in &report.scripts {
        let state = if script.drifted {
            "Drifted"
        } else if script.applied {
            "Ran"
        } else {
            "Pending"
        };
        let batch = script.batch.map(|b| b.to_string()).unwrap_or_default();
        lines.push(format!(
            "{:<8} {:<width$} {:>5}  {}",
            state,
            script.name,
            batch,
            format_time(script.applied_at)
        ));
    }

    for record in &report.orphaned {
        lines.push(format!(
            "{:<8} {:<width$} {:>5}  {}",
            "Missing",
            record.name,
            record.batch,
            format_time(record.applied_at)
        ));
    }

    lines.push(format!(
        "Last batch: {}, pending: {}",
        report.last_batch,
        report.pending_count()
    ));
    lines.join("\n")
}

fn format_time(at: Option<NaiveDateTime>) -> String {
    at.map(|t| t.format(TIME_FORMAT).to_string()).unwrap_or_default()
}
