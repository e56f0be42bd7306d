//! `create:migration` 命令

use crate::context::AppContext;
use anyhow::Context as _;

pub fn run(ctx: &AppContext, words: &[String]) -> anyhow::Result<()> {
    let path = ctx
        .scaffold()
        .create(&words.join(" "))
        .context("create:migration 执行失败")?;

    println!("Created migration: {}", path.display());
    Ok(())
}
