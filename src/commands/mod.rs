//! 子命令实现

pub mod create_migration_cmd;
pub mod migrate_cmd;
pub mod rollback_cmd;
pub mod status_cmd;

use crate::cli::Commands;
use crate::context::AppContext;

pub fn dispatch(ctx: &AppContext, command: &Commands) -> anyhow::Result<()> {
    match command {
        Commands::Migrate => migrate_cmd::run(ctx),
        Commands::Rollback => rollback_cmd::run(ctx),
        Commands::Status { json } => status_cmd::run(ctx, *json),
        Commands::CreateMigration { name } => create_migration_cmd::run(ctx, name),
    }
}
