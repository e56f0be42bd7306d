use clap::Parser as _;
use sqlshift_lib::Cli;
use sqlshift_migrator::MigrationError;
use std::process::ExitCode;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match sqlshift_lib::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);

            if e
                .downcast_ref::<MigrationError>()
                .is_some_and(MigrationError::is_indeterminate)
            {
                eprintln!(
                    "WARNING: the final commit failed; the database state is indeterminate. \
                     Manual verification required."
                );
            }
            ExitCode::FAILURE
        }
    }
}
