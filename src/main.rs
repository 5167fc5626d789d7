use anyhow::Result;
use clap::Parser;

use releaser::cli::{Cli, Commands};
use releaser::commands::{apply, plan};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with LOGGING env var support
    // LOGGING=debug,info,warn,error or just LOGGING=debug
    let log_level = std::env::var("LOGGING")
        .or_else(|_| std::env::var("LOG_LEVEL"))
        .unwrap_or_else(|_| {
            if cli.verbose {
                "debug".to_string()
            } else {
                "info".to_string()
            }
        });

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(false) // Disable ANSI escape codes for cleaner output
        .init();

    match cli.command {
        Commands::Apply {
            plan,
            config,
            dry_run,
            output,
        } => {
            apply::execute(plan, config, dry_run, output).await?;
        }
        Commands::Plan { plan: plan_file, config } => {
            plan::execute(plan_file, config).await?;
        }
    }

    Ok(())
}
