// design-export - Rate-limited, cached image exporter for design files
// Copyright (c) 2025 Design Export Contributors
// Licensed under the MIT License

use clap::Parser;
use design_export::cli::commands::EXIT_FATAL;
use design_export::cli::{Cli, Commands};
use design_export::logging::init_logging;
use std::process;

/// Conventional exit code after SIGINT
const EXIT_INTERRUPTED: i32 = 130;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // File logging is opt-in through the [logging] section
    let (log_level, logging_config) = cli.logging_settings();
    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(EXIT_FATAL);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "design-export - image exporter for design files"
    );

    let exit_code = tokio::select! {
        result = execute_command(&cli) => match result {
            Ok(code) => code,
            Err(e) => {
                design_export::log_error_with_context!(e, "command execution");
                eprintln!("Error: {e}");
                EXIT_FATAL
            }
        },
        Ok(()) = tokio::signal::ctrl_c() => {
            tracing::info!("Received SIGINT (Ctrl+C), stopping");
            println!("\n⚠️  Interrupted. Images cached so far are kept.");
            EXIT_INTERRUPTED
        }
    };

    // process::exit skips destructors; flush file logs first
    drop(guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Export(args) => args.execute(&cli.config).await,
        Commands::ClearCache(args) => args.execute(&cli.config).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}
