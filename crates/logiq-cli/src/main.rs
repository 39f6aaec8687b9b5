//! LogIQ CLI binary entrypoint.
//!
//! This is the main entry point for the `logiq` command-line tool.

use std::io;
use std::process::ExitCode;

use clap::Parser;

use logiq_cli::cli::{Cli, Commands};
use logiq_cli::commands::{Console, IngestCommand, QueryCommand, SummaryCommand};
use logiq_cli::output::OutputFormat;
use logiq_cli::{CliError, Diagnostics};
use logiq_core::{LogiqConfig, SqliteStore};

fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = Cli::parse();

    let config = match cli.resolve_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let diagnostics = match Diagnostics::open(&config.diagnostics_path) {
        Ok(diagnostics) => diagnostics,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = run(&cli, &config);
    if let Err(e) = &result {
        tracing::error!(error = %e, "command failed");
    }
    diagnostics.close();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, config: &LogiqConfig) -> Result<(), CliError> {
    let format = OutputFormat::new(cli.format).with_color(!cli.no_color);
    let store = SqliteStore::open_with_config(config)?;
    let mut stdout = io::stdout().lock();

    match &cli.command {
        Some(Commands::Ingest { path }) => {
            let cmd = IngestCommand::new(&store).with_batch_size(config.batch_size);
            cmd.execute(&mut stdout, &format, path)?;
        }
        Some(Commands::Summary) => {
            let cmd = SummaryCommand::new(&store);
            cmd.execute(&mut stdout, &format)?;
        }
        Some(Commands::List(args)) => {
            let cmd = QueryCommand::new(&store).with_page_size(config.page_size);
            cmd.list(&mut stdout, &format, args)?;
        }
        Some(Commands::Search { command }) => {
            let cmd = QueryCommand::new(&store).with_page_size(config.page_size);
            cmd.search(&mut stdout, &format, command)?;
        }
        Some(Commands::Console) | None => {
            let stdin = io::stdin().lock();
            Console::new(&store, stdin, stdout, format)
                .with_batch_size(config.batch_size)
                .with_page_size(config.page_size)
                .run()?;
        }
    }

    Ok(())
}
