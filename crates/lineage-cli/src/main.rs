//! Lineage CLI - Command-line interface for the term-mention provenance index.

use clap::Parser;
use lineage_cli::{execute, execute_config, open_index, Cli, Command, Formatter};
use lineage_index::IndexConfig;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr; `RUST_LOG` wins over `-v`
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> lineage_cli::Result<()> {
    let config = match &cli.config {
        Some(path) => IndexConfig::from_file(path)?,
        None => IndexConfig::default(),
    };

    let formatter = Formatter::new(cli.format, !cli.no_color);
    let authorizations = cli.authorizations();

    let output = match cli.command {
        Command::Config => execute_config(&config)?,
        Command::Index(command) => {
            let (index, mut events) = open_index(&cli.db, config)?;
            let output = execute(command, &index, &authorizations, &formatter)?;

            // Nobody consumes re-index events in a one-shot process; log what would have gone out
            while let Ok(event) = events.try_recv() {
                tracing::info!(
                    "Re-index {} {} (workspace {:?})",
                    event.element_id,
                    event.property_name,
                    event.workspace_id
                );
            }
            let metrics = index.metrics();
            if metrics.total_mutations() > 0 {
                tracing::debug!("{}", metrics.summary());
            }
            output
        }
    };

    if !output.is_empty() {
        println!("{}", output);
    }

    Ok(())
}
