//! Folio CLI: the `folio` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            config,
            bind,
            data_dir,
        } => commands::serve::run(commands::serve::Args {
            config,
            bind,
            data_dir,
        }),

        Commands::Page { id, data_dir, json } => commands::page::run(id, data_dir, json),

        Commands::Comments { id, data_dir, json } => commands::comments::run(id, data_dir, json),

        Commands::History { data_dir, json } => commands::history::run(data_dir, json),
    }
}
