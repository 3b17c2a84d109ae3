//! acfgen CLI - generates Steam appmanifest files via SKSAppManifestGenerator

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use acfgen::util::Shell;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("acfgen=debug")
    } else {
        EnvFilter::new("acfgen=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let shell = Shell::from_flags(cli.quiet, cli.verbose, cli.no_color);

    // Execute command
    match cli.command {
        Commands::Generate(args) => commands::generate::execute(args, &shell),
        Commands::Fetch(args) => commands::fetch::execute(args, &shell),
        Commands::Verify(args) => commands::verify::execute(args, &shell),
        Commands::Doctor(args) => commands::doctor::execute(args, cli.verbose),
    }
}
