//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// acfgen - generates Steam appmanifest (.acf) files via SKSAppManifestGenerator
#[derive(Parser)]
#[command(name = "acfgen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate manifest files for one or more App IDs
    Generate(GenerateArgs),

    /// Download and install the generator tool without running it
    Fetch(FetchArgs),

    /// Check a directory for previously generated manifests
    Verify(VerifyArgs),

    /// Check which helper binaries are available
    Doctor(DoctorArgs),
}

#[derive(Args)]
pub struct GenerateArgs {
    /// App IDs (any mix of space/comma separated tokens)
    pub app_ids: Vec<String>,

    /// Pass the generator's debug flag
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Directory the manifests are written into (defaults to the current directory)
    #[arg(long, env = "ACFGEN_DIR")]
    pub dir: Option<PathBuf>,

    /// Path to an existing generator binary
    #[arg(long)]
    pub tool: Option<PathBuf>,

    /// Approve auto-download without prompting
    #[arg(short = 'y', long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct FetchArgs {
    /// Install location for the generator binary
    #[arg(long)]
    pub tool: Option<PathBuf>,

    /// Approve auto-download without prompting
    #[arg(short = 'y', long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// App IDs to check for
    pub app_ids: Vec<String>,

    /// Directory to check (defaults to the current directory)
    #[arg(long, env = "ACFGEN_DIR")]
    pub dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct DoctorArgs {
    /// Include paths and versions in the output
    #[arg(long)]
    pub verbose: bool,
}
