use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "sla-audit")]
#[command(about = "Failure report generator for test-execution logs", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan the configured log tree and write the CSV report
    Scan(ScanArgs),
    /// Print configuration values
    PrintConfig(ConfigArg),
}

#[derive(Debug, Args)]
pub struct ConfigArg {
    /// JSON run configuration
    #[arg(short, long, default_value = "sla.json")]
    pub config: PathBuf,
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    #[command(flatten)]
    pub config: ConfigArg,
    /// Report path (overrides `report_path`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Do not write a header row
    #[arg(long)]
    pub no_header: bool,
    /// Leave unreadable log files out of the report instead of aborting
    #[arg(long)]
    pub skip_unreadable: bool,
    /// Scan files on the rayon thread pool
    #[arg(long)]
    pub parallel: bool,
}
