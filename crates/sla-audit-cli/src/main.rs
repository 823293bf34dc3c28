mod commands;
mod logging;
mod progress;

use std::process;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands, ScanArgs};
use dotenv::dotenv;
use progress::CliReporter;
use sla_audit_core::config::load_configuration;
use sla_audit_core::{RunConfig, ScanEngine, UnreadablePolicy};
use tracing::{error, info, warn};

fn main() {
    dotenv().ok();

    let _guard = logging::init_logger();

    let args = Cli::parse();

    let outcome = match args.command {
        Some(Commands::Scan(scan_args)) => run_scan(&scan_args),
        Some(Commands::PrintConfig(arg)) => load(&arg.config).map(|config| {
            println!("Configuration: {:#?}", config);
        }),
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    if let Err(err) = outcome {
        error!("Error: {:#}", err);
        process::exit(1);
    }
}

fn load(path: &std::path::Path) -> anyhow::Result<RunConfig> {
    load_configuration(path)
        .with_context(|| format!("Error loading configuration from {}", path.display()))
}

fn run_scan(args: &ScanArgs) -> anyhow::Result<()> {
    let mut config = load(&args.config.config)?;
    if let Some(output) = &args.output {
        config.report_path = output.clone();
    }
    if args.no_header {
        config.include_header = false;
    }
    if args.skip_unreadable {
        config.on_unreadable = UnreadablePolicy::Skip;
    }
    if args.parallel {
        config.parallel = true;
    }
    if let Some(log_file) = logging::log_file_path() {
        config.exclude_paths.push(log_file);
    }
    info!("CSV report fields: {:?}", config.report_fields);

    let engine = ScanEngine::new(config)?;
    let reporter = CliReporter::new();
    let result = engine.run(&reporter)?;

    println!();
    info!(
        "Scan: {}, Report: {}",
        format!("{:.2}s", result.scan_duration.as_secs_f64()).green(),
        format!("{:.2}s", result.report_write_duration.as_secs_f64()).green(),
    );
    info!(
        "{} log files, {} lines, {} failed records",
        format!("{}", result.files_scanned).cyan(),
        format!("{}", result.lines_scanned).cyan(),
        format!("{}", result.report.len()).red(),
    );
    for skipped in &result.skipped_files {
        warn!(
            "{} {}: {}",
            "Skipped".yellow(),
            skipped.path.display(),
            skipped.reason
        );
    }
    if result.report.is_empty() {
        info!("No failed records found");
    }
    if let Some(path) = &result.report_path {
        info!("SLA report generated successfully as '{}'", path.display());
    }

    Ok(())
}
