//! `modload`: load the shared modules named by a path-list variable.
//!
//! Reads an optional TOML configuration, applies CLI overrides, sets up
//! logging on stderr and runs one module scan. Individual module failures are
//! logged and never change the exit status.

mod cli;
mod config;

use anyhow::anyhow;
use cli::{CliArgs, ReportFormat};
use config::{AppConfig, LoggingSettings};
use module_loader::{DryRunLoader, DynamicLoader, ModuleScanner, NativeLoader, ScanReport};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// ============================================================================
// Logging Setup
// ============================================================================

/// Initialize logging; diagnostics always go to stderr.
fn setup_logging(config: &LoggingSettings) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(filter);

    if config.json_format {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_file(false)
                    .with_line_number(false),
            )
            .try_init()?;
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_file(false)
                    .with_line_number(false)
                    .with_target(false),
            )
            .try_init()?;
    }

    Ok(())
}

// ============================================================================
// Scan
// ============================================================================

fn scan_with<L: DynamicLoader>(loader: L, config: &AppConfig) -> ScanReport {
    ModuleScanner::with_loader(loader)
        .with_max_depth(config.loader.max_depth)
        .scan_env(&config.loader.env_var)
}

fn run_scan(config: &AppConfig) -> ScanReport {
    if config.loader.dry_run {
        info!("🔍 Dry run: modules will be listed, not loaded");
        scan_with(DryRunLoader, config)
    } else {
        if !NativeLoader::is_supported() {
            info!("Module loading is not supported on this platform");
        }
        scan_with(NativeLoader, config)
    }
}

fn render_report(report: &ScanReport, format: ReportFormat) -> anyhow::Result<String> {
    let summary = report.summary();
    match format {
        ReportFormat::Json => Ok(serde_json::to_string_pretty(&summary)?),
        ReportFormat::Text => Ok(format!(
            "attempted: {}\nloaded: {}\nfailed: {}\nmissing: {}\nunreadable: {}\nskipped: {}",
            summary.attempted,
            summary.loaded,
            summary.failed,
            summary.missing,
            summary.unreadable,
            summary.skipped
        )),
    }
}

// ============================================================================
// Entry Point
// ============================================================================

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let mut config = AppConfig::load_from_file(&args.config_path)?;
    config.apply_cli(&args);
    config
        .validate()
        .map_err(|e| anyhow!("Configuration validation failed: {}", e))?;

    setup_logging(&config.logging)?;
    info!(
        "🔌 Loading modules from ${} (config: {})",
        config.loader.env_var,
        args.config_path.display()
    );

    let report = run_scan(&config);
    println!("{}", render_report(&report, args.report)?);

    Ok(())
}
