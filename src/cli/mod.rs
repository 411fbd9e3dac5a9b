//! Command-line interface for shoulder kinematics normalization.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::core::loaders::load_dataset_csv;
use crate::core::writers::write_csv;
use crate::processors::batch::{check_rows, normalize_rows};
use crate::PipelineConfig;

#[derive(Parser)]
#[command(name = "shoulder-kinematics")]
#[command(about = "Normalize shoulder joint kinematics into the ISB convention", version)]
pub struct Cli {
    /// Path to YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate, correct and expand every record into a long-form table
    Normalize {
        /// Dataset table (one study record per row)
        dataset: PathBuf,
        /// Output CSV file
        output: PathBuf,
        /// Root directory of the series files (overrides the config)
        #[arg(long)]
        data_root: Option<PathBuf>,
        /// Also write rejected rows and their reasons to this CSV
        #[arg(long)]
        rejections: Option<PathBuf>,
        /// Write the study's raw angles instead of ISB angles
        #[arg(long)]
        raw: bool,
    },

    /// Run the acceptance rules only and report usable and rejected records
    Check {
        /// Dataset table (one study record per row)
        dataset: PathBuf,
        /// Enforce the literature correction rules
        #[arg(long)]
        strict: bool,
    },
}

/// Create a spinner for indeterminate operations
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Print a summary box
fn print_summary(title: &str, items: &[(&str, String)]) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ {:<62} ║", title);
    println!("╠══════════════════════════════════════════════════════════════╣");
    for (key, value) in items {
        let display_value = if value.chars().count() > 39 {
            format!("{}...", value.chars().take(36).collect::<String>())
        } else {
            value.clone()
        };
        println!("║ {:<20}: {:<39} ║", key, display_value);
    }
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
}

pub fn run() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity (must come first)
    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .format_timestamp_secs()
        .init();

    // Load config
    let config = match &cli.config {
        Some(path) => match PipelineConfig::from_yaml(path) {
            Ok(cfg) => {
                info!("Loaded config from: {}", path.display());
                cfg
            }
            Err(e) => {
                warn!("Failed to load config from {}: {}, using defaults", path.display(), e);
                PipelineConfig::default()
            }
        },
        None => PipelineConfig::default(),
    };

    // Dispatch to subcommands
    let outcome = match cli.command {
        Commands::Normalize {
            dataset,
            output,
            data_root,
            rejections,
            raw,
        } => {
            let mut config = config;
            if let Some(root) = data_root {
                config.data.root = root;
            }
            if raw {
                config.output.corrected = false;
            }
            cmd_normalize(&dataset, &output, rejections.as_deref(), &config)
        }
        Commands::Check { dataset, strict } => {
            let mut config = config;
            config.validation.strict_literature_rules |= strict;
            cmd_check(&dataset, &config)
        }
    };

    if let Err(e) = outcome {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn cmd_normalize(
    dataset: &Path,
    output: &Path,
    rejections_path: Option<&Path>,
    config: &PipelineConfig,
) -> Result<()> {
    let start = Instant::now();

    println!("Normalizing dataset...");
    println!("Dataset: {}", dataset.display());
    println!("Series root: {}", config.data.root.display());

    let spinner = create_spinner("Loading dataset table...");
    let rows = load_dataset_csv(dataset)
        .with_context(|| format!("Failed to load dataset {}", dataset.display()))?;

    spinner.set_message(format!("Normalizing {} records...", rows.len()));
    let report = normalize_rows(&rows, config);

    spinner.set_message("Writing output table...");
    let written = write_csv(output, report.rows())
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if let Some(path) = rejections_path {
        write_csv(path, report.rejections.iter().map(|r| r.to_row()))
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    spinner.finish_and_clear();

    for rejection in &report.rejections {
        println!(
            "  rejected row {:>4} ({}): {}",
            rejection.index, rejection.article, rejection.error
        );
    }

    print_summary(
        "Normalization Complete",
        &[
            ("Dataset", dataset.display().to_string()),
            ("Output", output.display().to_string()),
            ("Records", rows.len().to_string()),
            ("Expanded", report.expansions.len().to_string()),
            ("Rejected", report.rejections.len().to_string()),
            ("Rows written", written.to_string()),
            ("Corrected", config.output.corrected.to_string()),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );
    Ok(())
}

fn cmd_check(dataset: &Path, config: &PipelineConfig) -> Result<()> {
    let start = Instant::now();

    let spinner = create_spinner("Checking records...");
    let rows = load_dataset_csv(dataset)
        .with_context(|| format!("Failed to load dataset {}", dataset.display()))?;
    let checks = check_rows(&rows, config);
    spinner.finish_and_clear();

    let mut usable = 0;
    for check in &checks {
        match &check.outcome {
            Ok((verdict, confidence)) => {
                usable += 1;
                println!(
                    "  ok       row {:>4} ({}): parent {:?}, child {:?}, confidence {:.3}",
                    check.index, check.article, verdict.parent_risk, verdict.child_risk, confidence
                );
            }
            Err(e) => {
                println!("  rejected row {:>4} ({}): {}", check.index, check.article, e);
            }
        }
    }

    print_summary(
        "Check Complete",
        &[
            ("Dataset", dataset.display().to_string()),
            ("Records", checks.len().to_string()),
            ("Usable", usable.to_string()),
            ("Rejected", (checks.len() - usable).to_string()),
            (
                "Strict rules",
                config.validation.strict_literature_rules.to_string(),
            ),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );
    Ok(())
}
