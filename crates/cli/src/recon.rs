//! `tally run` and `tally validate`: two-file reconciliation.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use serde::Serialize;
use tally_recon::{reconcile_files, ReasonCounts, ReconConfig, ReconResult, UnmatchedTransaction};

use crate::exit_codes::{EXIT_INVALID_CONFIG, EXIT_RUNTIME, EXIT_UNMATCHED, EXIT_USAGE};
use crate::CliError;

#[derive(Subcommand)]
pub enum ReconCommands {
    /// Reconcile two transaction CSV files
    #[command(after_help = "\
Examples:
  tally run left.csv right.csv
  tally run left.csv right.csv --json
  tally run left.csv right.csv --config recon.toml --output result.json
  tally -v run left.csv right.csv")]
    Run {
        /// Left (first) CSV file
        left: PathBuf,

        /// Right (second) CSV file
        right: PathBuf,

        /// TOML config; built-in defaults when omitted
        #[arg(long, short = 'c', env = "TALLY_CONFIG")]
        config: Option<PathBuf>,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Validate a config without running
    #[command(after_help = "\
Examples:
  tally validate recon.toml")]
    Validate {
        /// Path to the TOML config file
        config: PathBuf,
    },
}

pub fn cmd_recon(cmd: ReconCommands) -> Result<(), CliError> {
    match cmd {
        ReconCommands::Run { left, right, config, json, output } => {
            cmd_run(&left, &right, config.as_deref(), json, output)
        }
        ReconCommands::Validate { config } => cmd_validate(&config),
    }
}

// ---------------------------------------------------------------------------
// JSON output
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct RunOutput<'a> {
    meta: RunMeta,
    summary: RunSummary,
    unmatched: &'a [UnmatchedTransaction],
}

#[derive(Serialize)]
struct RunMeta {
    config_name: String,
    engine_version: String,
    run_at: String,
}

#[derive(Serialize)]
struct RunSummary {
    matched_count: usize,
    unmatched_count: usize,
    details_mismatch: usize,
    not_identical: usize,
    missing_left_only: usize,
    missing_right_only: usize,
}

impl RunSummary {
    fn new(result: &ReconResult, counts: &ReasonCounts) -> Self {
        Self {
            matched_count: result.matched_count,
            unmatched_count: result.unmatched_count,
            details_mismatch: counts.details_mismatch,
            not_identical: counts.not_identical,
            missing_left_only: counts.missing_left_only,
            missing_right_only: counts.missing_right_only,
        }
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn load_config(path: Option<&Path>) -> Result<ReconConfig, CliError> {
    let Some(path) = path else {
        return Ok(ReconConfig::default());
    };
    let config_str = std::fs::read_to_string(path).map_err(|e| {
        CliError::new(EXIT_USAGE, format!("cannot read config {}: {e}", path.display()))
            .with_hint("pass --config with an existing TOML file, or omit it for defaults")
    })?;
    let config = ReconConfig::from_toml(&config_str).map_err(|e| CliError::new(EXIT_INVALID_CONFIG, e.to_string()))?;
    log::debug!("loaded config '{}' from {}", config.name, path.display());
    Ok(config)
}

fn cmd_run(
    left: &Path,
    right: &Path,
    config_path: Option<&Path>,
    json_output: bool,
    output_file: Option<PathBuf>,
) -> Result<(), CliError> {
    let config = load_config(config_path)?;

    let result = reconcile_files(left, right, &config).map_err(CliError::recon)?;
    let counts = result.breakdown();

    let output = RunOutput {
        meta: RunMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary: RunSummary::new(&result, &counts),
        unmatched: &result.unmatched,
    };

    if json_output || output_file.is_some() {
        let json_str = serde_json::to_string_pretty(&output)
            .map_err(|e| CliError::new(EXIT_RUNTIME, format!("JSON serialization error: {e}")))?;

        if let Some(ref path) = output_file {
            std::fs::write(path, &json_str)
                .map_err(|e| CliError::new(EXIT_RUNTIME, format!("cannot write output: {e}")))?;
            eprintln!("wrote {}", path.display());
        }

        if json_output {
            println!("{json_str}");
        }
    }

    // Human summary to stderr
    eprintln!(
        "{}: {} matched, {} unmatched (details mismatch: {}, not identical: {}, missing: {} left-only / {} right-only)",
        config.name,
        result.matched_count,
        result.unmatched_count,
        counts.details_mismatch,
        counts.not_identical,
        counts.missing_left_only,
        counts.missing_right_only,
    );

    if !result.is_reconciled() {
        return Err(CliError::new(EXIT_UNMATCHED, ""));
    }

    Ok(())
}

fn cmd_validate(config_path: &Path) -> Result<(), CliError> {
    let config = load_config(Some(config_path))?;
    let m = &config.matching;
    let retry = if config.retry.enabled {
        format!("{} attempt(s)", config.retry.max_attempts)
    } else {
        "off".to_string()
    };
    eprintln!(
        "valid: '{}' with {}s date window, punctuation {}, retry {}",
        config.name,
        m.date_window_seconds,
        if m.strip_punctuation { "stripped" } else { "kept" },
        retry,
    );
    Ok(())
}
