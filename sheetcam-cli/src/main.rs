//! sheetcam - CLI tool to turn a CNC router job into ShopBot programs.

mod bundle;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use sheetcam_core::{run_job_with_preset, CamError, Job, KindDefaults, PresetTable};

/// Generate ShopBot SBP programs from a JSON job description.
#[derive(Parser, Debug)]
#[command(name = "sheetcam")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input job file (JSON)
    #[arg(short, long)]
    input: PathBuf,

    /// Output path (.sbp for one sheet, .zip for several)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Nest parts automatically when the job has no placements
    #[arg(long)]
    nest: bool,

    /// Preset table file (JSON); the built-in table is used otherwise
    #[arg(long)]
    presets: Option<PathBuf>,

    /// Apply this preset to every operation
    #[arg(long)]
    preset: Option<String>,

    /// Validate only, don't write output
    #[arg(long)]
    validate: bool,

    /// Output the job result as JSON
    #[arg(long)]
    debug: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(exit_status(&e))
        }
    }
}

/// Process exit status for an error: the pipeline error code, or 1.
fn exit_status(e: &anyhow::Error) -> u8 {
    e.downcast_ref::<CamError>()
        .map(|c| (c.code_value().unsigned_abs() % 256) as u8)
        .filter(|&s| s != 0)
        .unwrap_or(1)
}

fn run(args: Args) -> Result<()> {
    info!("Processing: {}", args.input.display());

    let mut job = Job::load(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;
    if args.nest {
        job.nest = true;
    }

    let defaults = KindDefaults::standard();
    let table = match &args.presets {
        Some(path) => PresetTable::load(path)
            .with_context(|| format!("Failed to load presets from {}", path.display()))?,
        None => PresetTable::builtin(&defaults),
    };
    let preset = args.preset.as_deref().map(|id| table.get(id)).transpose()?;

    let output = run_job_with_preset(&job, &defaults, preset)?;

    info!(
        "Detected {} operation(s), {} placement(s)",
        output.operations.len(),
        output.placements.len()
    );
    for skipped in &output.skipped {
        warn!("Skipped: {}", skipped);
    }
    for warning in &output.warnings {
        warn!("{}", warning);
    }

    // Debug output
    if args.debug {
        let json = serde_json::to_string_pretty(&output)?;
        println!("{}", json);
        return Ok(());
    }

    // Validate-only mode
    if args.validate {
        if output.warnings.is_empty() {
            info!("Validation passed");
        } else {
            info!("Validation finished with {} warning(s)", output.warnings.len());
        }
        return Ok(());
    }

    let output_path = args
        .output
        .unwrap_or_else(|| default_output(&args.input, output.programs.len()));

    match output.programs.as_slice() {
        [single] => {
            std::fs::write(&output_path, &single.code)
                .with_context(|| format!("Failed to write {}", output_path.display()))?;
        }
        programs => bundle::save_bundle(programs, &output_path)?,
    }

    info!("Generated: {}", output_path.display());

    Ok(())
}

/// Input path with `.sbp` for a single program, `.zip` for a bundle.
fn default_output(input: &Path, programs: usize) -> PathBuf {
    let mut path = input.to_path_buf();
    path.set_extension(if programs == 1 { "sbp" } else { "zip" });
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_extension() {
        assert_eq!(default_output(Path::new("jobs/a.json"), 1), PathBuf::from("jobs/a.sbp"));
        assert_eq!(default_output(Path::new("jobs/a.json"), 3), PathBuf::from("jobs/a.zip"));
    }

    #[test]
    fn test_exit_status_from_error_code() {
        let e = anyhow::Error::new(CamError::NoOperations).context("while writing");
        assert_eq!(exit_status(&e), 201);
        assert_eq!(exit_status(&anyhow::Error::new(CamError::NoStock)), 11);
        assert_eq!(exit_status(&anyhow::anyhow!("other")), 1);
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "sheetcam", "-i", "job.json", "--nest", "--preset", "mdf_12", "-v",
        ])
        .unwrap();
        assert!(args.nest);
        assert!(args.verbose);
        assert_eq!(args.preset.as_deref(), Some("mdf_12"));
        assert!(args.output.is_none());
    }
}
