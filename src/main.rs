//! millsim command line
//!
//! Simulates a program file against a fresh stock grid and prints a summary.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use millsim::{init_logging, simulate_file, Config, BUILD_DATE, VERSION};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "millsim")]
#[command(about = "Heightmap milling simulator for linear G01 programs", long_about = None)]
#[command(version)]
struct Cli {
    /// Program file; the extension encodes the tool, e.g. part.f10 or part.k8
    program: PathBuf,

    /// Config file (.toml or .json); defaults to the platform config directory
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip the per-stamp delay
    #[arg(long)]
    fast: bool,

    /// Delay before each stamp, in milliseconds
    #[arg(long, value_name = "MS")]
    delay_ms: Option<u64>,

    /// Deepest cut the tool can take in one pass
    #[arg(long, value_name = "DEPTH")]
    cutting_length: Option<f32>,

    /// Write the final grid as JSON to this file
    #[arg(long, value_name = "PATH")]
    snapshot: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Log as JSON lines
    #[arg(long)]
    json_logs: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let (mut config, origin) = Config::load_or_default(cli.config.as_deref())?;
    if cli.fast {
        config.simulation.fast = true;
    }
    if let Some(delay) = cli.delay_ms {
        config.simulation.step_delay_ms = delay;
    }
    if cli.cutting_length.is_some() {
        config.simulation.cutting_length = cli.cutting_length;
    }
    if cli.json_logs {
        config.logging.json = true;
    }
    config.validate()?;

    init_logging(config.logging.json)?;
    info!("millsim {} (built {})", VERSION, BUILD_DATE);
    if origin.is_default() {
        warn!("Using {}", origin);
    } else {
        info!("Using {}", origin);
    }

    let (summary, snapshot) = simulate_file(&cli.program, &config.simulation)
        .with_context(|| format!("Failed to simulate {}", cli.program.display()))?;

    if let Some(path) = &cli.snapshot {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        serde_json::to_writer(std::io::BufWriter::new(file), &snapshot)
            .with_context(|| format!("Failed to write snapshot to {}", path.display()))?;
        info!("Wrote grid snapshot to {}", path.display());
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{summary}");
    }

    Ok(if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}
