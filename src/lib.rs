//! # millsim
//!
//! A heightmap milling simulator. Runs 3-axis linear (`G01`) programs over a
//! stock height grid and reports every cut a real machine could not make.
//!
//! ## Architecture
//!
//! millsim is organized as a workspace with multiple crates:
//!
//! 1. **millsim-core** - Waypoints, tool kinds, errors and shared-state aliases
//! 2. **millsim-engine** - Program parser, tool profiles, rasterizer, stamping and the runner
//! 3. **millsim-settings** - Configuration files and validation
//! 4. **millsim** - Command line binary that ties the crates together

pub mod types;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

pub use millsim_core::{
    thread_safe_rw, CutError, Error, GridSpec, Instruction, ParseError, Result, RunnerError,
    ThreadSafeRw, ToolKind, Waypoint,
};
pub use millsim_engine::{
    parse_program, read_program, FileLineSource, Grid, GridSnapshot, LineSource, Program,
    RunReport, Runner, RunnerState, Tool,
};
pub use millsim_settings::{Config, SimulationSettings};
pub use types::SimulationSummary;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// How often the caller thread reports progress of a paced run
const PROGRESS_POLL: Duration = Duration::from_millis(250);

/// Initialize logging
///
/// Sets up structured logging with:
/// - Output on stderr, pretty or JSON lines
/// - RUST_LOG environment variable support, INFO by default
pub fn init_logging(json: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing::Level::INFO.to_string()));

    if json {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(true)
            .json();
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_line_number(true)
            .pretty();
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    }

    Ok(())
}

/// Load a program, carve it into a fresh grid and wait for the run to end.
///
/// Returns the summary together with the final grid.
pub fn simulate_file(
    path: &Path,
    settings: &SimulationSettings,
) -> Result<(SimulationSummary, GridSnapshot)> {
    let program = read_program(path, &FileLineSource::new())?;
    simulate_program(path, Arc::new(program), settings)
}

/// Carve an already parsed program into a fresh grid.
///
/// `path` only labels the summary. Fast runs are joined directly. Paced runs
/// are polled so progress shows up in the debug log while the worker sleeps
/// between stamps.
pub fn simulate_program(
    path: &Path,
    program: Arc<Program>,
    settings: &SimulationSettings,
) -> Result<(SimulationSummary, GridSnapshot)> {
    let spec = settings.grid_spec();
    let grid = thread_safe_rw(Grid::new(spec)?);
    let tool = Arc::new(Tool::for_program(
        &program,
        spec.pixels_per_unit,
        settings.cutting_length,
    ));

    let mut runner = Runner::new(settings.step_delay());
    runner.start(
        Arc::clone(&program),
        Arc::clone(&tool),
        Arc::clone(&grid),
        settings.fast,
    )?;

    if !settings.fast {
        while runner.state() == RunnerState::Running {
            std::thread::sleep(PROGRESS_POLL);
            debug!(
                "Progress {:.1}%, tool at {}",
                runner.progress() * 100.0,
                runner.tool_position()
            );
        }
    }

    let report = runner
        .join()
        .ok_or_else(|| Error::other("Simulation worker stopped unexpectedly"))?;

    let grid = grid.read();
    let summary = SimulationSummary {
        program: path.to_path_buf(),
        tool_kind: tool.kind(),
        tool_radius: tool.radius(),
        cutting_length: tool.cutting_length(),
        grid_dimensions: (grid.width(), grid.height()),
        report,
        removed_volume: grid.removed_volume(),
        min_height: grid.min_height(),
        max_height: grid.max_height(),
    };
    info!(
        "{}: {} violations, {:.3} removed",
        path.display(),
        summary.report.violations.total(),
        summary.removed_volume
    );
    Ok((summary, grid.snapshot()))
}
