//! # millsim Engine
//!
//! Program parsing, tool footprints and heightmap stock removal for millsim.
//!
//! A typical run:
//!
//! ```rust,ignore
//! let program = Arc::new(read_program(path, &FileLineSource::new())?);
//! let grid = thread_safe_rw(Grid::new(GridSpec::default())?);
//! let tool = Arc::new(Tool::for_program(&program, 10, None));
//! let mut runner = Runner::default();
//! runner.start(program, tool, grid.clone(), true)?;
//! let report = runner.join();
//! ```

pub mod gcode;
pub mod simulation;
pub mod stock;

pub use gcode::{
    parse_instructions, parse_program, parse_tool_extension, read_program, FileLineSource,
    LineSource, MemoryLineSource, Program,
};

pub use simulation::{
    rasterize_segment, RasterStep, RunReport, Runner, RunnerState, SegmentRaster,
    SegmentViolation,
};

pub use stock::{
    build_tool_profile, stamp_tool, validate_cut, Grid, GridSnapshot, StampOutcome, Tool,
    ToolProfile, ViolationCounts,
};
