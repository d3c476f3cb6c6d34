//! Milling programs
//!
//! A program is a tool (decoded from the file extension) plus a list of
//! absolute linear moves. Loading is all-or-nothing: any error discards the
//! whole program.

pub mod parser;
pub mod source;

use std::path::Path;

use millsim_core::{Instruction, ParseError, ToolKind, Waypoint};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub use parser::{parse_instructions, parse_tool_extension};
pub use source::{FileLineSource, LineSource, MemoryLineSource};

/// A parsed milling program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Tip shape of the tool the program was written for
    pub tool_kind: ToolKind,
    /// Tool radius in model units
    pub tool_radius: u32,
    instructions: Vec<Instruction>,
    path: Vec<Waypoint>,
    /// Whether a renderer should draw the tool path
    #[serde(default)]
    pub paths_visible: bool,
}

impl Program {
    /// Build a program, deriving the waypoint path from the instructions
    pub fn new(tool_kind: ToolKind, tool_radius: u32, instructions: Vec<Instruction>) -> Self {
        let path = instructions.iter().filter_map(Instruction::target).collect();
        Self {
            tool_kind,
            tool_radius,
            instructions,
            path,
            paths_visible: false,
        }
    }

    /// Instructions in file order
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Targets of the movement instructions, in order
    pub fn path(&self) -> &[Waypoint] {
        &self.path
    }

    /// Number of consecutive waypoint pairs the tool travels
    pub fn segment_count(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    /// Whether the program holds no moves
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Axis-aligned bounds of the path as (min, max), `None` when empty
    pub fn bounds(&self) -> Option<(Waypoint, Waypoint)> {
        let first = *self.path.first()?;
        Some(self.path.iter().fold((first, first), |(lo, hi), p| {
            (
                Waypoint {
                    x: lo.x.min(p.x),
                    y: lo.y.min(p.y),
                    z: lo.z.min(p.z),
                },
                Waypoint {
                    x: hi.x.max(p.x),
                    y: hi.y.max(p.y),
                    z: hi.z.max(p.z),
                },
            )
        }))
    }
}

/// Parse a program from its file name and lines.
///
/// The file name's extension is validated first, so a bad extension is
/// reported even when the lines are fine.
pub fn parse_program<P, I, S>(filename: P, lines: I) -> Result<Program, ParseError>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let (tool_kind, tool_radius) = parse_tool_extension(filename.as_ref())?;
    let instructions = parse_instructions(lines)?;
    Ok(Program::new(tool_kind, tool_radius, instructions))
}

/// Load a program through a line source.
///
/// A missing file is reported before anything else is checked.
pub fn read_program(path: &Path, source: &dyn LineSource) -> Result<Program, ParseError> {
    if !source.exists(path) {
        warn!("Program file not found: {}", path.display());
        return Err(ParseError::MissingFile {
            path: path.to_path_buf(),
        });
    }

    parse_tool_extension(path)?;
    let lines = source.read_lines(path).map_err(|e| ParseError::Read {
        reason: e.to_string(),
    })?;

    let program = parse_program(path, &lines)?;
    info!(
        "Loaded program {}: {} moves, {} radius {}",
        path.display(),
        program.instructions().len(),
        program.tool_kind,
        program.tool_radius
    );
    Ok(program)
}
