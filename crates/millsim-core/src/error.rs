//! Error handling for millsim
//!
//! Provides error types for every layer of the simulator:
//! - Parse errors (program file name and instruction lines)
//! - Cut errors (physical legality of a single height update)
//! - Runner errors (simulation lifecycle contract)
//! - Grid errors (height field sizing)
//!
//! All error types use `thiserror` for ergonomic error handling.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Program parse error type
///
/// Parsing is all-or-nothing: the first error aborts the whole program and
/// no partial result is ever produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The program file does not exist
    #[error("File doesn't exist: {}", path.display())]
    MissingFile {
        /// The path that was looked up.
        path: PathBuf,
    },

    /// The first extension letter is not a known tool kind
    #[error("First extension letter must be either a k or an f, got '{extension}'")]
    BadExtensionToolKind {
        /// The extension as found on the file name (without the dot).
        extension: String,
    },

    /// The extension does not carry a one or two digit tool size
    #[error("After tool type there must be a one or two digit tool size in the extension, got '{extension}'")]
    BadExtensionRadius {
        /// The extension as found on the file name (without the dot).
        extension: String,
    },

    /// A program line matched none of the accepted move shapes
    #[error("Incorrect instruction at line {line_number}: '{line}'")]
    BadInstructionLine {
        /// 1-based line number of the offending line.
        line_number: usize,
        /// The offending line, verbatim.
        line: String,
    },

    /// The line source failed while reading the program
    #[error("Failed to read program lines: {reason}")]
    Read {
        /// The reason reported by the line source.
        reason: String,
    },
}

impl ParseError {
    /// Line number of a bad instruction, if this error refers to one
    pub fn line_number(&self) -> Option<usize> {
        match self {
            ParseError::BadInstructionLine { line_number, .. } => Some(*line_number),
            _ => None,
        }
    }
}

/// Cut legality error type
///
/// Produced by the cut validator for a single candidate height update. These
/// are local: the offending cell is left alone and the run continues.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CutError {
    /// The cut would carve below the zero plane of the stock
    #[error("Trying to mill negative heights")]
    NegativeHeight,

    /// A flat tool removes material while travelling downwards
    #[error("Trying to move flat tool down while cutting")]
    IllegalFlatPlunge,

    /// A single pass removes more depth than the cutting edge supports
    #[error("Cutting deeper than the tool's cutting length would break the tool")]
    ToolBreakage,
}

impl CutError {
    /// All cut error kinds, in validation order
    pub const ALL: [CutError; 3] = [
        CutError::NegativeHeight,
        CutError::IllegalFlatPlunge,
        CutError::ToolBreakage,
    ];
}

/// Simulation runner error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunnerError {
    /// A run handle is still held; the caller must join before starting again
    #[error("Simulation already running; join the previous run first")]
    AlreadyRunning,

    /// The worker thread could not be spawned
    #[error("Failed to spawn simulation worker: {reason}")]
    SpawnFailed {
        /// The reason reported by the OS.
        reason: String,
    },
}

/// Height grid error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    /// One of the derived grid dimensions is zero
    #[error("Grid dimensions must be positive, got {width}x{height}")]
    ZeroDimension {
        /// Width in cells.
        width: usize,
        /// Height in cells.
        height: usize,
    },

    /// The default depth is negative or not finite
    #[error("Invalid default depth: {depth}")]
    InvalidDepth {
        /// The rejected depth.
        depth: f32,
    },
}

/// Main error type for millsim
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Program parse error
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Runner lifecycle error
    #[error(transparent)]
    Runner(#[from] RunnerError),

    /// Grid sizing error
    #[error(transparent)]
    Grid(#[from] GridError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
