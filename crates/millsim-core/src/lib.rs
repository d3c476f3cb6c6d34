//! # millsim Core
//!
//! Core types, errors and shared-state aliases for millsim.
//! Provides the data model every other crate speaks: waypoints, tool kinds,
//! instructions and the error taxonomy of the simulator.

pub mod data;
pub mod error;
pub mod types;

pub use data::{GridSpec, Instruction, ToolKind, Waypoint};

pub use error::{CutError, Error, GridError, ParseError, Result, RunnerError};

pub use types::{
    thread_safe, thread_safe_rw, ProgressCallback, ThreadSafe, ThreadSafeRw,
};
