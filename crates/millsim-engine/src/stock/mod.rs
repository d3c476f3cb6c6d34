//! Stock removal
//!
//! The height grid, tool footprints, cut legality and the stamp that ties
//! them together.

pub mod grid;
pub mod profile;
pub mod stamp;
pub mod tool;
pub mod validate;

pub use grid::{Grid, GridSnapshot};
pub use profile::{build_tool_profile, ToolProfile};
pub use stamp::{stamp_tool, StampOutcome, ViolationCounts};
pub use tool::Tool;
pub use validate::validate_cut;
