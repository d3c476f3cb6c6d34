//! Applying a tool footprint to the grid
//!
//! Every grid row under the kernel is processed independently, so rows are
//! stamped in parallel with rayon. The outcome of a stamp does not depend on
//! how the rows were scheduled.

use millsim_core::{CutError, Waypoint};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::grid::Grid;
use super::tool::Tool;
use super::validate::validate_cut;

/// Per-kind count of rejected cells
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationCounts {
    pub negative_height: u64,
    pub illegal_flat_plunge: u64,
    pub tool_breakage: u64,
}

impl ViolationCounts {
    /// Count `n` more violations of `kind`
    pub fn add(&mut self, kind: CutError, n: u64) {
        match kind {
            CutError::NegativeHeight => self.negative_height += n,
            CutError::IllegalFlatPlunge => self.illegal_flat_plunge += n,
            CutError::ToolBreakage => self.tool_breakage += n,
        }
    }

    /// Violations counted for `kind`
    pub fn get(&self, kind: CutError) -> u64 {
        match kind {
            CutError::NegativeHeight => self.negative_height,
            CutError::IllegalFlatPlunge => self.illegal_flat_plunge,
            CutError::ToolBreakage => self.tool_breakage,
        }
    }

    /// Violations of every kind
    pub fn total(&self) -> u64 {
        self.negative_height + self.illegal_flat_plunge + self.tool_breakage
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Sum of two counts
    pub fn merge(self, other: ViolationCounts) -> ViolationCounts {
        ViolationCounts {
            negative_height: self.negative_height + other.negative_height,
            illegal_flat_plunge: self.illegal_flat_plunge + other.illegal_flat_plunge,
            tool_breakage: self.tool_breakage + other.tool_breakage,
        }
    }

    /// Kinds with a non-zero count, in validation order
    pub fn iter(&self) -> impl Iterator<Item = (CutError, u64)> + '_ {
        CutError::ALL
            .into_iter()
            .map(|kind| (kind, self.get(kind)))
            .filter(|&(_, n)| n > 0)
    }
}

/// Result of stamping the tool once
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StampOutcome {
    /// Cells whose height went down
    pub cells_cut: u64,
    /// Cells left alone because the cut was illegal
    pub violations: ViolationCounts,
}

impl StampOutcome {
    pub fn merge(self, other: StampOutcome) -> StampOutcome {
        StampOutcome {
            cells_cut: self.cells_cut + other.cells_cut,
            violations: self.violations.merge(other.violations),
        }
    }
}

/// Stamp the tool with its tip at `tool_height` over cell `(center_x, center_z)`.
///
/// For every kernel cell inside the grid the candidate height is
/// `tool_height + offset`. Legal candidates lower the cell to
/// `min(candidate, current)`; illegal ones leave it unchanged and are counted.
/// `from` and `to` are the endpoints of the segment being travelled.
pub fn stamp_tool(
    grid: &mut Grid,
    tool: &Tool,
    center_x: i32,
    center_z: i32,
    tool_height: f32,
    from: &Waypoint,
    to: &Waypoint,
) -> StampOutcome {
    let width = grid.width();
    let height = grid.height() as i64;
    let profile = tool.profile();
    let r = profile.pixel_radius() as i64;
    let (cx, cz) = (center_x as i64, center_z as i64);

    let first_row = (cz - r).max(0);
    let last_row = (cz + r).min(height - 1);
    if first_row > last_row || cx + r < 0 || cx - r >= width as i64 {
        return StampOutcome::default();
    }
    let first_col = (cx - r).max(0) as usize;
    let last_col = (cx + r).min(width as i64 - 1) as usize;

    let kind = tool.kind();
    let cutting_length = tool.cutting_length();
    let rows = &mut grid.heights_mut()[first_row as usize * width..(last_row as usize + 1) * width];

    rows.par_chunks_mut(width)
        .enumerate()
        .map(|(i, row)| {
            let z = first_row + i as i64;
            let dz = (z - cz) as i32;
            let mut outcome = StampOutcome::default();
            for (x, cell) in row
                .iter_mut()
                .enumerate()
                .take(last_col + 1)
                .skip(first_col)
            {
                let dx = (x as i64 - cx) as i32;
                let Some(offset) = profile.offset(dx, dz) else {
                    continue;
                };
                let candidate = tool_height + offset;
                match validate_cut(kind, cutting_length, candidate, *cell, from, to) {
                    Ok(()) => {
                        if candidate < *cell {
                            *cell = candidate;
                            outcome.cells_cut += 1;
                        }
                    }
                    Err(e) => {
                        trace!("Rejected cut at ({}, {}) to {}: {}", x, z, candidate, e);
                        outcome.violations.add(e, 1);
                    }
                }
            }
            outcome
        })
        .reduce(StampOutcome::default, StampOutcome::merge)
}
