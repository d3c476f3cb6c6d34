//! Application-level types for the root crate

use std::fmt;
use std::path::PathBuf;

use millsim_core::ToolKind;
use millsim_engine::RunReport;
use serde::Serialize;

/// Outcome of simulating one program file
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    pub program: PathBuf,
    pub tool_kind: ToolKind,
    pub tool_radius: u32,
    pub cutting_length: f32,
    /// Grid size in cells
    pub grid_dimensions: (usize, usize),
    pub report: RunReport,
    /// Cubic model units removed from the stock
    pub removed_volume: f64,
    pub min_height: f32,
    pub max_height: f32,
}

impl SimulationSummary {
    /// Whether the whole program ran and every cut was legal
    pub fn is_success(&self) -> bool {
        !self.report.cancelled && self.report.is_clean()
    }
}

impl fmt::Display for SimulationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = &self.report;
        writeln!(f, "Program:    {}", self.program.display())?;
        writeln!(
            f,
            "Tool:       {} radius {} (cutting length {})",
            self.tool_kind, self.tool_radius, self.cutting_length
        )?;
        writeln!(
            f,
            "Grid:       {}x{} cells",
            self.grid_dimensions.0, self.grid_dimensions.1
        )?;
        writeln!(
            f,
            "Segments:   {}/{}{}",
            report.segments_completed,
            report.segments_total,
            if report.cancelled { " (cancelled)" } else { "" }
        )?;
        writeln!(
            f,
            "Stamps:     {} ({} cells cut)",
            report.stamps, report.cells_cut
        )?;
        writeln!(
            f,
            "Heights:    {:.3} .. {:.3}, removed volume {:.3}",
            self.min_height, self.max_height, self.removed_volume
        )?;

        if report.is_clean() {
            write!(f, "Violations: none")
        } else {
            write!(f, "Violations: {}", report.violations.total())?;
            for (kind, count) in report.violations.iter() {
                write!(f, "\n  {count:>8}  {kind}")?;
            }
            for seg in &report.segment_violations {
                write!(
                    f,
                    "\n  segment {:>4}: {} x {}",
                    seg.segment, seg.count, seg.kind
                )?;
            }
            Ok(())
        }
    }
}
