//! Milling tool with its footprint kernel

use millsim_core::ToolKind;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::profile::{build_tool_profile, ToolProfile};
use crate::gcode::Program;

/// A milling tool bound to a grid resolution
///
/// The profile is only valid for the resolution it was built at; call
/// [`Tool::regenerate`] whenever the grid's pixels-per-unit changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    kind: ToolKind,
    radius: u32,
    cutting_length: f32,
    pixels_per_unit: u32,
    profile: ToolProfile,
}

impl Tool {
    /// Create a tool.
    ///
    /// Without an explicit cutting length the tool can cut as deep as its
    /// diameter in one pass.
    pub fn new(
        kind: ToolKind,
        radius: u32,
        pixels_per_unit: u32,
        cutting_length: Option<f32>,
    ) -> Self {
        let cutting_length = cutting_length.unwrap_or((2 * radius) as f32);
        Self {
            kind,
            radius,
            cutting_length,
            pixels_per_unit,
            profile: build_tool_profile(kind, radius, pixels_per_unit),
        }
    }

    /// The tool a program was written for
    pub fn for_program(program: &Program, pixels_per_unit: u32, cutting_length: Option<f32>) -> Self {
        Self::new(
            program.tool_kind,
            program.tool_radius,
            pixels_per_unit,
            cutting_length,
        )
    }

    /// Rebuild the profile for a new grid resolution
    pub fn regenerate(&mut self, pixels_per_unit: u32) {
        if pixels_per_unit == self.pixels_per_unit {
            return;
        }
        debug!(
            "Regenerating {} profile: {} -> {} px/unit",
            self.kind, self.pixels_per_unit, pixels_per_unit
        );
        self.pixels_per_unit = pixels_per_unit;
        self.profile = build_tool_profile(self.kind, self.radius, pixels_per_unit);
    }

    /// Copy of this tool rebuilt for `pixels_per_unit`
    pub fn regenerated(&self, pixels_per_unit: u32) -> Self {
        let mut tool = self.clone();
        tool.regenerate(pixels_per_unit);
        tool
    }

    pub fn kind(&self) -> ToolKind {
        self.kind
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Deepest cut, in height units, allowed in a single pass
    pub fn cutting_length(&self) -> f32 {
        self.cutting_length
    }

    pub fn pixels_per_unit(&self) -> u32 {
        self.pixels_per_unit
    }

    pub fn profile(&self) -> &ToolProfile {
        &self.profile
    }
}
