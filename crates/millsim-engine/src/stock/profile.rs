//! Tool footprint kernels
//!
//! A [`ToolProfile`] is a square kernel of side `2 * pixel_radius + 1`
//! centred on the tool axis. Each cell holds the height offset of the tool
//! tip above its lowest point, or `None` where the tool does not reach.

use millsim_core::ToolKind;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Precomputed footprint of a tool at a given grid resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolProfile {
    pixel_radius: u32,
    size: usize,
    cells: Vec<Option<f32>>,
}

impl ToolProfile {
    /// Tool radius in grid cells
    pub fn pixel_radius(&self) -> u32 {
        self.pixel_radius
    }

    /// Side length of the kernel
    pub fn size(&self) -> usize {
        self.size
    }

    /// Kernel cells, row-major
    pub fn cells(&self) -> &[Option<f32>] {
        &self.cells
    }

    /// Offset at kernel coordinates relative to the centre.
    ///
    /// Returns `None` outside the kernel or where the tool does not touch.
    pub fn offset(&self, dx: i32, dz: i32) -> Option<f32> {
        let r = self.pixel_radius as i32;
        if dx.abs() > r || dz.abs() > r {
            return None;
        }
        let index = (dz + r) as usize * self.size + (dx + r) as usize;
        self.cells.get(index).copied().flatten()
    }

    /// Number of cells the tool touches
    pub fn contact_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

/// Build the footprint kernel of a tool.
///
/// A flat tool touches a cell, at offset zero, when the cell's
/// half-pixel-shifted centre lies inside the tool radius. A spherical tool
/// touches every cell within the pixel radius, at the height of the ball
/// surface above its lowest point.
pub fn build_tool_profile(kind: ToolKind, radius: u32, pixels_per_unit: u32) -> ToolProfile {
    let ppu = pixels_per_unit.max(1);
    let pixel_radius = radius * ppu;
    let r = pixel_radius as i32;
    let size = 2 * pixel_radius as usize + 1;

    let cells = (-r..=r)
        .flat_map(|dz| (-r..=r).map(move |dx| (dx, dz)))
        .map(|(dx, dz)| match kind {
            ToolKind::Flat => flat_offset(dx, dz, radius, ppu),
            ToolKind::Spherical => spherical_offset(dx, dz, radius, pixel_radius),
        })
        .collect();

    let profile = ToolProfile {
        pixel_radius,
        size,
        cells,
    };
    debug!(
        "Built {} profile: radius {} at {} px/unit, {}x{} kernel, {} contact cells",
        kind,
        radius,
        ppu,
        size,
        size,
        profile.contact_cells()
    );
    profile
}

fn flat_offset(dx: i32, dz: i32, radius: u32, ppu: u32) -> Option<f32> {
    let ppu = ppu as f64;
    let fx = (dx as f64 + 0.5) / ppu;
    let fz = (dz as f64 + 0.5) / ppu;
    let radius = radius as f64;
    (fx * fx + fz * fz <= radius * radius).then_some(0.0)
}

fn spherical_offset(dx: i32, dz: i32, radius: u32, pixel_radius: u32) -> Option<f32> {
    if pixel_radius == 0 {
        return Some(0.0);
    }
    let pr = pixel_radius as f32;
    let (px, pz) = (dx as f32, dz as f32);
    if px * px + pz * pz > pr * pr {
        return None;
    }
    let radius = radius as f32;
    let r = (px * px + pz * pz).sqrt() / pr * radius;
    // Rounding can push r a hair past the radius on the rim.
    let depth = (radius * radius - r * r).max(0.0).sqrt();
    Some(radius - depth)
}
