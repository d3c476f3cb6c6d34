//! Stock height grid
//!
//! A row-major field of heights (`z * width + x`). Cells only ever go down
//! during a run; [`Grid::reset`] and [`Grid::resize`] restore them to the
//! default depth.

use millsim_core::{GridError, GridSpec};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Height field of the stock being milled
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    pixels_per_unit: u32,
    default_depth: f32,
    heights: Vec<f32>,
}

/// Owned copy of the grid heights, for rendering or export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSnapshot {
    /// Width in cells
    pub width: usize,
    /// Height in cells
    pub height: usize,
    /// Grid cells per model unit
    pub pixels_per_unit: u32,
    /// Heights, row-major
    pub heights: Vec<f32>,
}

impl GridSnapshot {
    /// Height at (x, z), `None` outside the snapshot
    pub fn get(&self, x: usize, z: usize) -> Option<f32> {
        if x >= self.width || z >= self.height {
            return None;
        }
        self.heights.get(z * self.width + x).copied()
    }
}

fn checked_dimensions(spec: &GridSpec) -> Result<(usize, usize), GridError> {
    let (width, height) = spec.dimensions();
    if width == 0 || height == 0 {
        return Err(GridError::ZeroDimension { width, height });
    }
    if !spec.default_depth.is_finite() || spec.default_depth < 0.0 {
        return Err(GridError::InvalidDepth {
            depth: spec.default_depth,
        });
    }
    Ok((width, height))
}

impl Grid {
    /// Create a grid filled with the default depth
    pub fn new(spec: GridSpec) -> Result<Self, GridError> {
        let (width, height) = checked_dimensions(&spec)?;
        debug!(
            "Creating {}x{} grid at {} px/unit, depth {}",
            width, height, spec.pixels_per_unit, spec.default_depth
        );
        Ok(Self {
            width,
            height,
            pixels_per_unit: spec.pixels_per_unit,
            default_depth: spec.default_depth,
            heights: vec![spec.default_depth; width * height],
        })
    }

    /// Resize to new dimensions, resetting every cell.
    ///
    /// The grid is left untouched if the new sizing is rejected.
    pub fn resize(&mut self, spec: GridSpec) -> Result<(), GridError> {
        *self = Self::new(spec)?;
        Ok(())
    }

    /// Restore every cell to the default depth
    pub fn reset(&mut self) {
        self.heights.fill(self.default_depth);
    }

    /// Width in cells
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in cells
    pub fn height(&self) -> usize {
        self.height
    }

    /// Grid cells per model unit
    pub fn pixels_per_unit(&self) -> u32 {
        self.pixels_per_unit
    }

    /// Initial height of every cell
    pub fn default_depth(&self) -> f32 {
        self.default_depth
    }

    /// Offset that moves model-space grid coordinates to cell indices
    pub fn half_extent(&self) -> (i32, i32) {
        ((self.width / 2) as i32, (self.height / 2) as i32)
    }

    /// Row-major heights
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    pub(crate) fn heights_mut(&mut self) -> &mut [f32] {
        &mut self.heights
    }

    /// Height at cell (x, z), `None` outside the grid
    pub fn get(&self, x: usize, z: usize) -> Option<f32> {
        if x >= self.width || z >= self.height {
            return None;
        }
        Some(self.heights[z * self.width + x])
    }

    /// Overwrite cell (x, z); out-of-range writes are ignored
    pub fn set(&mut self, x: usize, z: usize, value: f32) {
        if x >= self.width || z >= self.height {
            return;
        }
        self.heights[z * self.width + x] = value;
    }

    /// Lowest height in the grid
    pub fn min_height(&self) -> f32 {
        self.heights.iter().copied().fold(f32::INFINITY, f32::min)
    }

    /// Highest height in the grid
    pub fn max_height(&self) -> f32 {
        self.heights
            .iter()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// Material removed so far, in cubic model units
    pub fn removed_volume(&self) -> f64 {
        let cell_area = 1.0 / (self.pixels_per_unit as f64).powi(2);
        self.heights
            .iter()
            .map(|&h| (self.default_depth - h).max(0.0) as f64)
            .sum::<f64>()
            * cell_area
    }

    /// Copy the heights out
    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            width: self.width,
            height: self.height,
            pixels_per_unit: self.pixels_per_unit,
            heights: self.heights.clone(),
        }
    }
}
