//! Data models shared by every millsim crate
//!
//! This module provides:
//! - Waypoints in model space (the `y` axis is height)
//! - Tool kinds and their file extension letters
//! - Program instructions
//! - Grid sizing

use serde::{Deserialize, Serialize};
use std::fmt;

/// A resolved 3D target position for tool travel, in model units
///
/// `y` is the height axis; `x` and `z` span the stock surface.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Waypoint {
    /// X-axis position
    pub x: f32,
    /// Height above the stock's zero plane
    pub y: f32,
    /// Depth-axis position
    pub z: f32,
}

impl Waypoint {
    /// Create a waypoint from its model coordinates
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        debug_assert!(
            x.is_finite() && y.is_finite() && z.is_finite(),
            "Waypoint axes must be finite: x={x}, y={y}, z={z}"
        );
        Self { x, y, z }
    }

    /// Project onto the grid plane, truncating toward zero
    pub fn to_grid(&self, pixels_per_unit: u32) -> (i32, i32) {
        let ppu = pixels_per_unit as f32;
        ((self.x * ppu) as i32, (self.z * ppu) as i32)
    }

    /// Linear interpolation between two waypoints
    pub fn lerp(&self, other: &Waypoint, t: f32) -> Waypoint {
        Waypoint {
            x: (1.0 - t) * self.x + t * other.x,
            y: (1.0 - t) * self.y + t * other.y,
            z: (1.0 - t) * self.z + t * other.z,
        }
    }
}

impl fmt::Display for Waypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

/// Milling tool tip shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    /// Flat end mill
    Flat,
    /// Ball (spherical) end mill
    Spherical,
}

impl ToolKind {
    /// Tool kind selected by the first letter of a program file extension
    pub fn from_extension_letter(letter: char) -> Option<Self> {
        match letter {
            'f' => Some(ToolKind::Flat),
            'k' => Some(ToolKind::Spherical),
            _ => None,
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flat => write!(f, "Flat End Mill"),
            Self::Spherical => write!(f, "Ball End Mill"),
        }
    }
}

/// A single program instruction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Instruction {
    /// Linear move to a fully resolved target
    Move {
        /// Target position in model space.
        target: Waypoint,
    },
}

impl Instruction {
    /// The waypoint this instruction moves to, if it is a movement
    pub fn target(&self) -> Option<Waypoint> {
        match self {
            Instruction::Move { target } => Some(*target),
        }
    }
}

/// Sizing of the stock height grid
///
/// The grid is `mesh_size.0 * pixels_per_unit` cells wide and
/// `mesh_size.1 * pixels_per_unit` cells deep, every cell starting at
/// `default_depth`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Stock size in model units (x, z)
    pub mesh_size: (u32, u32),
    /// Grid cells per model unit
    pub pixels_per_unit: u32,
    /// Initial height of every cell
    pub default_depth: f32,
}

impl GridSpec {
    /// Grid dimensions in cells (width, height)
    pub fn dimensions(&self) -> (usize, usize) {
        (
            self.mesh_size.0 as usize * self.pixels_per_unit as usize,
            self.mesh_size.1 as usize * self.pixels_per_unit as usize,
        )
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            mesh_size: (150, 150),
            pixels_per_unit: 10,
            default_depth: 50.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_spec_dimensions() {
        let spec = GridSpec::default();
        assert_eq!(spec.dimensions(), (1500, 1500));

        let spec = GridSpec {
            mesh_size: (20, 8),
            pixels_per_unit: 4,
            default_depth: 1.0,
        };
        assert_eq!(spec.dimensions(), (80, 32));
    }

    #[test]
    fn test_to_grid_truncates_toward_zero() {
        let wp = Waypoint::new(1.26, 0.0, -0.37);
        assert_eq!(wp.to_grid(10), (12, -3));
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Waypoint::new(0.0, 10.0, 0.0);
        let b = Waypoint::new(4.0, 2.0, -8.0);
        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);
        assert_eq!(a.lerp(&b, 0.5), Waypoint::new(2.0, 6.0, -4.0));
    }

    #[test]
    fn test_tool_kind_letters() {
        assert_eq!(ToolKind::from_extension_letter('f'), Some(ToolKind::Flat));
        assert_eq!(ToolKind::from_extension_letter('k'), Some(ToolKind::Spherical));
        assert_eq!(ToolKind::from_extension_letter('x'), None);
        assert_eq!(ToolKind::from_extension_letter('F'), None);
    }

    #[test]
    fn test_instruction_serializes_tagged() {
        let ins = Instruction::Move {
            target: Waypoint::new(1.0, 2.0, 3.0),
        };
        let json = serde_json::to_string(&ins).unwrap();
        assert!(json.contains("\"type\":\"move\""));
        let back: Instruction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ins);
    }
}
