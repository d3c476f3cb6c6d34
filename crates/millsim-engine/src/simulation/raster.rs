//! Segment rasterization
//!
//! Integer Bresenham walk over the grid plane. Every emitted cell carries a
//! progress value used to interpolate the tool height along the segment.

use serde::{Deserialize, Serialize};

/// One rasterized cell of a segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RasterStep {
    pub x: i32,
    pub z: i32,
    /// Fraction of the segment travelled, in `[0, 1)`
    pub progress: f32,
}

/// Lazy Bresenham walk from one grid cell to another.
///
/// The axis with the larger delta is primary and advances on every step; on
/// a tie `z` is primary. Progress counts axis moves, so a diagonal step
/// counts twice, over a denominator of `|dx| + |dz| + 1`. The first cell has
/// progress 0 and the last one stays strictly below 1.
///
/// Cloning a walk gives an independent cursor from the same position, so a
/// walk can be replayed.
#[derive(Debug, Clone)]
pub struct SegmentRaster {
    x: i32,
    z: i32,
    x_primary: bool,
    step_x: i32,
    step_z: i32,
    decision: i64,
    primary_inc: i64,
    diagonal_inc: i64,
    moves: u32,
    total: f32,
    remaining: usize,
    started: bool,
}

/// Walk the cells from `(xa, za)` to `(xb, zb)`, both ends included.
///
/// Equal endpoints yield the single start cell.
pub fn rasterize_segment(xa: i32, za: i32, xb: i32, zb: i32) -> SegmentRaster {
    let dx = (xb as i64 - xa as i64).abs();
    let dz = (zb as i64 - za as i64).abs();
    let x_primary = dx > dz;
    let (major, minor) = if x_primary { (dx, dz) } else { (dz, dx) };

    SegmentRaster {
        x: xa,
        z: za,
        x_primary,
        step_x: (xb as i64 - xa as i64).signum() as i32,
        step_z: (zb as i64 - za as i64).signum() as i32,
        decision: 2 * minor - major,
        primary_inc: 2 * minor,
        diagonal_inc: 2 * (minor - major),
        moves: 0,
        total: (dx + dz + 1) as f32,
        remaining: major as usize + 1,
        started: false,
    }
}

impl SegmentRaster {
    fn current(&self) -> RasterStep {
        RasterStep {
            x: self.x,
            z: self.z,
            progress: self.moves as f32 / self.total,
        }
    }

    fn advance(&mut self) {
        if self.x_primary {
            self.x += self.step_x;
        } else {
            self.z += self.step_z;
        }
        self.moves += 1;

        if self.decision < 0 {
            self.decision += self.primary_inc;
        } else {
            self.moves += 1;
            if self.x_primary {
                self.z += self.step_z;
            } else {
                self.x += self.step_x;
            }
            self.decision += self.diagonal_inc;
        }
    }
}

impl Iterator for SegmentRaster {
    type Item = RasterStep;

    fn next(&mut self) -> Option<RasterStep> {
        if self.remaining == 0 {
            return None;
        }
        if self.started {
            self.advance();
        } else {
            self.started = true;
        }
        self.remaining -= 1;
        Some(self.current())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for SegmentRaster {}

impl std::iter::FusedIterator for SegmentRaster {}
