//! Simulation of a program over the stock

pub mod raster;
pub mod runner;

pub use raster::{rasterize_segment, RasterStep, SegmentRaster};
pub use runner::{RunReport, Runner, RunnerState, SegmentViolation};
