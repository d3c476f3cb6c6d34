//! Background simulation runner
//!
//! A run walks every consecutive waypoint pair of a program on a worker
//! thread, rasterizes it and stamps the tool at each cell. The caller keeps
//! the [`Runner`] and can poll progress, cancel, or join for a [`RunReport`].
//!
//! The grid is shared through a reader-writer lock. The worker takes the
//! write lock for one stamp at a time, so readers observe whole stamps.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use millsim_core::{
    thread_safe, CutError, ProgressCallback, RunnerError, ThreadSafe, ThreadSafeRw, Waypoint,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::raster::rasterize_segment;
use crate::gcode::Program;
use crate::stock::{stamp_tool, Grid, StampOutcome, Tool, ViolationCounts};

/// Lifecycle state of a runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunnerState {
    /// No run has been started since the last join
    Idle,
    /// The worker is walking the path
    Running,
    /// Every segment was processed
    Finished,
    /// The worker stopped early on request
    Cancelled,
    /// The worker died without finishing and without a cancel request
    Failed,
}

impl RunnerState {
    /// Returns the name of the state.
    pub fn name(&self) -> &'static str {
        match self {
            RunnerState::Idle => "Idle",
            RunnerState::Running => "Running",
            RunnerState::Finished => "Finished",
            RunnerState::Cancelled => "Cancelled",
            RunnerState::Failed => "Failed",
        }
    }
}

/// Violations of one kind within one segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentViolation {
    /// Index of the segment's first waypoint in the path
    pub segment: usize,
    pub kind: CutError,
    /// Cells rejected for this kind within the segment
    pub count: u64,
}

/// Summary of a run, returned by [`Runner::join`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Waypoint pairs in the program
    pub segments_total: usize,
    /// Waypoint pairs fully processed
    pub segments_completed: usize,
    /// Tool placements
    pub stamps: u64,
    /// Height updates that removed material
    pub cells_cut: u64,
    pub violations: ViolationCounts,
    /// Non-empty per-segment violation counts, in path order
    pub segment_violations: Vec<SegmentViolation>,
    pub cancelled: bool,
    pub elapsed_ms: u64,
}

impl RunReport {
    fn new(segments_total: usize) -> Self {
        Self {
            segments_total,
            ..Self::default()
        }
    }

    fn record(&mut self, outcome: StampOutcome) {
        self.stamps += 1;
        self.cells_cut += outcome.cells_cut;
        self.violations = self.violations.merge(outcome.violations);
    }

    /// Whether every cut of the run was legal
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Flags shared between the runner and its worker
#[derive(Debug, Default)]
struct RunFlags {
    should_exit: AtomicBool,
    finished: AtomicBool,
    segments_done: AtomicUsize,
    segments_total: AtomicUsize,
}

/// Everything the worker thread owns for one run
struct RunJob {
    program: Arc<Program>,
    tool: Arc<Tool>,
    grid: ThreadSafeRw<Grid>,
    flags: Arc<RunFlags>,
    tool_position: ThreadSafe<Waypoint>,
    step_delay: Duration,
    on_progress: Option<Arc<ProgressCallback>>,
}

impl RunJob {
    fn cancelled(&self) -> bool {
        self.flags.should_exit.load(Ordering::SeqCst)
    }

    fn run(self) -> RunReport {
        let started = Instant::now();
        let path = self.program.path();
        let mut report = RunReport::new(self.program.segment_count());

        let (ppu, (half_w, half_h)) = {
            let grid = self.grid.read();
            (grid.pixels_per_unit(), grid.half_extent())
        };
        let tool = if self.tool.pixels_per_unit() == ppu {
            Arc::clone(&self.tool)
        } else {
            warn!(
                "Tool profile built for {} px/unit, grid uses {}; regenerating",
                self.tool.pixels_per_unit(),
                ppu
            );
            Arc::new(self.tool.regenerated(ppu))
        };

        for (segment, pair) in path.windows(2).enumerate() {
            if self.cancelled() {
                report.cancelled = true;
                break;
            }
            let (a, b) = (&pair[0], &pair[1]);
            let (xa, za) = a.to_grid(ppu);
            let (xb, zb) = b.to_grid(ppu);
            let mut segment_violations = ViolationCounts::default();

            if (xa, za) != (xb, zb) {
                for step in rasterize_segment(xa, za, xb, zb) {
                    if self.cancelled() {
                        report.cancelled = true;
                        break;
                    }
                    let tool_height = a.lerp(b, step.progress).y;
                    *self.tool_position.lock() = Waypoint {
                        x: step.x as f32 / ppu as f32,
                        y: tool_height,
                        z: step.z as f32 / ppu as f32,
                    };
                    if !self.step_delay.is_zero() {
                        thread::sleep(self.step_delay);
                    }

                    let outcome = stamp_tool(
                        &mut self.grid.write(),
                        &tool,
                        step.x + half_w,
                        step.z + half_h,
                        tool_height,
                        a,
                        b,
                    );
                    segment_violations = segment_violations.merge(outcome.violations);
                    report.record(outcome);
                }
            } else {
                *self.tool_position.lock() = *b;
                let center_x = (b.x * ppu as f32 + half_w as f32) as i32;
                let center_z = (b.z * ppu as f32 + half_h as f32) as i32;
                let outcome =
                    stamp_tool(&mut self.grid.write(), &tool, center_x, center_z, b.y, a, b);
                segment_violations = segment_violations.merge(outcome.violations);
                report.record(outcome);
            }

            for (kind, count) in segment_violations.iter() {
                warn!(
                    "Segment {} ({} -> {}): {} cells rejected: {}",
                    segment, a, b, count, kind
                );
                report.segment_violations.push(SegmentViolation {
                    segment,
                    kind,
                    count,
                });
            }

            if report.cancelled {
                break;
            }
            report.segments_completed += 1;
            self.flags
                .segments_done
                .store(report.segments_completed, Ordering::SeqCst);
            if let Some(callback) = &self.on_progress {
                (**callback)(
                    report.segments_completed as u64,
                    report.segments_total as u64,
                );
            }
        }

        report.elapsed_ms = started.elapsed().as_millis() as u64;
        if report.cancelled {
            info!(
                "Simulation cancelled after {}/{} segments",
                report.segments_completed, report.segments_total
            );
        } else {
            self.flags.finished.store(true, Ordering::SeqCst);
            info!(
                "Simulation finished: {} segments, {} stamps, {} cells cut, {} violations in {} ms",
                report.segments_total,
                report.stamps,
                report.cells_cut,
                report.violations.total(),
                report.elapsed_ms
            );
        }
        report
    }
}

/// Runs simulations on a background thread
///
/// At most one run is in flight per runner. A finished or cancelled run must
/// be joined before the next one can start.
pub struct Runner {
    flags: Arc<RunFlags>,
    tool_position: ThreadSafe<Waypoint>,
    step_delay: Duration,
    on_progress: Option<Arc<ProgressCallback>>,
    worker: Option<JoinHandle<RunReport>>,
}

impl Runner {
    /// Create a runner that pauses `step_delay` before each rasterized stamp
    pub fn new(step_delay: Duration) -> Self {
        Self {
            flags: Arc::new(RunFlags::default()),
            tool_position: thread_safe(Waypoint::default()),
            step_delay,
            on_progress: None,
            worker: None,
        }
    }

    /// Call `callback(done, total)` on the worker after every segment
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    /// Delay applied before each stamp of runs that are not fast
    pub fn step_delay(&self) -> Duration {
        self.step_delay
    }

    /// Start a run over `program`'s path.
    ///
    /// A fast run skips the per-stamp delay. Fails with
    /// [`RunnerError::AlreadyRunning`] while a previous run is unjoined.
    pub fn start(
        &mut self,
        program: Arc<Program>,
        tool: Arc<Tool>,
        grid: ThreadSafeRw<Grid>,
        fast: bool,
    ) -> Result<(), RunnerError> {
        if self.worker.is_some() {
            warn!("Refusing to start: previous simulation has not been joined");
            return Err(RunnerError::AlreadyRunning);
        }

        self.flags.should_exit.store(false, Ordering::SeqCst);
        self.flags.finished.store(false, Ordering::SeqCst);
        self.flags.segments_done.store(0, Ordering::SeqCst);
        self.flags
            .segments_total
            .store(program.segment_count(), Ordering::SeqCst);

        let step_delay = if fast { Duration::ZERO } else { self.step_delay };
        info!(
            "Starting simulation: {} segments, {} radius {}, delay {:?}",
            program.segment_count(),
            tool.kind(),
            tool.radius(),
            step_delay
        );

        let job = RunJob {
            program,
            tool,
            grid,
            flags: Arc::clone(&self.flags),
            tool_position: Arc::clone(&self.tool_position),
            step_delay,
            on_progress: self.on_progress.clone(),
        };
        let handle = thread::Builder::new()
            .name("millsim-worker".to_string())
            .spawn(move || job.run())
            .map_err(|e| RunnerError::SpawnFailed {
                reason: e.to_string(),
            })?;

        self.worker = Some(handle);
        Ok(())
    }

    /// Ask the worker to stop at its next check.
    ///
    /// Has no effect once the run is finished.
    pub fn cancel(&self) {
        if self.worker.is_some() && !self.is_finished() {
            debug!("Cancelling simulation");
        }
        self.flags.should_exit.store(true, Ordering::SeqCst);
    }

    /// True only once the worker has processed every segment
    pub fn is_finished(&self) -> bool {
        self.flags.finished.load(Ordering::SeqCst)
    }

    /// Fraction of segments processed, `1.0` for paths without segments
    pub fn progress(&self) -> f32 {
        let total = self.flags.segments_total.load(Ordering::SeqCst);
        if total == 0 {
            return if self.worker.is_some() { 1.0 } else { 0.0 };
        }
        self.flags.segments_done.load(Ordering::SeqCst) as f32 / total as f32
    }

    /// Model-space position of the tool at its latest placement
    pub fn tool_position(&self) -> Waypoint {
        *self.tool_position.lock()
    }

    /// State of the current run.
    ///
    /// A stopped worker that was asked to exit reports `Cancelled`, even if it
    /// panicked on the way out; one that stopped on its own without finishing
    /// reports `Failed`.
    pub fn state(&self) -> RunnerState {
        match &self.worker {
            None => RunnerState::Idle,
            Some(_) if self.is_finished() => RunnerState::Finished,
            Some(handle) if handle.is_finished() => {
                if self.flags.should_exit.load(Ordering::SeqCst) {
                    RunnerState::Cancelled
                } else {
                    RunnerState::Failed
                }
            }
            Some(_) => RunnerState::Running,
        }
    }

    /// Wait for the worker and collect its report.
    ///
    /// Returns `None` when no run was started or the worker panicked. The
    /// runner is idle afterwards.
    pub fn join(&mut self) -> Option<RunReport> {
        let handle = self.worker.take()?;
        let report = match handle.join() {
            Ok(report) => Some(report),
            Err(_) => {
                error!("Simulation worker panicked");
                None
            }
        };
        self.flags.should_exit.store(false, Ordering::SeqCst);
        report
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl Drop for Runner {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.cancel();
            let _ = self.join();
        }
    }
}
