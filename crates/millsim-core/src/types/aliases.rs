//! Type aliases for the shared state passed between the caller and the
//! simulation worker.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use millsim_core::types::*;
//!
//! // Instead of: Arc<RwLock<Grid>>
//! let grid: ThreadSafeRw<Grid> = thread_safe_rw(Grid::new(spec)?);
//! ```

use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// A thread-safe, mutex-protected wrapper for cross-thread sharing.
///
/// Uses `parking_lot::Mutex` for better performance than `std::sync::Mutex`.
pub type ThreadSafe<T> = Arc<Mutex<T>>;

/// A thread-safe reader-writer lock wrapper for read-heavy workloads.
///
/// The height grid is shared this way: the simulation worker is the only
/// writer, render collaborators read between stamps.
pub type ThreadSafeRw<T> = Arc<RwLock<T>>;

/// A progress callback receiving (current, total) values.
pub type ProgressCallback = Box<dyn Fn(u64, u64) + Send + Sync>;

/// Wrap a value in `ThreadSafe`
pub fn thread_safe<T>(value: T) -> ThreadSafe<T> {
    Arc::new(Mutex::new(value))
}

/// Wrap a value in `ThreadSafeRw`
pub fn thread_safe_rw<T>(value: T) -> ThreadSafeRw<T> {
    Arc::new(RwLock::new(value))
}
