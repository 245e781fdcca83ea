//! State module for tracking crawl runs
//!
//! This module provides the shared state a running crawl writes and status
//! readers poll.
//!
//! # Components
//!
//! - `RunState`: running flag, progress counters and debug log behind one lock
//! - `RunGuard`: write handle owned by the active run; clears the running flag on drop
//! - `DebugLog`: bounded ordered trace of human-readable messages

mod debug_log;
mod run_state;

// Re-export main types
pub use debug_log::DebugLog;
pub use run_state::{Progress, RunGuard, RunSnapshot, RunState, COMPLETION_MARKER};
