//! Pointer Backend Abstraction
//!
//! Defines the common interface between the daemon and whatever produces
//! pointer events and carries out confinement:
//! - Replay backend (recorded JSONL traces, for diagnostics and tests)
//! - Platform backends (X11/Wayland) live out of tree and plug in here
//!
//! The engine itself never touches a backend; the daemon pulls events
//! from one side and pushes hold/release actuations to the other.

use std::time::Instant;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

use crate::monitor::MonitorRect;

pub mod replay;

pub use replay::ReplayBackend;

/// Result type for backend operations
pub type Result<T> = std::result::Result<T, BackendError>;

/// Backend error types
#[derive(Error, Debug)]
pub enum BackendError {
    /// Trace file could not be opened
    #[error("Failed to open trace {}: {source}", path.display())]
    Open {
        /// Path that was passed to the backend
        path: std::path::PathBuf,
        /// Underlying filesystem error
        source: std::io::Error,
    },

    /// IO error while reading events
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Trace line was not a valid record
    #[error("Malformed trace record on line {line}: {source}")]
    MalformedTrace {
        /// 1-based line number in the trace file
        line: usize,
        /// Parse error from the record decoder
        source: serde_json::Error,
    },

    /// Trace record carried an unusable timestamp
    #[error("Bad timestamp on line {line}: {value}")]
    BadTimestamp {
        /// 1-based line number in the trace file
        line: usize,
        /// The rejected timestamp value
        value: f64,
    },
}

/// One event delivered by a backend
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    /// The pointer moved
    Motion {
        /// Arrival time; live backends stamp receipt, replay maps the
        /// recorded offset onto a fixed base
        timestamp: Instant,
        /// Pointer x position in virtual desktop pixels
        x: i32,
        /// Pointer y position in virtual desktop pixels
        y: i32,
        /// Raw horizontal motion delta that produced the position
        dx: f64,
        /// Raw vertical motion delta that produced the position
        dy: f64,
    },

    /// The monitor layout changed.
    ///
    /// Also delivered once at startup, before any motion, so the daemon
    /// never has to ask for an initial layout.
    Layout {
        /// Arrival time of the change
        timestamp: Instant,
        /// Monitor rectangles in enumeration order
        monitors: Vec<MonitorRect>,
        /// Pointer position at the time of the change
        position: (i32, i32),
    },
}

/// Common backend trait
///
/// Implementations own the platform connection; both the event stream
/// and the confinement actuator go through it. Actuations are
/// idempotent: the daemon applies the engine's decision after every
/// event without tracking what the backend already did.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Backend: Send {
    /// Pull the next event.
    ///
    /// Returns `Ok(None)` when the event source is exhausted; the daemon
    /// shuts down cleanly on it. Live backends never return `None`.
    async fn next_event(&mut self) -> Result<Option<BackendEvent>>;

    /// Confine the pointer to its current monitor and pin it at the
    /// given clamp position. Engages confinement if not already engaged.
    async fn hold_pointer(&mut self, x: i32, y: i32) -> Result<()>;

    /// Disengage confinement, if engaged.
    async fn release_pointer(&mut self) -> Result<()>;
}
