//! # sticky-edges
//!
//! Pointer edge resistance for multi-monitor desktops. The pointer is
//! briefly held back at monitor boundaries so targets docked against an
//! edge (scrollbars, panels, window buttons) stay reachable at speed;
//! deliberate crossings pass after a short, speed-sensitive delay.
//!
//! # Architecture
//!
//! ```text
//! backend ──events──> daemon loop ──> engine ──> Decision
//!    ▲                    │             ├─ monitor set
//!    │                    │             ├─ pointer history ring
//!    └──hold/release──────┘             └─ resistance policy
//!                         │
//!                 SIGHUP reload <── config (TOML)
//! ```
//!
//! The engine is synchronous and platform-free; everything that touches
//! the window system sits behind the [`backend::Backend`] trait. This
//! crate ships the trace-replay backend; live backends plug in from
//! outside.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Event source and confinement actuator seam
pub mod backend;

/// Configuration loading and defaults
pub mod config;

/// Daemon event loop
pub mod daemon;

/// Edge-resistance decision engine
pub mod engine;

/// Monitor geometry and containment lookup
pub mod monitor;
