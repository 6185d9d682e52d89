//! Edge-Resistance Decision Engine
//!
//! The engine consumes a stream of pointer-motion events and decides, per
//! event, whether the pointer may cross a monitor boundary. Resistance is
//! a function of the recent speed trend (decelerating pointers are likely
//! aiming at something edge-docked), corner proximity, and how long the
//! pointer has been pressing against the boundary.
//!
//! # Data flow
//!
//! ```text
//! pointer event (x, y, dx, dy, t)
//!   └─> PointerHistory ──> speed_ref / speed_now
//!         └─> resistance policy
//!               ├─> containment test (margin)
//!               ├─> exit probe ──> candidate monitor
//!               ├─> zone classification (edge / corner)
//!               ├─> always-pass / return-grace short-circuit
//!               └─> resistance factor ──> adjusted delay vs. dwell time
//!                     └─> Decision { Free | NoMonitor | Passed | Held }
//! ```
//!
//! The engine is synchronous and single-owner: one event is fully
//! processed, and its state changes committed, before the next one is
//! looked at. Confinement itself is carried out by the caller; the engine
//! only reports what should happen.

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::monitor::{MonitorId, MonitorRect, MonitorSet};

pub mod history;
pub mod resistance;
pub mod state;

pub use history::{HistoryError, PointerHistory, PointerSample};
pub use resistance::{PassConfig, ResistanceTuning};
pub use state::{CrossingState, Zone};

/// Runtime engine parameters, assembled from the loaded configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Inward containment margin in pixels; the pointer counts as
    /// "at the boundary" once it leaves the margin-shrunk rectangle
    pub margins: i32,

    /// Fraction of each monitor extent covered by a corner band
    pub corner_size_factor: f64,

    /// Passthrough rules while pressing on an edge
    pub edge: PassConfig,

    /// Passthrough rules while pressing on a corner
    pub corner: PassConfig,

    /// Resistance formula exponents and smoothing
    pub tuning: ResistanceTuning,

    /// Pointer samples the history ring holds
    pub history_capacity: usize,

    /// Maximum age of the sample used as the reference speed
    pub remember_window: Duration,
}

/// Outcome of one processed pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The pointer is outside every known monitor; nothing to resist
    /// until a later event resolves one
    NoMonitor,

    /// The pointer is inside the current monitor's interior; release any
    /// engaged confinement
    Free,

    /// A boundary crossing was granted; the contained monitor changes
    Passed(MonitorId),

    /// The crossing is held back; confine the pointer and clamp it to
    /// the given position inside the current monitor
    Held {
        /// Clamp x position, inside the margin-shrunk monitor rectangle
        x: i32,
        /// Clamp y position, inside the margin-shrunk monitor rectangle
        y: i32,
    },
}

/// The decision engine
///
/// Owns the monitor set, the pointer history and the crossing state.
/// All methods are synchronous; callers drive it from their event loop.
#[derive(Debug)]
pub struct EdgeEngine {
    config: EngineConfig,
    monitors: MonitorSet,
    history: PointerHistory,
    state: CrossingState,
}

impl EdgeEngine {
    /// Create an engine with no monitors.
    ///
    /// Until the first [`on_monitor_set_changed`](Self::on_monitor_set_changed)
    /// every event resolves to [`Decision::NoMonitor`].
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            monitors: MonitorSet::new(),
            history: PointerHistory::new(config.history_capacity),
            state: CrossingState::default(),
        }
    }

    /// Swap the engine configuration between events.
    ///
    /// A changed history capacity rebuilds the ring, pre-filled at the
    /// last known position; otherwise the ring and crossing state are
    /// preserved so a reload does not interrupt an ongoing edge contact.
    pub fn set_config(&mut self, config: EngineConfig) {
        if config.history_capacity != self.history.capacity() {
            let mut fresh = PointerHistory::new(config.history_capacity);
            if let Ok(latest) = self.history.latest() {
                fresh.reset(latest.x, latest.y, latest.timestamp);
            }
            self.history = fresh;
        }
        self.config = config;
    }

    /// Current monitor set
    pub fn monitors(&self) -> &MonitorSet {
        &self.monitors
    }

    /// Monitor the pointer currently belongs to, if any
    pub fn current_monitor(&self) -> Option<MonitorId> {
        self.state.current_monitor
    }

    /// Replace the monitor set after a display layout change.
    ///
    /// Resets the history ring (pre-filled at `position` with zero speed)
    /// and the crossing state, so no stale speed data or break-away
    /// bookkeeping survives into the new layout.
    pub fn on_monitor_set_changed(
        &mut self,
        now: Instant,
        rects: Vec<MonitorRect>,
        position: (i32, i32),
    ) {
        let (x, y) = position;
        self.monitors.replace(rects);
        self.history.reset(x, y, now);

        let current = self.monitors.monitor_at(x, y, 0);
        self.state.reset(current);

        debug!(
            monitors = self.monitors.len(),
            on_monitor = current.is_some(),
            "layout change applied"
        );
    }

    /// Process one pointer-motion event and decide what happens to it.
    ///
    /// `(x, y)` is the pointer position in virtual desktop pixels; `(dx, dy)`
    /// the raw motion delta that produced it. Events must be delivered in
    /// arrival order.
    pub fn on_pointer_moved(
        &mut self,
        now: Instant,
        x: i32,
        y: i32,
        dx: f64,
        dy: f64,
    ) -> Decision {
        // The reference speed is read before this event's sample enters
        // the ring, so an event can never serve as its own reference.
        let speed_ref = self.history.speed_before(now, self.config.remember_window);

        // Degenerate event (no time elapsed since the previous sample):
        // carry the previous speed instead of measuring a meaningless one.
        let speed_now = match self.history.latest() {
            Ok(prev) if now.duration_since(prev.timestamp).is_zero() => prev.speed,
            _ => dx.hypot(dy),
        };

        self.history.push(PointerSample {
            x,
            y,
            speed: speed_now,
            motion_dx: dx,
            motion_dy: dy,
            timestamp: now,
        });

        // Resolve the current monitor; a handle from before a layout
        // change never resolves and is treated the same as having none.
        let current = self
            .state
            .current_monitor
            .and_then(|id| self.monitors.get(id).map(|rect| (id, *rect)));

        let Some((current_id, rect)) = current else {
            let resolved = self.monitors.monitor_at(x, y, 0);
            self.state.current_monitor = resolved;
            return match resolved {
                Some(_) => {
                    debug!(x, y, "pointer re-resolved onto a monitor");
                    Decision::Free
                }
                None => Decision::NoMonitor,
            };
        };

        let margin = self.config.margins;

        // Interior: no boundary logic. The on-edge flag only clears once
        // the pointer is past the stricter margin, so a one-pixel jitter
        // off the boundary does not restart the dwell timer.
        if rect.contains(x, y, margin) {
            if rect.contains(x, y, margin + 1) {
                self.state.leave_edge();
            }
            return Decision::Free;
        }

        let (probe_x, probe_y) = resistance::exit_probe(&rect, x, y, margin);
        let candidate = self.monitors.monitor_at(probe_x, probe_y, 0);

        let zone = resistance::classify_zone(&rect, x, y, self.config.corner_size_factor);
        let pass_cfg = match zone {
            Zone::Corner => self.config.corner,
            Zone::Edge => self.config.edge,
        };

        let pass = if pass_cfg.always_pass
            || self
                .state
                .within_return_grace(candidate, now, pass_cfg.return_grace)
        {
            true
        } else {
            self.state.begin_contact(zone, now);

            let factor = resistance::resistance_factor(
                &rect,
                x,
                y,
                dx,
                dy,
                speed_ref,
                speed_now,
                &self.config.tuning,
            );
            let delay = resistance::adjusted_delay(&pass_cfg, factor);
            let dwelled = self
                .state
                .edge_touched_at
                .is_some_and(|touched| now.duration_since(touched) > delay);

            trace!(
                ?zone,
                speed_ref,
                speed_now,
                factor,
                delay_ms = delay.as_millis() as u64,
                dwelled,
                "boundary contact evaluated"
            );
            dwelled
        };
        self.state.active_zone = Some(zone);

        if pass {
            self.state.record_pass(current_id, candidate, now);
            match candidate {
                Some(next) => {
                    debug!(?zone, "passthrough granted");
                    Decision::Passed(next)
                }
                None => {
                    debug!(?zone, "passthrough granted into unmapped space");
                    Decision::NoMonitor
                }
            }
        } else {
            // Clamp order matters for monitors narrower than twice the
            // margin: the upper bound is applied last and wins.
            let mut clamp_x = x;
            let mut clamp_y = y;
            if clamp_x < rect.x + margin {
                clamp_x = rect.x + margin;
            }
            if clamp_y < rect.y + margin {
                clamp_y = rect.y + margin;
            }
            if clamp_x > rect.right() - margin - 1 {
                clamp_x = rect.right() - margin - 1;
            }
            if clamp_y > rect.bottom() - margin - 1 {
                clamp_y = rect.bottom() - margin - 1;
            }
            Decision::Held {
                x: clamp_x,
                y: clamp_y,
            }
        }
    }
}
