//! Crossing State
//!
//! Per-pointer bookkeeping between events: which monitor the pointer is
//! on, whether it is pressed against a boundary and since when, and which
//! monitor it last broke away from (for the return-grace window).

use std::time::Instant;

use crate::monitor::MonitorId;

/// Classification of a boundary contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// Contact along an edge, outside the corner bands
    Edge,
    /// Contact inside the corner bands on both axes
    Corner,
}

/// Mutable state of the crossing machine
///
/// Mutated only by the decision engine, once per processed event, and
/// reset wholesale on a monitor layout change so no field can refer to a
/// monitor that no longer exists.
#[derive(Debug, Default)]
pub struct CrossingState {
    /// Monitor the pointer currently belongs to. `None` is a valid
    /// transient state: the pointer was observed outside all monitors and
    /// the engine re-resolves from raw position on the next event.
    pub current_monitor: Option<MonitorId>,

    /// Whether the pointer is currently pressed against a boundary
    pub on_edge: bool,

    /// When the current boundary contact began; meaningful while `on_edge`
    pub edge_touched_at: Option<Instant>,

    /// Monitor the pointer last broke away from, and when it did
    pub broke_from: Option<(MonitorId, Instant)>,

    /// Zone governing the current boundary contact
    pub active_zone: Option<Zone>,
}

impl CrossingState {
    /// Reset to the post-layout-change state: pointer on `monitor` (when
    /// one contains it), not on any edge, no break history.
    pub fn reset(&mut self, monitor: Option<MonitorId>) {
        *self = Self {
            current_monitor: monitor,
            ..Self::default()
        };
    }

    /// Record a boundary contact in `zone` at `now`.
    ///
    /// The contact timer restarts when this is a fresh contact or when the
    /// governing zone changed mid-contact (sliding along the rim from an
    /// edge band into a corner band starts a new countdown). Re-touching
    /// the same zone while already on the edge keeps the running timer.
    pub fn begin_contact(&mut self, zone: Zone, now: Instant) {
        if !self.on_edge || self.active_zone != Some(zone) {
            self.on_edge = true;
            self.edge_touched_at = Some(now);
        }
        self.active_zone = Some(zone);
    }

    /// Record a granted passthrough: the pointer leaves `from` for
    /// `to` (or for the void, when no monitor adjoins the boundary).
    pub fn record_pass(&mut self, from: MonitorId, to: Option<MonitorId>, now: Instant) {
        self.on_edge = false;
        self.broke_from = Some((from, now));
        self.current_monitor = to;
    }

    /// Whether `candidate` is the monitor we broke away from less than
    /// `grace` ago.
    pub fn within_return_grace(
        &self,
        candidate: Option<MonitorId>,
        now: Instant,
        grace: std::time::Duration,
    ) -> bool {
        match (self.broke_from, candidate) {
            (Some((from, at)), Some(to)) => from == to && now.duration_since(at) < grace,
            _ => false,
        }
    }

    /// Clear the on-edge flag after the pointer re-entered the interior
    pub fn leave_edge(&mut self) {
        self.on_edge = false;
    }
}
