//! Resistance Policy Math
//!
//! Pure functions behind the pass/hold decision: corner-band
//! classification, the exit-probe used to resolve the neighboring
//! monitor, the speed-trend resistance factor, and the clamped
//! passthrough delay.
//!
//! # Resistance factor
//!
//! The factor scales how long the pointer must push against a boundary
//! before it is let through:
//!
//! 1. `ratio = speed_ref / speed_now`, raised to `slowdown_exponent` when
//!    the pointer is decelerating (likely aiming at something near the
//!    edge) or `speedup_exponent` when accelerating.
//! 2. Multiplied by `(|speed_ref − speed_now| / max(both)) ^
//!    constant_speed_exponent`, which pulls the factor toward zero when
//!    speed is nearly constant (a steady push through the edge).
//! 3. When the motion delta has a component perpendicular to the touched
//!    edge, multiplied by `(speed_now / |delta|) ^ direction_exponent`:
//!    motion angled along the edge resists more than a straight push.
//! 4. If either reference speed is zero the factor is exactly 1 and no
//!    division runs.
//! 5. Normalized against `smoothing_factor` so factors just under 1 map
//!    to slightly shorter delays instead of clustering at the base delay.

use std::time::Duration;

use crate::engine::state::Zone;
use crate::monitor::MonitorRect;

/// Passthrough rules for one boundary zone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassConfig {
    /// Let the pointer through without any resistance
    pub always_pass: bool,

    /// Delay the resistance factor scales
    pub base_delay: Duration,

    /// Upper clamp for the scaled delay
    pub max_delay: Duration,

    /// Lower clamp for the scaled delay
    pub min_delay: Duration,

    /// Window after breaking away in which returning is free
    pub return_grace: Duration,
}

/// Exponents and smoothing for the resistance factor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResistanceTuning {
    /// Applied to the speed ratio while decelerating
    pub slowdown_exponent: f64,

    /// Applied to the speed ratio while accelerating
    pub speedup_exponent: f64,

    /// Applied to the normalized speed difference
    pub constant_speed_exponent: f64,

    /// Applied to the edge-perpendicular direction term
    pub direction_exponent: f64,

    /// Normalization offset for the final factor
    pub smoothing_factor: f64,
}

/// Classify a boundary contact at `(x, y)` against `rect`.
///
/// The contact is a corner when the position falls inside the corner band
/// on *both* axes; the band covers `corner_size_factor` of the monitor
/// extent at each end of the axis.
pub fn classify_zone(rect: &MonitorRect, x: i32, y: i32, corner_size_factor: f64) -> Zone {
    let in_h_band = (x as f64) < rect.x as f64 + rect.width as f64 * corner_size_factor
        || (x as f64) > rect.x as f64 + rect.width as f64 * (1.0 - corner_size_factor);
    let in_v_band = (y as f64) < rect.y as f64 + rect.height as f64 * corner_size_factor
        || (y as f64) > rect.y as f64 + rect.height as f64 * (1.0 - corner_size_factor);

    if in_h_band && in_v_band {
        Zone::Corner
    } else {
        Zone::Edge
    }
}

/// Probe point for resolving which monitor the pointer is exiting into.
///
/// The position is nudged by the containment margin toward the far half
/// of the monitor on each axis, so the probe lands inside the neighbor
/// instead of in the dead gap between adjacent monitors. Using the
/// monitor midline rather than the motion delta keeps the probe stable
/// when the delta is zero (re-evaluation without movement).
pub fn exit_probe(rect: &MonitorRect, x: i32, y: i32, margin: i32) -> (i32, i32) {
    let mid_x = rect.x + rect.width / 2;
    let mid_y = rect.y + rect.height / 2;

    let px = if x >= mid_x { x + margin } else { x - margin };
    let py = if y >= mid_y { y + margin } else { y - margin };
    (px, py)
}

/// Resistance factor for a boundary contact at `(x, y)` with motion
/// `(dx, dy)`, given the reference speed (how fast the pointer was
/// already moving a moment ago) and the instantaneous speed.
///
/// Always finite; exactly 1.0 when either speed is zero.
pub fn resistance_factor(
    rect: &MonitorRect,
    x: i32,
    y: i32,
    dx: f64,
    dy: f64,
    speed_ref: f64,
    speed_now: f64,
    tuning: &ResistanceTuning,
) -> f64 {
    // Which edge orientation is being pushed: y inside the monitor's
    // vertical span means a left/right (vertical) edge, x inside the
    // horizontal span means a top/bottom edge. Both can be false past a
    // corner, in which case the direction term is skipped.
    let on_vertical_edge = y >= rect.y && y < rect.bottom();
    let on_horizontal_edge = x >= rect.x && x < rect.right();

    let raw = if speed_ref > 0.0 && speed_now > 0.0 {
        let ratio = speed_ref / speed_now;

        // Decelerating toward the edge resists harder than accelerating
        // through it.
        let mut factor = if speed_ref > speed_now {
            ratio.powf(tuning.slowdown_exponent)
        } else {
            ratio.powf(tuning.speedup_exponent)
        };

        factor *= ((speed_ref - speed_now).abs() / speed_ref.max(speed_now))
            .powf(tuning.constant_speed_exponent);

        if on_vertical_edge && dx != 0.0 {
            factor *= (speed_now / dx.abs()).powf(tuning.direction_exponent);
        } else if on_horizontal_edge && dy != 0.0 {
            factor *= (speed_now / dy.abs()).powf(tuning.direction_exponent);
        }

        factor
    } else {
        1.0
    };

    (raw - tuning.smoothing_factor) / (1.0 - tuning.smoothing_factor)
}

/// Scale the zone's base delay by the resistance factor and clamp the
/// result into `[min_delay, max_delay]`.
///
/// The clamp runs in seconds so a factor below zero (possible after
/// normalization) resolves to `min_delay` instead of reaching `Duration`
/// construction as a negative value. `min_delay` wins if the configured
/// window is inverted.
pub fn adjusted_delay(pass: &PassConfig, factor: f64) -> Duration {
    let scaled = pass.base_delay.as_secs_f64() * factor;
    let clamped = scaled
        .min(pass.max_delay.as_secs_f64())
        .max(pass.min_delay.as_secs_f64());
    Duration::from_secs_f64(clamped)
}
