//! Configuration type definitions
//!
//! Every option is optional on disk; a missing or out-of-domain value
//! falls back to its built-in default when the runtime configuration is
//! assembled, so a partial or partially-broken file never prevents
//! startup.

use serde::{Deserialize, Serialize};

/// `[general]` table
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct GeneralSection {
    /// Master switch; when `false` motion events are ignored entirely
    pub enabled: Option<bool>,
}

/// `[screen]` table
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct ScreenSection {
    /// Fraction of each monitor edge counted as a corner band
    pub corner_size_factor: Option<f64>,

    /// Inward containment margin in pixels
    pub resistance_margins: Option<i64>,
}

/// `[edge_passthrough]` and `[corner_passthrough]` tables
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct PassthroughSection {
    /// Skip resistance for this zone entirely
    pub allow_always: Option<bool>,

    /// Base passthrough delay before resistance scaling
    pub base_delay_of_seconds: Option<f64>,

    /// Upper clamp for the scaled delay
    pub max_delay_of_seconds: Option<f64>,

    /// Lower clamp for the scaled delay
    pub min_delay_of_seconds: Option<f64>,

    /// Returning to the monitor left less than this many seconds ago is
    /// never resisted
    pub freely_return_before_seconds: Option<f64>,
}

/// `[movement_calculation]` table
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct MovementSection {
    /// Pointer samples kept for the speed-trend reference
    pub no_inputs_to_remember: Option<i64>,

    /// Maximum age of the sample used as the reference speed
    pub remember_for_seconds: Option<f64>,

    /// Exponent on the speed ratio while decelerating
    pub resistance_slowdown_exponent: Option<f64>,

    /// Exponent on the speed ratio while accelerating
    pub resistance_speedup_exponent: Option<f64>,

    /// Exponent on the normalized speed difference
    pub resistance_constant_speed_exponent: Option<f64>,

    /// Exponent on the edge-perpendicular direction term
    pub resistance_by_direction_exponent: Option<f64>,

    /// Normalization offset for the final resistance factor
    pub passthrough_smoothing_factor: Option<f64>,
}
