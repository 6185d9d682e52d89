//! Configuration Loading
//!
//! TOML configuration split into flat tables of named options:
//! `[general]`, `[screen]`, `[edge_passthrough]`, `[corner_passthrough]`
//! and `[movement_calculation]`. Every option carries a built-in default;
//! missing options use theirs, and out-of-domain values are repaired to
//! theirs with a warning. A broken edit can therefore never take the
//! daemon down, neither at startup nor on a reload signal.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::engine::{EngineConfig, PassConfig, ResistanceTuning};

pub mod types;

pub use types::{GeneralSection, MovementSection, PassthroughSection, ScreenSection};

const DEFAULT_ENABLED: bool = true;
const DEFAULT_CORNER_SIZE_FACTOR: f64 = 0.1;
const DEFAULT_RESISTANCE_MARGINS: i64 = 1;
const DEFAULT_MIN_DELAY: f64 = 0.0;
const DEFAULT_RETURN_GRACE: f64 = 1.0;
const DEFAULT_INPUTS_TO_REMEMBER: i64 = 50;
const DEFAULT_REMEMBER_SECONDS: f64 = 0.15;
const DEFAULT_SLOWDOWN_EXPONENT: f64 = 4.0;
const DEFAULT_SPEEDUP_EXPONENT: f64 = 1.0;
const DEFAULT_CONSTANT_SPEED_EXPONENT: f64 = 0.1;
const DEFAULT_DIRECTION_EXPONENT: f64 = 1.0;
const DEFAULT_SMOOTHING_FACTOR: f64 = 0.05;

// Ceiling for every *Seconds option. No delay or window needs more
// than a day, and far beyond it `Duration::from_secs_f64` panics.
const MAX_OPTION_SECONDS: f64 = 86_400.0;

/// Per-zone delay defaults; corners resist longer than edges out of the
/// box because corner targets (window buttons, panels) are smaller.
struct ZoneDefaults {
    base_delay: f64,
    max_delay: f64,
}

const EDGE_DEFAULTS: ZoneDefaults = ZoneDefaults {
    base_delay: 0.4,
    max_delay: 0.6,
};

const CORNER_DEFAULTS: ZoneDefaults = ZoneDefaults {
    base_delay: 0.7,
    max_delay: 1.0,
};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// General switches
    #[serde(default)]
    pub general: GeneralSection,

    /// Screen geometry handling
    #[serde(default)]
    pub screen: ScreenSection,

    /// Passthrough rules for edge contacts
    #[serde(default)]
    pub edge_passthrough: PassthroughSection,

    /// Passthrough rules for corner contacts
    #[serde(default)]
    pub corner_passthrough: PassthroughSection,

    /// Speed measurement and resistance tuning
    #[serde(default)]
    pub movement_calculation: MovementSection,
}

impl Config {
    /// Default configuration file location, under the XDG config directory
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sticky-edges.toml")
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Load configuration, falling back to the built-in defaults when the
    /// file is missing or unparseable
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "config unavailable, using built-in defaults"
                );
                Self::default_config()
            }
        }
    }

    /// Create default configuration, fully populated
    pub fn default_config() -> Self {
        Config {
            general: GeneralSection {
                enabled: Some(DEFAULT_ENABLED),
            },
            screen: ScreenSection {
                corner_size_factor: Some(DEFAULT_CORNER_SIZE_FACTOR),
                resistance_margins: Some(DEFAULT_RESISTANCE_MARGINS),
            },
            edge_passthrough: PassthroughSection {
                allow_always: Some(false),
                base_delay_of_seconds: Some(EDGE_DEFAULTS.base_delay),
                max_delay_of_seconds: Some(EDGE_DEFAULTS.max_delay),
                min_delay_of_seconds: Some(DEFAULT_MIN_DELAY),
                freely_return_before_seconds: Some(DEFAULT_RETURN_GRACE),
            },
            corner_passthrough: PassthroughSection {
                allow_always: Some(false),
                base_delay_of_seconds: Some(CORNER_DEFAULTS.base_delay),
                max_delay_of_seconds: Some(CORNER_DEFAULTS.max_delay),
                min_delay_of_seconds: Some(DEFAULT_MIN_DELAY),
                freely_return_before_seconds: Some(DEFAULT_RETURN_GRACE),
            },
            movement_calculation: MovementSection {
                no_inputs_to_remember: Some(DEFAULT_INPUTS_TO_REMEMBER),
                remember_for_seconds: Some(DEFAULT_REMEMBER_SECONDS),
                resistance_slowdown_exponent: Some(DEFAULT_SLOWDOWN_EXPONENT),
                resistance_speedup_exponent: Some(DEFAULT_SPEEDUP_EXPONENT),
                resistance_constant_speed_exponent: Some(DEFAULT_CONSTANT_SPEED_EXPONENT),
                resistance_by_direction_exponent: Some(DEFAULT_DIRECTION_EXPONENT),
                passthrough_smoothing_factor: Some(DEFAULT_SMOOTHING_FACTOR),
            },
        }
    }

    /// Write the built-in defaults to a file, creating a template the
    /// user can edit
    pub fn write_default(path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(&Self::default_config())
            .context("Failed to serialize default config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Master switch
    pub fn enabled(&self) -> bool {
        self.general.enabled.unwrap_or(DEFAULT_ENABLED)
    }

    /// Assemble the runtime engine configuration.
    ///
    /// Missing options resolve to their defaults silently; present but
    /// out-of-domain options resolve to their defaults with a warning.
    pub fn engine_config(&self) -> EngineConfig {
        let screen = &self.screen;
        let movement = &self.movement_calculation;

        EngineConfig {
            margins: margins_or(
                screen.resistance_margins,
                DEFAULT_RESISTANCE_MARGINS,
                "ResistanceMargins",
            ),
            corner_size_factor: fraction_or(
                screen.corner_size_factor,
                DEFAULT_CORNER_SIZE_FACTOR,
                "CornerSizeFactor",
            ),
            edge: resolve_pass(&self.edge_passthrough, &EDGE_DEFAULTS, "edge_passthrough"),
            corner: resolve_pass(
                &self.corner_passthrough,
                &CORNER_DEFAULTS,
                "corner_passthrough",
            ),
            tuning: ResistanceTuning {
                slowdown_exponent: exponent_or(
                    movement.resistance_slowdown_exponent,
                    DEFAULT_SLOWDOWN_EXPONENT,
                    "ResistanceSlowdownExponent",
                ),
                speedup_exponent: exponent_or(
                    movement.resistance_speedup_exponent,
                    DEFAULT_SPEEDUP_EXPONENT,
                    "ResistanceSpeedupExponent",
                ),
                constant_speed_exponent: exponent_or(
                    movement.resistance_constant_speed_exponent,
                    DEFAULT_CONSTANT_SPEED_EXPONENT,
                    "ResistanceConstantSpeedExponent",
                ),
                direction_exponent: exponent_or(
                    movement.resistance_by_direction_exponent,
                    DEFAULT_DIRECTION_EXPONENT,
                    "ResistanceByDirectionExponent",
                ),
                smoothing_factor: smoothing_or(
                    movement.passthrough_smoothing_factor,
                    DEFAULT_SMOOTHING_FACTOR,
                    "PassthroughSmoothingFactor",
                ),
            },
            history_capacity: capacity_or(
                movement.no_inputs_to_remember,
                DEFAULT_INPUTS_TO_REMEMBER,
                "NoInputsToRemember",
            ),
            remember_window: Duration::from_secs_f64(seconds_or(
                movement.remember_for_seconds,
                DEFAULT_REMEMBER_SECONDS,
                "RememberForSeconds",
            )),
        }
    }
}

fn resolve_pass(section: &PassthroughSection, defaults: &ZoneDefaults, table: &str) -> PassConfig {
    PassConfig {
        always_pass: section.allow_always.unwrap_or(false),
        base_delay: Duration::from_secs_f64(seconds_or(
            section.base_delay_of_seconds,
            defaults.base_delay,
            &format!("{table}.BaseDelayOfSeconds"),
        )),
        max_delay: Duration::from_secs_f64(seconds_or(
            section.max_delay_of_seconds,
            defaults.max_delay,
            &format!("{table}.MaxDelayOfSeconds"),
        )),
        min_delay: Duration::from_secs_f64(seconds_or(
            section.min_delay_of_seconds,
            DEFAULT_MIN_DELAY,
            &format!("{table}.MinDelayOfSeconds"),
        )),
        return_grace: Duration::from_secs_f64(seconds_or(
            section.freely_return_before_seconds,
            DEFAULT_RETURN_GRACE,
            &format!("{table}.FreelyReturnBeforeSeconds"),
        )),
    }
}

fn seconds_or(value: Option<f64>, default: f64, option: &str) -> f64 {
    match value {
        None => default,
        Some(v) if v.is_finite() && (0.0..=MAX_OPTION_SECONDS).contains(&v) => v,
        Some(v) => {
            warn!(option, value = v, fallback = default, "out-of-range option ignored");
            default
        }
    }
}

fn fraction_or(value: Option<f64>, default: f64, option: &str) -> f64 {
    match value {
        None => default,
        Some(v) if v.is_finite() && (0.0..=1.0).contains(&v) => v,
        Some(v) => {
            warn!(option, value = v, fallback = default, "out-of-range option ignored");
            default
        }
    }
}

// The smoothing factor is a normalization offset; 1.0 would divide by
// zero and anything above flips the factor's sign.
fn smoothing_or(value: Option<f64>, default: f64, option: &str) -> f64 {
    match value {
        None => default,
        Some(v) if v.is_finite() && (0.0..1.0).contains(&v) => v,
        Some(v) => {
            warn!(option, value = v, fallback = default, "out-of-range option ignored");
            default
        }
    }
}

fn exponent_or(value: Option<f64>, default: f64, option: &str) -> f64 {
    match value {
        None => default,
        Some(v) if v.is_finite() => v,
        Some(v) => {
            warn!(option, value = v, fallback = default, "out-of-range option ignored");
            default
        }
    }
}

fn margins_or(value: Option<i64>, default: i64, option: &str) -> i32 {
    match value {
        None => default as i32,
        Some(v) if (0..=10_000).contains(&v) => v as i32,
        Some(v) => {
            warn!(option, value = v, fallback = default, "out-of-range option ignored");
            default as i32
        }
    }
}

fn capacity_or(value: Option<i64>, default: i64, option: &str) -> usize {
    match value {
        None => default as usize,
        Some(v) if (1..=100_000).contains(&v) => v as usize,
        Some(v) => {
            warn!(option, value = v, fallback = default, "out-of-range option ignored");
            default as usize
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Config {
        toml::from_str(content).unwrap()
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let config = parse("");
        let engine = config.engine_config();

        assert!(config.enabled());
        assert_eq!(engine.margins, 1);
        assert_eq!(engine.corner_size_factor, 0.1);
        assert_eq!(engine.history_capacity, 50);
        assert_eq!(engine.remember_window, Duration::from_secs_f64(0.15));

        assert!(!engine.edge.always_pass);
        assert_eq!(engine.edge.base_delay, Duration::from_secs_f64(0.4));
        assert_eq!(engine.edge.max_delay, Duration::from_secs_f64(0.6));
        assert_eq!(engine.edge.min_delay, Duration::ZERO);
        assert_eq!(engine.edge.return_grace, Duration::from_secs(1));

        assert_eq!(engine.corner.base_delay, Duration::from_secs_f64(0.7));
        assert_eq!(engine.corner.max_delay, Duration::from_secs(1));

        assert_eq!(engine.tuning.slowdown_exponent, 4.0);
        assert_eq!(engine.tuning.speedup_exponent, 1.0);
        assert_eq!(engine.tuning.constant_speed_exponent, 0.1);
        assert_eq!(engine.tuning.direction_exponent, 1.0);
        assert_eq!(engine.tuning.smoothing_factor, 0.05);
    }

    #[test]
    fn test_default_config_matches_empty_file() {
        assert_eq!(
            Config::default_config().engine_config(),
            parse("").engine_config()
        );
        assert_eq!(Config::default_config().enabled(), parse("").enabled());
    }

    #[test]
    fn test_full_file_parses_contract_keys() {
        let config = parse(
            r#"
            [general]
            Enabled = false

            [screen]
            CornerSizeFactor = 0.2
            ResistanceMargins = 3

            [edge_passthrough]
            AllowAlways = true
            BaseDelayOfSeconds = 0.5
            MaxDelayOfSeconds = 0.9
            MinDelayOfSeconds = 0.1
            FreelyReturnBeforeSeconds = 2.5

            [corner_passthrough]
            AllowAlways = false
            BaseDelayOfSeconds = 1.0
            MaxDelayOfSeconds = 1.5
            MinDelayOfSeconds = 0.2
            FreelyReturnBeforeSeconds = 3.0

            [movement_calculation]
            NoInputsToRemember = 100
            RememberForSeconds = 0.3
            ResistanceSlowdownExponent = 5.0
            ResistanceSpeedupExponent = 2.0
            ResistanceConstantSpeedExponent = 0.2
            ResistanceByDirectionExponent = 1.5
            PassthroughSmoothingFactor = 0.1
            "#,
        );

        assert!(!config.enabled());

        let engine = config.engine_config();
        assert_eq!(engine.margins, 3);
        assert_eq!(engine.corner_size_factor, 0.2);
        assert!(engine.edge.always_pass);
        assert_eq!(engine.edge.base_delay, Duration::from_secs_f64(0.5));
        assert_eq!(engine.edge.return_grace, Duration::from_secs_f64(2.5));
        assert!(!engine.corner.always_pass);
        assert_eq!(engine.corner.max_delay, Duration::from_secs_f64(1.5));
        assert_eq!(engine.history_capacity, 100);
        assert_eq!(engine.tuning.slowdown_exponent, 5.0);
        assert_eq!(engine.tuning.direction_exponent, 1.5);
        assert_eq!(engine.tuning.smoothing_factor, 0.1);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = parse(
            r#"
            [edge_passthrough]
            AllowAlways = true
            "#,
        );
        let engine = config.engine_config();

        assert!(engine.edge.always_pass);
        // Unset options in the same table keep their defaults.
        assert_eq!(engine.edge.base_delay, Duration::from_secs_f64(0.4));
        // Other tables are untouched.
        assert!(!engine.corner.always_pass);
        assert_eq!(engine.corner.base_delay, Duration::from_secs_f64(0.7));
        assert!(config.enabled());
    }

    #[test]
    fn test_out_of_domain_options_repaired() {
        let config = parse(
            r#"
            [screen]
            CornerSizeFactor = 2.5
            ResistanceMargins = -3

            [edge_passthrough]
            BaseDelayOfSeconds = -0.4
            MaxDelayOfSeconds = 1e20

            [movement_calculation]
            NoInputsToRemember = 0
            PassthroughSmoothingFactor = 1.5
            RememberForSeconds = 1e20
            "#,
        );
        let engine = config.engine_config();

        assert_eq!(engine.corner_size_factor, 0.1);
        assert_eq!(engine.margins, 1);
        assert_eq!(engine.edge.base_delay, Duration::from_secs_f64(0.4));
        assert_eq!(engine.edge.max_delay, Duration::from_secs_f64(0.6));
        assert_eq!(engine.remember_window, Duration::from_secs_f64(0.15));
        assert_eq!(engine.history_capacity, 50);
        assert_eq!(engine.tuning.smoothing_factor, 0.05);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let config = parse(
            r#"
            [general]
            Enabled = true
            SomeFutureOption = "yes"

            [unrelated_table]
            Key = 1
            "#,
        );
        assert!(config.enabled());
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[screen]\nResistanceMargins = 2\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.engine_config().margins, 2);
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist.toml");

        let config = Config::load_or_default(&path);
        assert_eq!(config, Config::default_config());
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[screen\nnot toml").unwrap();

        assert!(Config::load(&path).is_err());
        // The forgiving entry point still comes back with defaults.
        assert_eq!(Config::load_or_default(&path), Config::default_config());
    }

    #[test]
    fn test_write_default_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        Config::write_default(&path).unwrap();
        let loaded = Config::load(&path).unwrap();

        assert_eq!(loaded, Config::default_config());
    }
}
