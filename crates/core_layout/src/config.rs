//! Layout configuration.
//!
//! Parsed from TOML. Every section and field has a default, so partial
//! files are accepted:
//!
//! ```toml
//! [layout]
//! gap = 12
//! centering = "on_overflow"
//! preset_column_widths = [{ proportion = 0.5 }, { fixed = 900 }]
//!
//! [animations]
//! view_offset = { response = 0.25, damping_ratio = 0.9 }
//! window_open = { duration_ms = 150, bounce = 0.0 }
//! ```
//!
//! Reading files is left to the caller; this module only parses strings.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::animation::SpringConfig;
use crate::geometry::Orientation;
use crate::swipe_tracker::{DEFAULT_DECELERATION_RATE, DEFAULT_HISTORY};
use crate::tree::ColumnWidth;
use crate::viewport::CenteringPolicy;

/// Errors produced while parsing or serializing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// A value that was out of range and has been replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    /// Dotted path of the offending field, e.g. `layout.gap`.
    pub field: String,
    pub message: String,
}

impl ConfigWarning {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Layout configuration.
    pub layout: LayoutConfig,
    /// Animation configuration.
    pub animations: AnimationConfig,
    /// Gesture tuning.
    pub gestures: GestureConfig,
    /// Behavior configuration.
    pub behavior: BehaviorConfig,
}

/// Layout-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Gap between columns and between windows in a column, in points.
    #[serde(default = "default_gap")]
    pub gap: f64,

    /// Gap at the edges of the working area, in points.
    #[serde(default = "default_outer_gap")]
    pub outer_gap: f64,

    /// Maximum windows stacked in one column; 0 means unlimited.
    pub max_windows_per_column: usize,

    /// Columns narrower than `1 / max_visible_columns` of the working area are
    /// widened; 0 disables the limit.
    pub max_visible_columns: usize,

    /// Wrap focus from the last column to the first and back.
    pub infinite_loop: bool,

    /// When the viewport centers the focused column.
    pub centering: CenteringPolicy,

    /// Scroll axis of the strip.
    pub orientation: Orientation,

    /// Widths cycled through by `cycle_column_width`.
    #[serde(default = "default_preset_column_widths")]
    pub preset_column_widths: Vec<ColumnWidth>,

    /// Width given to new columns.
    pub default_column_width: ColumnWidth,

    /// Space reserved for the tab indicator of tabbed columns, in points.
    #[serde(default = "default_tab_indicator_size")]
    pub tab_indicator_size: f64,

    /// Lower bound on a window weight during interactive resize.
    #[serde(default = "default_min_weight")]
    pub min_weight: f64,

    /// Upper bound on a window weight during interactive resize.
    #[serde(default = "default_max_weight")]
    pub max_weight: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            gap: default_gap(),
            outer_gap: default_outer_gap(),
            max_windows_per_column: 0,
            max_visible_columns: 0,
            infinite_loop: false,
            centering: CenteringPolicy::default(),
            orientation: Orientation::default(),
            preset_column_widths: default_preset_column_widths(),
            default_column_width: ColumnWidth::default(),
            tab_indicator_size: default_tab_indicator_size(),
            min_weight: default_min_weight(),
            max_weight: default_max_weight(),
        }
    }
}

fn default_gap() -> f64 {
    10.0
}

fn default_outer_gap() -> f64 {
    10.0
}

fn default_preset_column_widths() -> Vec<ColumnWidth> {
    vec![
        ColumnWidth::Proportion(1.0 / 3.0),
        ColumnWidth::Proportion(0.5),
        ColumnWidth::Proportion(2.0 / 3.0),
    ]
}

fn default_tab_indicator_size() -> f64 {
    6.0
}

fn default_min_weight() -> f64 {
    0.1
}

fn default_max_weight() -> f64 {
    10.0
}

/// Spring parameters as written in the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpringParams {
    Physics { response: f64, damping_ratio: f64 },
    Duration { duration_ms: u64, bounce: f64 },
}

impl SpringParams {
    pub fn to_spring_config(self) -> SpringConfig {
        match self {
            SpringParams::Physics {
                response,
                damping_ratio,
            } => SpringConfig::new(response, damping_ratio),
            SpringParams::Duration {
                duration_ms,
                bounce,
            } => SpringConfig::from_duration_bounce(Duration::from_millis(duration_ms), bounce),
        }
    }
}

/// The animated properties that have their own spring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationKind {
    ViewOffset,
    WindowMovement,
    ColumnWidth,
    WorkspaceSwitch,
    WindowOpen,
}

/// Animation-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Whether transitions animate at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Replace every spring with a near-instant one and shrink the
    /// workspace-switch travel.
    pub reduced_motion: bool,

    /// Refresh rate of the display, used to scale completion epsilons.
    #[serde(default = "default_refresh_hz")]
    pub display_refresh_hz: f64,

    #[serde(default = "default_view_offset_spring")]
    pub view_offset: SpringParams,

    #[serde(default = "default_window_movement_spring")]
    pub window_movement: SpringParams,

    #[serde(default = "default_column_width_spring")]
    pub column_width: SpringParams,

    #[serde(default = "default_workspace_switch_spring")]
    pub workspace_switch: SpringParams,

    #[serde(default = "default_window_open_spring")]
    pub window_open: SpringParams,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reduced_motion: false,
            display_refresh_hz: default_refresh_hz(),
            view_offset: default_view_offset_spring(),
            window_movement: default_window_movement_spring(),
            column_width: default_column_width_spring(),
            workspace_switch: default_workspace_switch_spring(),
            window_open: default_window_open_spring(),
        }
    }
}

impl AnimationConfig {
    /// Spring for `kind`, or `None` when animations are disabled.
    pub fn spring(&self, kind: AnimationKind) -> Option<SpringConfig> {
        if !self.enabled {
            return None;
        }
        let params = match kind {
            AnimationKind::ViewOffset => self.view_offset,
            AnimationKind::WindowMovement => self.window_movement,
            AnimationKind::ColumnWidth => self.column_width,
            AnimationKind::WorkspaceSwitch => self.workspace_switch,
            AnimationKind::WindowOpen => self.window_open,
        };
        let config = params
            .to_spring_config()
            .with_refresh_rate(self.display_refresh_hz);
        Some(if self.reduced_motion {
            config.reduced_motion()
        } else {
            config
        })
    }
}

fn default_true() -> bool {
    true
}

fn default_refresh_hz() -> f64 {
    60.0
}

fn default_view_offset_spring() -> SpringParams {
    SpringParams::Physics {
        response: 0.3,
        damping_ratio: 1.0,
    }
}

fn default_window_movement_spring() -> SpringParams {
    SpringParams::Physics {
        response: 0.3,
        damping_ratio: 1.0,
    }
}

fn default_column_width_spring() -> SpringParams {
    SpringParams::Physics {
        response: 0.3,
        damping_ratio: 1.0,
    }
}

fn default_workspace_switch_spring() -> SpringParams {
    SpringParams::Physics {
        response: 0.25,
        damping_ratio: 1.0,
    }
}

fn default_window_open_spring() -> SpringParams {
    SpringParams::Duration {
        duration_ms: 150,
        bounce: 0.0,
    }
}

/// Gesture tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Per-millisecond deceleration used to project a released swipe.
    #[serde(default = "default_deceleration_rate")]
    pub deceleration_rate: f64,

    /// Length of the velocity history window, in milliseconds.
    #[serde(default = "default_history_ms")]
    pub history_ms: u64,

    /// Pointer travel, in points, before a drag turns into a move.
    #[serde(default = "default_move_threshold")]
    pub move_threshold: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            deceleration_rate: default_deceleration_rate(),
            history_ms: default_history_ms(),
            move_threshold: default_move_threshold(),
        }
    }
}

impl GestureConfig {
    pub fn history(&self) -> Duration {
        Duration::from_millis(self.history_ms)
    }
}

fn default_deceleration_rate() -> f64 {
    DEFAULT_DECELERATION_RATE
}

fn default_history_ms() -> u64 {
    DEFAULT_HISTORY.as_millis() as u64
}

fn default_move_threshold() -> f64 {
    8.0
}

/// Behavior-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize to a TOML document.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Replace out-of-range values with usable ones.
    ///
    /// Never fails; every replaced value is reported as a warning.
    pub fn validate(&mut self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let layout = &mut self.layout;

        if !layout.gap.is_finite() || layout.gap < 0.0 {
            warnings.push(ConfigWarning::new(
                "layout.gap",
                format!("gap must be non-negative, got {}; using {}", layout.gap, default_gap()),
            ));
            layout.gap = default_gap();
        }
        if !layout.outer_gap.is_finite() || layout.outer_gap < 0.0 {
            warnings.push(ConfigWarning::new(
                "layout.outer_gap",
                format!(
                    "outer_gap must be non-negative, got {}; using {}",
                    layout.outer_gap,
                    default_outer_gap()
                ),
            ));
            layout.outer_gap = default_outer_gap();
        }
        if !layout.tab_indicator_size.is_finite() || layout.tab_indicator_size < 0.0 {
            warnings.push(ConfigWarning::new(
                "layout.tab_indicator_size",
                "tab_indicator_size must be non-negative; using 0",
            ));
            layout.tab_indicator_size = 0.0;
        }

        let before = layout.preset_column_widths.len();
        layout
            .preset_column_widths
            .retain(|width| column_width_is_valid(*width));
        if layout.preset_column_widths.len() != before {
            warnings.push(ConfigWarning::new(
                "layout.preset_column_widths",
                format!(
                    "dropped {} invalid preset(s); proportions must be in (0, 1] and fixed widths positive",
                    before - layout.preset_column_widths.len()
                ),
            ));
        }
        if layout.preset_column_widths.is_empty() {
            warnings.push(ConfigWarning::new(
                "layout.preset_column_widths",
                "no presets configured; using defaults",
            ));
            layout.preset_column_widths = default_preset_column_widths();
        }
        if !column_width_is_valid(layout.default_column_width) {
            warnings.push(ConfigWarning::new(
                "layout.default_column_width",
                format!(
                    "invalid default width {:?}; using {:?}",
                    layout.default_column_width,
                    ColumnWidth::default()
                ),
            ));
            layout.default_column_width = ColumnWidth::default();
        }

        if !layout.min_weight.is_finite() || layout.min_weight <= 0.0 {
            warnings.push(ConfigWarning::new(
                "layout.min_weight",
                format!("min_weight must be positive; using {}", default_min_weight()),
            ));
            layout.min_weight = default_min_weight();
        }
        if !layout.max_weight.is_finite() || layout.max_weight < layout.min_weight {
            warnings.push(ConfigWarning::new(
                "layout.max_weight",
                format!(
                    "max_weight must be at least min_weight ({}); using {}",
                    layout.min_weight,
                    layout.min_weight.max(default_max_weight())
                ),
            ));
            layout.max_weight = layout.min_weight.max(default_max_weight());
        }

        let animations = &mut self.animations;
        if !animations.display_refresh_hz.is_finite() || animations.display_refresh_hz <= 0.0 {
            warnings.push(ConfigWarning::new(
                "animations.display_refresh_hz",
                format!("refresh rate must be positive; using {}", default_refresh_hz()),
            ));
            animations.display_refresh_hz = default_refresh_hz();
        }
        for (field, params, fallback) in [
            ("animations.view_offset", &mut animations.view_offset, default_view_offset_spring()),
            (
                "animations.window_movement",
                &mut animations.window_movement,
                default_window_movement_spring(),
            ),
            ("animations.column_width", &mut animations.column_width, default_column_width_spring()),
            (
                "animations.workspace_switch",
                &mut animations.workspace_switch,
                default_workspace_switch_spring(),
            ),
            ("animations.window_open", &mut animations.window_open, default_window_open_spring()),
        ] {
            if !spring_params_are_valid(*params) {
                warnings.push(ConfigWarning::new(
                    field,
                    "response/duration must be positive and damping in [0, 1]; using default",
                ));
                *params = fallback;
            }
        }

        let gestures = &mut self.gestures;
        if !(0.0..1.0).contains(&gestures.deceleration_rate) || gestures.deceleration_rate == 0.0 {
            warnings.push(ConfigWarning::new(
                "gestures.deceleration_rate",
                format!(
                    "deceleration_rate must be in (0, 1); using {}",
                    default_deceleration_rate()
                ),
            ));
            gestures.deceleration_rate = default_deceleration_rate();
        }
        if gestures.history_ms == 0 {
            warnings.push(ConfigWarning::new(
                "gestures.history_ms",
                format!("history_ms must be positive; using {}", default_history_ms()),
            ));
            gestures.history_ms = default_history_ms();
        }
        if !gestures.move_threshold.is_finite() || gestures.move_threshold < 0.0 {
            warnings.push(ConfigWarning::new(
                "gestures.move_threshold",
                format!("move_threshold must be non-negative; using {}", default_move_threshold()),
            ));
            gestures.move_threshold = default_move_threshold();
        }

        let level = self.behavior.log_level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            warnings.push(ConfigWarning::new(
                "behavior.log_level",
                format!(
                    "unknown log level '{}'; using {}",
                    self.behavior.log_level,
                    default_log_level()
                ),
            ));
            self.behavior.log_level = default_log_level();
        } else {
            self.behavior.log_level = level;
        }

        warnings
    }
}

fn column_width_is_valid(width: ColumnWidth) -> bool {
    match width {
        ColumnWidth::Proportion(p) => p > 0.0 && p <= 1.0,
        ColumnWidth::Fixed(px) => px > 0.0 && px.is_finite(),
    }
}

fn spring_params_are_valid(params: SpringParams) -> bool {
    match params {
        SpringParams::Physics {
            response,
            damping_ratio,
        } => response > 0.0 && response.is_finite() && (0.0..=1.0).contains(&damping_ratio),
        SpringParams::Duration {
            duration_ms,
            bounce,
        } => duration_ms > 0 && (0.0..1.0).contains(&bounce),
    }
}
