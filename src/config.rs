use serde::Deserialize;
use tracing::warn;

use crate::state::{
    GRID_COLUMNS, GRID_COLUMN_SPACING, GRID_ORIGIN_X, GRID_ORIGIN_Y, GRID_ROW_SPACING, HISTORY_DEPTH,
    MAX_SCALE, MIN_SCALE, NODE_HEIGHT, NODE_WIDTH, SOCKET_HIT_RADIUS, ZOOM_STEP,
};

/// What happens when a connection is dropped onto an input socket that
/// already has one.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InputPolicy {
    #[default]
    Reject,
    Replace,
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct ZoomLimits {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min: MIN_SCALE,
            max: MAX_SCALE,
            step: ZOOM_STEP,
        }
    }
}

impl ZoomLimits {
    /// Does not panic on inverted bounds, unlike `f64::clamp`; callers should
    /// still go through [`ZoomLimits::normalized`] first.
    pub fn clamp(&self, scale: f64) -> f64 {
        scale.max(self.min).min(self.max)
    }

    /// Bounds must be finite and positive with `min <= max`. Non-positive or
    /// non-finite values fall back to their defaults; inverted bounds are
    /// swapped.
    pub fn normalized(self) -> Self {
        let defaults = Self::default();
        let positive = |v: f64, fallback: f64| if v.is_finite() && v > 0.0 { v } else { fallback };

        let mut min = positive(self.min, defaults.min);
        let mut max = positive(self.max, defaults.max);
        if min > max {
            std::mem::swap(&mut min, &mut max);
        }
        let step = positive(self.step, defaults.step);

        let normalized = Self { min, max, step };
        if normalized != self {
            warn!(requested = ?self, ?normalized, "zoom limits adjusted");
        }
        normalized
    }
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct GridLayout {
    pub origin_x: f64,
    pub origin_y: f64,
    pub column_spacing: f64,
    pub row_spacing: f64,
    pub columns: usize,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            origin_x: GRID_ORIGIN_X,
            origin_y: GRID_ORIGIN_Y,
            column_spacing: GRID_COLUMN_SPACING,
            row_spacing: GRID_ROW_SPACING,
            columns: GRID_COLUMNS,
        }
    }
}

/// Tunables for a canvas. Every field has a default, so a host may supply
/// partial JSON.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct CanvasConfig {
    pub grid: GridLayout,
    pub zoom: ZoomLimits,
    pub node_width: f64,
    pub node_height: f64,
    pub socket_radius: f64,
    /// Chain the first population `task[0] -> task[1] -> ...`.
    pub seed_chain: bool,
    pub input_policy: InputPolicy,
    pub history_depth: usize,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            grid: GridLayout::default(),
            zoom: ZoomLimits::default(),
            node_width: NODE_WIDTH,
            node_height: NODE_HEIGHT,
            socket_radius: SOCKET_HIT_RADIUS,
            seed_chain: true,
            input_policy: InputPolicy::Reject,
            history_depth: HISTORY_DEPTH,
        }
    }
}

impl CanvasConfig {
    /// Repair host-supplied values that would break the zoom math.
    pub fn normalized(mut self) -> Self {
        self.zoom = self.zoom.normalized();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_grid_constants() {
        let config = CanvasConfig::default();
        assert_eq!(config.grid.origin_x, 100.0);
        assert_eq!(config.grid.column_spacing, 420.0);
        assert_eq!(config.grid.row_spacing, 250.0);
        assert_eq!(config.grid.columns, 3);
        assert_eq!(config.zoom.min, 0.1);
        assert_eq!(config.zoom.max, 2.0);
        assert_eq!(config.input_policy, InputPolicy::Reject);
        assert!(config.seed_chain);
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let config: CanvasConfig =
            serde_json::from_str(r#"{"input_policy":"replace","zoom":{"max":4.0}}"#).unwrap();
        assert_eq!(config.input_policy, InputPolicy::Replace);
        assert_eq!(config.zoom.max, 4.0);
        assert_eq!(config.zoom.min, 0.1);
        assert_eq!(config.node_width, NODE_WIDTH);
    }

    #[test]
    fn zoom_limits_clamp() {
        let limits = ZoomLimits::default();
        assert_eq!(limits.clamp(0.0), 0.1);
        assert_eq!(limits.clamp(3.0), 2.0);
        assert_eq!(limits.clamp(1.3), 1.3);
    }

    #[test]
    fn inverted_bounds_are_swapped() {
        let config: CanvasConfig = serde_json::from_str(r#"{"zoom":{"min":3.0}}"#).unwrap();
        let zoom = config.normalized().zoom;
        assert_eq!(zoom.min, 2.0);
        assert_eq!(zoom.max, 3.0);
        assert_eq!(zoom.clamp(0.5), 2.0);
    }

    #[test]
    fn non_positive_bounds_fall_back_to_defaults() {
        let limits = ZoomLimits { min: 0.0, max: -1.0, step: f64::NAN }.normalized();
        assert_eq!(limits, ZoomLimits::default());
        assert!(limits.clamp(0.0) > 0.0);
    }

    #[test]
    fn clamp_with_inverted_bounds_does_not_panic() {
        let limits = ZoomLimits { min: 3.0, max: 2.0, step: 0.1 };
        assert_eq!(limits.clamp(1.0), 2.0);
    }
}
