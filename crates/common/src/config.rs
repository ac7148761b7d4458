use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::Color;
use crate::tier::Tier;

/// Configuration supplied by the embedding caller at mount time.
///
/// All fields are optional in serialized form; omitted fields take the
/// documented defaults. `node_count: None` means "use the tier default".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Node count override. `None` uses `Tier::default_node_count`.
    pub node_count: Option<usize>,
    /// Upper bound (exclusive) on per-node connection list length.
    pub connection_limit: usize,
    /// Color of weak/inactive elements.
    pub color1: Color,
    /// Color of strong/active elements.
    pub color2: Color,
    /// Multiplier on activation probability and pulse decay speed.
    pub pulse_speed: f32,
    /// Defer scene build until the mount first becomes visible.
    pub lazy_load: bool,
    /// Pre-trigger margin for the visibility gate, in pixels.
    pub lazy_load_margin_px: f32,
    /// Render a static text placeholder instead of any graphics context
    /// when the resolved tier is `Low`.
    pub disable_on_low_end: bool,
    /// Bypass probing entirely and use this tier.
    pub force_quality: Option<Tier>,
    /// Enable the closed-loop quality controller.
    pub adaptive_quality: bool,
    /// Show the performance overlay in the desktop app.
    pub show_performance_stats: bool,
    pub adaptive: AdaptiveOptions,
}

/// Tuning knobs for the quality controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveOptions {
    /// Frame-rate floor below which a downgrade is applied.
    pub min_frame_rate: f32,
    /// Consecutive frames at or above the upgrade threshold required
    /// before a tier upgrade (hysteresis).
    pub upgrade_after_frames: u32,
    /// Log every quality evaluation through `tracing`.
    pub enable_metrics_logging: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            node_count: None,
            connection_limit: 4,
            color1: Color::rgb(0.29, 0.62, 1.0),
            color2: Color::rgb(0.55, 0.36, 0.96),
            pulse_speed: 1.0,
            lazy_load: false,
            lazy_load_margin_px: 200.0,
            disable_on_low_end: false,
            force_quality: None,
            adaptive_quality: true,
            show_performance_stats: false,
            adaptive: AdaptiveOptions::default(),
        }
    }
}

impl Default for AdaptiveOptions {
    fn default() -> Self {
        Self {
            min_frame_rate: 40.0,
            upgrade_after_frames: 300,
            enable_metrics_logging: false,
        }
    }
}

/// Rejected configuration. Raised at mount time, before any scene exists.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("pulse_speed must be finite and positive, got {0}")]
    BadPulseSpeed(f32),
    #[error("min_frame_rate must be finite and positive, got {0}")]
    BadFrameRateFloor(f32),
    #[error("upgrade_after_frames must be at least 1")]
    ZeroUpgradeWindow,
    #[error("colors must have finite components")]
    NonFiniteColor,
    #[error("lazy_load_margin_px must be finite and non-negative, got {0}")]
    BadLazyLoadMargin(f32),
}

impl SceneConfig {
    /// Validate caller-supplied values. Degenerate but renderable inputs
    /// (node_count 0 or 1, connection_limit <= 1) are deliberately allowed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.pulse_speed.is_finite() || self.pulse_speed <= 0.0 {
            return Err(ConfigError::BadPulseSpeed(self.pulse_speed));
        }
        if !self.adaptive.min_frame_rate.is_finite() || self.adaptive.min_frame_rate <= 0.0 {
            return Err(ConfigError::BadFrameRateFloor(self.adaptive.min_frame_rate));
        }
        if self.adaptive.upgrade_after_frames == 0 {
            return Err(ConfigError::ZeroUpgradeWindow);
        }
        if !self.color1.is_finite() || !self.color2.is_finite() {
            return Err(ConfigError::NonFiniteColor);
        }
        if !self.lazy_load_margin_px.is_finite() || self.lazy_load_margin_px < 0.0 {
            return Err(ConfigError::BadLazyLoadMargin(self.lazy_load_margin_px));
        }
        Ok(())
    }

    /// The node count to build at for a given tier.
    pub fn node_count_for(&self, tier: Tier) -> usize {
        self.node_count.unwrap_or_else(|| tier.default_node_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SceneConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.connection_limit, 4);
        assert_eq!(config.adaptive.min_frame_rate, 40.0);
        assert_eq!(config.adaptive.upgrade_after_frames, 300);
    }

    #[test]
    fn node_count_falls_back_to_tier_default() {
        let mut config = SceneConfig::default();
        assert_eq!(config.node_count_for(Tier::High), 180);
        config.node_count = Some(50);
        assert_eq!(config.node_count_for(Tier::High), 50);
    }

    #[test]
    fn rejects_bad_pulse_speed() {
        let mut config = SceneConfig::default();
        config.pulse_speed = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::BadPulseSpeed(0.0)));
        config.pulse_speed = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_adaptive_options() {
        let mut config = SceneConfig::default();
        config.adaptive.min_frame_rate = -1.0;
        assert!(config.validate().is_err());

        let mut config = SceneConfig::default();
        config.adaptive.upgrade_after_frames = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroUpgradeWindow));
    }

    #[test]
    fn degenerate_counts_are_allowed() {
        let mut config = SceneConfig::default();
        config.node_count = Some(0);
        config.connection_limit = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn json_round_trip_with_partial_input() {
        // Omitted fields take defaults.
        let config: SceneConfig =
            serde_json::from_str(r#"{"node_count": 50, "force_quality": "low"}"#).unwrap();
        assert_eq!(config.node_count, Some(50));
        assert_eq!(config.force_quality, Some(Tier::Low));
        assert_eq!(config.connection_limit, 4);

        let json = serde_json::to_string(&config).unwrap();
        let back: SceneConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.node_count, Some(50));
    }
}
