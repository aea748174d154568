//! Engine configuration.
//!
//! Loading the file from disk belongs to the host; this module only parses
//! and range-checks the values.

use serde::{Deserialize, Serialize};

use crate::builtins::{BLINK, LOOK_AROUND, NEUTRAL};
use crate::error::{FaceError, FaceResult};

pub const ANIMATION_SPEED_RANGE: (f32, f32) = (0.1, 3.0);
pub const IDLE_TIMEOUT_RANGE: (f32, f32) = (1.0, 60.0);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceConfig {
    /// Multiplier applied to every expression's playback time.
    pub animation_speed: f32,
    /// Seconds of inactivity before an idle behavior is injected.
    pub idle_timeout: f32,
    /// Forwarded to the renderer untouched.
    pub fullscreen: bool,
    /// Maximum pending inbox events before the oldest are dropped.
    pub inbox_capacity: usize,
    /// Pool the idle scheduler picks from.
    pub idle_expressions: Vec<String>,
    /// Fixed seed for a reproducible idle choice.
    pub idle_seed: Option<u64>,
    /// Expression whose first keyframe is the rest pose.
    pub rest_expression: String,
    /// Maximum eye offset applied by gaze following.
    pub gaze_range: f32,
}

impl Default for FaceConfig {
    fn default() -> Self {
        Self {
            animation_speed: 1.0,
            idle_timeout: 5.0,
            fullscreen: false,
            inbox_capacity: 256,
            idle_expressions: vec![BLINK.to_string(), LOOK_AROUND.to_string()],
            idle_seed: None,
            rest_expression: NEUTRAL.to_string(),
            gaze_range: 0.25,
        }
    }
}

fn check_range(field: &str, value: f32, (lo, hi): (f32, f32)) -> FaceResult<()> {
    if value.is_finite() && value >= lo && value <= hi {
        Ok(())
    } else {
        Err(FaceError::config(
            field,
            format!("{value} is outside [{lo}, {hi}]"),
        ))
    }
}

impl FaceConfig {
    pub fn validate(&self) -> FaceResult<()> {
        check_range("animation_speed", self.animation_speed, ANIMATION_SPEED_RANGE)?;
        check_range("idle_timeout", self.idle_timeout, IDLE_TIMEOUT_RANGE)?;
        check_range("gaze_range", self.gaze_range, (0.0, 1.0))?;
        if self.inbox_capacity == 0 {
            return Err(FaceError::config("inbox_capacity", "must be at least 1"));
        }
        if self.idle_expressions.is_empty() {
            return Err(FaceError::config(
                "idle_expressions",
                "at least one idle expression is required",
            ));
        }
        if self.rest_expression.trim().is_empty() {
            return Err(FaceError::config("rest_expression", "must not be empty"));
        }
        Ok(())
    }

    /// Parse a JSON document (missing fields take defaults) and validate it.
    pub fn from_json_str(s: &str) -> FaceResult<Self> {
        let cfg: FaceConfig = serde_json::from_str(s).map_err(|e| FaceError::Parse {
            reason: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        FaceConfig::default().validate().unwrap();
    }

    #[test]
    fn ranges_are_inclusive() {
        let mut cfg = FaceConfig {
            animation_speed: 3.0,
            idle_timeout: 1.0,
            ..FaceConfig::default()
        };
        assert!(cfg.validate().is_ok());
        cfg.animation_speed = 3.01;
        assert!(matches!(
            cfg.validate(),
            Err(FaceError::InvalidConfig { ref field, .. }) if field == "animation_speed"
        ));
        cfg.animation_speed = 1.0;
        cfg.idle_timeout = 60.5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn json_fills_defaults() {
        let cfg = FaceConfig::from_json_str(r#"{"idle_timeout": 12.0, "fullscreen": true}"#).unwrap();
        assert_eq!(cfg.idle_timeout, 12.0);
        assert!(cfg.fullscreen);
        assert_eq!(cfg.animation_speed, 1.0);
        assert!(FaceConfig::from_json_str(r#"{"animation_speed": 0.05}"#).is_err());
    }
}
