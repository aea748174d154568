//! Expression data model: keyframes, easing method, priority.

use serde::{Deserialize, Serialize};

use crate::error::{FaceError, FaceResult};
use crate::pose::Pose;

/// A pose anchored at an offset (seconds) from the start of its expression.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time_offset: f32,
    pub pose: Pose,
}

impl Keyframe {
    pub fn new(time_offset: f32, pose: Pose) -> Self {
        Self { time_offset, pose }
    }
}

/// Easing applied to the normalized fraction between two keyframes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterpolationMethod {
    #[default]
    Linear,
    #[serde(alias = "ease_in_out")]
    EaseInOut,
    #[serde(alias = "cubic_spline", alias = "cubic-bezier", alias = "cubic_bezier")]
    CubicSpline,
    #[serde(alias = "ease_in")]
    EaseIn,
    #[serde(alias = "ease_out")]
    EaseOut,
}

/// Scheduling class of an expression.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Filler behavior, only injected when nothing else is pending or playing.
    Idle,
    #[default]
    Normal,
    /// Replaces the active instance immediately; the queue is left untouched.
    Interrupt,
}

/// A named, immutable keyframe sequence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub name: String,
    pub keyframes: Vec<Keyframe>,
    #[serde(default)]
    pub interpolation_method: InterpolationMethod,
    #[serde(default)]
    #[serde(rename = "loop")]
    pub r#loop: bool,
    #[serde(default)]
    pub priority: Priority,
    /// Cross-fade (seconds) from the previously shown pose when this expression starts.
    #[serde(default)]
    pub transition: f32,
    /// Hold the final pose after completion instead of settling back to rest.
    #[serde(default)]
    pub sticky: bool,
}

impl Expression {
    /// Linear, non-looping, normal-priority expression.
    pub fn new(name: impl Into<String>, keyframes: Vec<Keyframe>) -> Self {
        Self {
            name: name.into(),
            keyframes,
            interpolation_method: InterpolationMethod::Linear,
            r#loop: false,
            priority: Priority::Normal,
            transition: 0.0,
            sticky: false,
        }
    }

    pub fn with_method(mut self, method: InterpolationMethod) -> Self {
        self.interpolation_method = method;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_transition(mut self, seconds: f32) -> Self {
        self.transition = seconds;
        self
    }

    pub fn looping(mut self, r#loop: bool) -> Self {
        self.r#loop = r#loop;
        self
    }

    pub fn sticky(mut self, sticky: bool) -> Self {
        self.sticky = sticky;
        self
    }

    /// Offset of the last keyframe; 0.0 for a single-keyframe expression.
    pub fn duration(&self) -> f32 {
        self.keyframes.last().map(|k| k.time_offset).unwrap_or(0.0)
    }

    /// Check the invariants required before an expression may enter a library.
    pub fn validate(&self) -> FaceResult<()> {
        let name = self.name.as_str();
        if name.trim().is_empty() {
            return Err(FaceError::validation(name, "name must not be empty"));
        }
        let first = self
            .keyframes
            .first()
            .ok_or_else(|| FaceError::validation(name, "keyframes must not be empty"))?;
        if first.time_offset != 0.0 {
            return Err(FaceError::validation(
                name,
                format!("first keyframe must start at 0, got {}", first.time_offset),
            ));
        }
        let mut last = -f32::INFINITY;
        for (i, key) in self.keyframes.iter().enumerate() {
            if !key.time_offset.is_finite() {
                return Err(FaceError::validation(
                    name,
                    format!("keyframe {i} has a non-finite time_offset"),
                ));
            }
            if key.time_offset <= last {
                return Err(FaceError::validation(
                    name,
                    format!("keyframe {i} time_offset must be strictly ascending"),
                ));
            }
            if !key.pose.is_finite() {
                return Err(FaceError::validation(
                    name,
                    format!("keyframe {i} has a non-finite pose value"),
                ));
            }
            last = key.time_offset;
        }
        if !self.transition.is_finite() || self.transition < 0.0 {
            return Err(FaceError::validation(
                name,
                "transition must be a finite, non-negative number of seconds",
            ));
        }
        Ok(())
    }
}
