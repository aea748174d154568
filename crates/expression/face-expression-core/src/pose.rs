//! Pose: named animation parameters and their values at one instant.
//!
//! Keys are kept ordered so iteration (and therefore blending and serialized
//! output) is deterministic across runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::interp::functions::lerp_f32;

/// Horizontal eye offset, normalized screen units.
pub const EYE_X: &str = "eye_x";
/// Vertical eye offset, normalized screen units.
pub const EYE_Y: &str = "eye_y";
/// Uniform eye scale factor.
pub const EYE_SCALE: &str = "eye_scale";
/// 1.0 fully open, 0.0 closed.
pub const EYE_OPENNESS: &str = "eye_openness";
/// Upper lid tilt blend weight; positive frowns inward, negative droops outward.
pub const LID_TOP: &str = "lid_top";
/// Lower lid raise blend weight (smiling squint).
pub const LID_BOTTOM: &str = "lid_bottom";
/// Heart-shape blend weight.
pub const HEART: &str = "heart";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pose(BTreeMap<String, f32>);

impl Pose {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, param: &str, value: f32) -> Self {
        self.0.insert(param.to_string(), value);
        self
    }

    pub fn set(&mut self, param: &str, value: f32) {
        self.0.insert(param.to_string(), value);
    }

    pub fn get(&self, param: &str) -> Option<f32> {
        self.0.get(param).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_finite(&self) -> bool {
        self.0.values().all(|v| v.is_finite())
    }

    /// Copy of `self` with every parameter of `top` written over it.
    pub fn overlay(&self, top: &Pose) -> Pose {
        let mut out = self.clone();
        for (k, v) in &top.0 {
            out.0.insert(k.clone(), *v);
        }
        out
    }

    /// Per-parameter linear blend toward `to`.
    ///
    /// Parameters defined on one side only hold that side's value.
    pub fn lerp(&self, to: &Pose, t: f32) -> Pose {
        let mut out = BTreeMap::new();
        for (k, a) in &self.0 {
            let v = match to.0.get(k) {
                Some(b) => lerp_f32(*a, *b, t),
                None => *a,
            };
            out.insert(k.clone(), v);
        }
        for (k, b) in &to.0 {
            out.entry(k.clone()).or_insert(*b);
        }
        Pose(out)
    }
}

impl<K: Into<String>> FromIterator<(K, f32)> for Pose {
    fn from_iter<I: IntoIterator<Item = (K, f32)>>(iter: I) -> Self {
        Pose(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_holds_one_sided_parameters() {
        let a = Pose::new().with(EYE_X, 0.0).with(HEART, 1.0);
        let b = Pose::new().with(EYE_X, 1.0).with(LID_TOP, 0.5);
        let mid = a.lerp(&b, 0.5);
        assert_eq!(mid.get(EYE_X), Some(0.5));
        assert_eq!(mid.get(HEART), Some(1.0));
        assert_eq!(mid.get(LID_TOP), Some(0.5));
    }

    #[test]
    fn overlay_replaces_only_given_parameters() {
        let rest = Pose::new().with(EYE_SCALE, 1.0).with(EYE_OPENNESS, 1.0);
        let top = Pose::new().with(EYE_OPENNESS, 0.0);
        let out = rest.overlay(&top);
        assert_eq!(out.get(EYE_SCALE), Some(1.0));
        assert_eq!(out.get(EYE_OPENNESS), Some(0.0));
    }
}
