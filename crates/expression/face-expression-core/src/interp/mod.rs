//! Keyframe interpolation.
//!
//! `interpolate` is a pure function of its inputs: it finds the keyframe pair
//! bracketing `elapsed`, eases the normalized fraction with the expression's
//! method, and blends every pose parameter linearly with the eased fraction.
//! Times before the first keyframe and after the last clamp to those poses.

pub mod functions;

use crate::data::{InterpolationMethod, Keyframe};
use crate::pose::Pose;

use functions::{bezier_ease_t, ease_in, ease_out, smoothstep};

/// Control points of the `cubic-spline` timing curve.
const SPLINE_CTRL: [f32; 4] = [0.42, 0.0, 0.58, 1.0];

/// Apply an interpolation method's easing curve to a fraction in [0,1].
#[inline]
pub fn ease(method: InterpolationMethod, t: f32) -> f32 {
    match method {
        InterpolationMethod::Linear => t,
        InterpolationMethod::EaseIn => ease_in(t),
        InterpolationMethod::EaseOut => ease_out(t),
        InterpolationMethod::EaseInOut => smoothstep(t),
        InterpolationMethod::CubicSpline => {
            bezier_ease_t(t, SPLINE_CTRL[0], SPLINE_CTRL[1], SPLINE_CTRL[2], SPLINE_CTRL[3])
        }
    }
}

/// Find the segment [i, i+1] containing `elapsed` and the fraction along it.
///
/// The left index is the last keyframe whose offset is <= `elapsed`, so a time
/// landing exactly on a keyframe yields that keyframe with fraction 0.
/// Returns (i, i, 0.0) when clamped to the first or last keyframe.
fn find_segment(keyframes: &[Keyframe], elapsed: f32) -> (usize, usize, f32) {
    let n = keyframes.len();
    if n <= 1 || elapsed.is_nan() || elapsed <= keyframes[0].time_offset {
        return (0, 0, 0.0);
    }
    if elapsed >= keyframes[n - 1].time_offset {
        return (n - 1, n - 1, 0.0);
    }
    let right = keyframes.partition_point(|k| k.time_offset <= elapsed);
    let left = right - 1;
    let t0 = keyframes[left].time_offset;
    let t1 = keyframes[right].time_offset;
    let t = (elapsed - t0) / (t1 - t0);
    (left, right, t.clamp(0.0, 1.0))
}

/// Pose of a keyframe sequence at `elapsed` seconds.
///
/// An empty sequence yields an empty pose.
pub fn interpolate(keyframes: &[Keyframe], elapsed: f32, method: InterpolationMethod) -> Pose {
    if keyframes.is_empty() {
        return Pose::new();
    }
    let (i0, i1, t) = find_segment(keyframes, elapsed);
    if i0 == i1 || t == 0.0 {
        return keyframes[i0].pose.clone();
    }
    keyframes[i0]
        .pose
        .lerp(&keyframes[i1].pose, ease(method, t))
}
