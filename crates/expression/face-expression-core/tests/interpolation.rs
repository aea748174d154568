use face_expression_core::{
    builtins,
    data::{InterpolationMethod, Keyframe},
    interp::{ease, interpolate},
    pose::{Pose, EYE_OPENNESS, EYE_SCALE, LID_BOTTOM},
};

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn ramp(method: InterpolationMethod) -> (Vec<Keyframe>, InterpolationMethod) {
    (
        vec![
            Keyframe::new(0.0, Pose::new().with(EYE_SCALE, 0.0)),
            Keyframe::new(1.0, Pose::new().with(EYE_SCALE, 1.0)),
        ],
        method,
    )
}

#[test]
fn happy_quarter_second_is_midway_to_peak() {
    let happy = builtins::happy();
    let pose = interpolate(&happy.keyframes, 0.25, happy.interpolation_method);
    approx(pose.get(EYE_SCALE).unwrap(), 1.15, 1e-6);
    approx(pose.get(LID_BOTTOM).unwrap(), 0.25, 1e-6);
}

#[test]
fn times_on_keyframes_return_exact_poses() {
    let happy = builtins::happy();
    for key in &happy.keyframes {
        let pose = interpolate(&happy.keyframes, key.time_offset, happy.interpolation_method);
        assert_eq!(pose, key.pose, "at t={}", key.time_offset);
    }
}

#[test]
fn times_outside_the_range_clamp_to_the_ends() {
    let blink = builtins::blink();
    let before = interpolate(&blink.keyframes, -3.0, blink.interpolation_method);
    let after = interpolate(&blink.keyframes, 99.0, blink.interpolation_method);
    assert_eq!(before, blink.keyframes[0].pose);
    assert_eq!(after, blink.keyframes[2].pose);
}

#[test]
fn single_keyframe_is_constant() {
    let only = vec![Keyframe::new(0.0, Pose::new().with(EYE_OPENNESS, 0.4))];
    for t in [0.0, 0.5, 10.0] {
        approx(
            interpolate(&only, t, InterpolationMethod::EaseInOut)
                .get(EYE_OPENNESS)
                .unwrap(),
            0.4,
            0.0,
        );
    }
    assert!(interpolate(&[], 0.3, InterpolationMethod::Linear).is_empty());
}

#[test]
fn easing_curves_match_their_shapes_at_midpoint() {
    let cases = [
        (InterpolationMethod::Linear, 0.5),
        (InterpolationMethod::EaseIn, 0.25),
        (InterpolationMethod::EaseOut, 0.75),
        (InterpolationMethod::EaseInOut, 0.5),
        (InterpolationMethod::CubicSpline, 0.5),
    ];
    for (method, expected) in cases {
        let (keys, method) = ramp(method);
        let v = interpolate(&keys, 0.5, method).get(EYE_SCALE).unwrap();
        approx(v, expected, 1e-3);
    }
}

#[test]
fn easing_curves_are_monotonic_and_pinned() {
    for method in [
        InterpolationMethod::Linear,
        InterpolationMethod::EaseIn,
        InterpolationMethod::EaseOut,
        InterpolationMethod::EaseInOut,
        InterpolationMethod::CubicSpline,
    ] {
        approx(ease(method, 0.0), 0.0, 1e-6);
        approx(ease(method, 1.0), 1.0, 1e-6);
        let mut last = 0.0;
        for i in 1..=20 {
            let v = ease(method, i as f32 / 20.0);
            assert!(v + 1e-5 >= last, "{method:?} not monotonic at step {i}");
            last = v;
        }
    }
}

#[test]
fn params_missing_on_one_side_hold_their_value() {
    let keys = vec![
        Keyframe::new(0.0, Pose::new().with(EYE_SCALE, 1.0).with(EYE_OPENNESS, 0.2)),
        Keyframe::new(1.0, Pose::new().with(EYE_SCALE, 2.0)),
    ];
    let pose = interpolate(&keys, 0.5, InterpolationMethod::Linear);
    approx(pose.get(EYE_SCALE).unwrap(), 1.5, 1e-6);
    approx(pose.get(EYE_OPENNESS).unwrap(), 0.2, 0.0);
}
