//! Built-in expressions pre-registered in every default library.

use crate::data::{Expression, InterpolationMethod, Keyframe, Priority};
use crate::pose::{Pose, EYE_OPENNESS, EYE_SCALE, EYE_X, EYE_Y, HEART, LID_BOTTOM, LID_TOP};

pub const NEUTRAL: &str = "neutral";
pub const HAPPY: &str = "happy";
pub const LOVE: &str = "love";
pub const SCARED: &str = "scared";
pub const SAD: &str = "sad";
pub const ANGRY: &str = "angry";
pub const BLINK: &str = "blink";
pub const LOOK_AROUND: &str = "look_around";

const DEFAULT_TRANSITION: f32 = 0.2;

fn key(time_offset: f32, params: &[(&str, f32)]) -> Keyframe {
    Keyframe::new(time_offset, params.iter().copied().collect())
}

/// Resting face; the first keyframe is the engine's default rest pose.
pub fn neutral() -> Expression {
    let rest = Pose::new()
        .with(EYE_X, 0.0)
        .with(EYE_Y, 0.0)
        .with(EYE_SCALE, 1.0)
        .with(EYE_OPENNESS, 1.0)
        .with(LID_TOP, 0.0)
        .with(LID_BOTTOM, 0.0)
        .with(HEART, 0.0);
    Expression::new(
        NEUTRAL,
        vec![Keyframe::new(0.0, rest.clone()), Keyframe::new(1.0, rest)],
    )
    .with_transition(DEFAULT_TRANSITION)
    .sticky(true)
}

pub fn happy() -> Expression {
    Expression::new(
        HAPPY,
        vec![
            key(0.0, &[(EYE_SCALE, 1.0), (LID_BOTTOM, 0.0)]),
            key(0.5, &[(EYE_SCALE, 1.3), (LID_BOTTOM, 0.5)]),
            key(1.0, &[(EYE_SCALE, 1.0), (LID_BOTTOM, 0.3)]),
        ],
    )
    .with_transition(DEFAULT_TRANSITION)
}

pub fn love() -> Expression {
    Expression::new(
        LOVE,
        vec![
            key(0.0, &[(HEART, 0.0), (EYE_SCALE, 1.0)]),
            key(0.4, &[(HEART, 1.0), (EYE_SCALE, 1.2)]),
            key(1.5, &[(HEART, 1.0), (EYE_SCALE, 1.1)]),
        ],
    )
    .with_method(InterpolationMethod::EaseInOut)
    .with_transition(DEFAULT_TRANSITION)
}

pub fn scared() -> Expression {
    Expression::new(
        SCARED,
        vec![
            key(0.0, &[(EYE_SCALE, 1.0), (EYE_Y, 0.0), (EYE_OPENNESS, 1.0)]),
            key(0.2, &[(EYE_SCALE, 0.8), (EYE_Y, 0.05), (EYE_OPENNESS, 1.15)]),
            key(1.2, &[(EYE_SCALE, 0.85), (EYE_Y, 0.04), (EYE_OPENNESS, 1.1)]),
        ],
    )
    .with_method(InterpolationMethod::EaseOut)
    .with_transition(0.1)
}

pub fn sad() -> Expression {
    Expression::new(
        SAD,
        vec![
            key(0.0, &[(LID_TOP, 0.0), (EYE_Y, 0.0)]),
            key(0.6, &[(LID_TOP, -0.4), (EYE_Y, 0.08)]),
            key(1.5, &[(LID_TOP, -0.45), (EYE_Y, 0.1)]),
        ],
    )
    .with_method(InterpolationMethod::EaseInOut)
    .with_transition(DEFAULT_TRANSITION)
}

pub fn angry() -> Expression {
    Expression::new(
        ANGRY,
        vec![
            key(0.0, &[(LID_TOP, 0.0), (EYE_SCALE, 1.0)]),
            key(0.3, &[(LID_TOP, 0.5), (EYE_SCALE, 0.9)]),
            key(1.2, &[(LID_TOP, 0.55), (EYE_SCALE, 0.9)]),
        ],
    )
    .with_method(InterpolationMethod::EaseIn)
    .with_transition(DEFAULT_TRANSITION)
}

/// Short idle single-shot: lids close and reopen.
pub fn blink() -> Expression {
    Expression::new(
        BLINK,
        vec![
            key(0.0, &[(EYE_OPENNESS, 1.0)]),
            key(0.06, &[(EYE_OPENNESS, 0.0)]),
            key(0.12, &[(EYE_OPENNESS, 1.0)]),
        ],
    )
    .with_method(InterpolationMethod::EaseInOut)
    .with_priority(Priority::Idle)
    .with_transition(0.05)
}

/// Idle glance left, then right, then back to center.
pub fn look_around() -> Expression {
    Expression::new(
        LOOK_AROUND,
        vec![
            key(0.0, &[(EYE_X, 0.0)]),
            key(0.5, &[(EYE_X, -0.2)]),
            key(1.2, &[(EYE_X, -0.2)]),
            key(1.7, &[(EYE_X, 0.2)]),
            key(2.4, &[(EYE_X, 0.2)]),
            key(2.8, &[(EYE_X, 0.0)]),
        ],
    )
    .with_method(InterpolationMethod::CubicSpline)
    .with_priority(Priority::Idle)
}

pub fn all() -> Vec<Expression> {
    vec![
        neutral(),
        happy(),
        love(),
        scared(),
        sad(),
        angry(),
        blink(),
        look_around(),
    ]
}
