use std::collections::BTreeMap;

use serde::Deserialize;

use crate::data::{Expression, InterpolationMethod, Keyframe, Priority};
use crate::error::{FaceError, FaceResult};
use crate::pose::Pose;

/// Parse a single expression definition document into a validated `Expression`.
///
/// Notes:
/// - `interpolation_method`, `loop`, `priority`, `transition` and `sticky` are optional
///   and default to linear / false / normal / 0.0 / false.
/// - Numbers are read as f64 and narrowed to f32, the engine's working precision.
/// - The result is validated with the same rules `ExpressionLibrary::register` applies.
pub fn parse_expression_json(s: &str) -> FaceResult<Expression> {
    let stored: StoredExpression = serde_json::from_str(s).map_err(parse_error)?;
    into_expression(stored)
}

/// Parse a library document `{ "expressions": [ ... ] }`.
///
/// Fails on the first invalid definition; nothing is returned for a partially valid document.
pub fn parse_library_json(s: &str) -> FaceResult<Vec<Expression>> {
    let doc: StoredLibrary = serde_json::from_str(s).map_err(parse_error)?;
    doc.expressions.into_iter().map(into_expression).collect()
}

fn parse_error(e: serde_json::Error) -> FaceError {
    FaceError::Parse {
        reason: e.to_string(),
    }
}

fn into_expression(stored: StoredExpression) -> FaceResult<Expression> {
    let keyframes = stored
        .keyframes
        .into_iter()
        .map(|k| {
            let pose: Pose = k.pose.into_iter().map(|(p, v)| (p, v as f32)).collect();
            Keyframe::new(k.time_offset as f32, pose)
        })
        .collect();

    let expression = Expression {
        name: stored.name,
        keyframes,
        interpolation_method: stored.interpolation_method,
        r#loop: stored.r#loop,
        priority: stored.priority,
        transition: stored.transition as f32,
        sticky: stored.sticky,
    };
    expression.validate()?;
    Ok(expression)
}

/* ---------- Definition document schema ---------- */

#[derive(Debug, Deserialize)]
struct StoredLibrary {
    expressions: Vec<StoredExpression>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StoredExpression {
    name: String,
    #[serde(default)]
    interpolation_method: InterpolationMethod,
    #[serde(default)]
    #[serde(rename = "loop")]
    r#loop: bool,
    #[serde(default)]
    priority: Priority,
    #[serde(default)]
    transition: f64,
    #[serde(default)]
    sticky: bool,
    keyframes: Vec<StoredKeyframe>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StoredKeyframe {
    time_offset: f64,
    pose: BTreeMap<String, f64>,
}
