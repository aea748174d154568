//! Event model shared by the inbox (vision, voice, direct requests) and the
//! outbound lifecycle notifications.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Emotion label attached to an assistant message by the voice collaborator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happiness,
    Anger,
    Fear,
    Sadness,
    Neutral,
}

/// Normalized (0..1) face bounding box as reported by the vision collaborator.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn center(&self) -> [f32; 2] {
        [self.x + self.width / 2.0, self.y + self.height / 2.0]
    }

    /// Box area, a proxy for the face's distance to the camera.
    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}

/// Typed payloads, one variant per event kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum EventPayload {
    FaceAppeared {
        id: u32,
        bbox: BoundingBox,
    },
    FaceTracked {
        id: u32,
        position: [f32; 2],
        #[serde(default)]
        size: Option<f32>,
    },
    FaceDisappeared {
        id: u32,
    },
    AssistantMessage {
        emotion: Emotion,
        duration: f32,
    },
    AssistantMessageEnd,
    ExpressionRequested {
        name: String,
    },
    ClearRequested,
    ExpressionStarted {
        name: String,
    },
    ExpressionCompleted {
        name: String,
    },
    BackpressureWarning {
        dropped: u64,
        capacity: usize,
    },
}

/// Discriminant of `EventPayload`, used as the subscription and mapping key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    FaceAppeared,
    FaceTracked,
    FaceDisappeared,
    AssistantMessage,
    AssistantMessageEnd,
    ExpressionRequested,
    ClearRequested,
    ExpressionStarted,
    ExpressionCompleted,
    BackpressureWarning,
}

impl EventKind {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::FaceAppeared => "face_appeared",
            Self::FaceTracked => "face_tracked",
            Self::FaceDisappeared => "face_disappeared",
            Self::AssistantMessage => "assistant_message",
            Self::AssistantMessageEnd => "assistant_message_end",
            Self::ExpressionRequested => "expression_requested",
            Self::ClearRequested => "clear_requested",
            Self::ExpressionStarted => "expression_started",
            Self::ExpressionCompleted => "expression_completed",
            Self::BackpressureWarning => "backpressure_warning",
        }
    }
}

impl EventPayload {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::FaceAppeared { .. } => EventKind::FaceAppeared,
            Self::FaceTracked { .. } => EventKind::FaceTracked,
            Self::FaceDisappeared { .. } => EventKind::FaceDisappeared,
            Self::AssistantMessage { .. } => EventKind::AssistantMessage,
            Self::AssistantMessageEnd => EventKind::AssistantMessageEnd,
            Self::ExpressionRequested { .. } => EventKind::ExpressionRequested,
            Self::ClearRequested => EventKind::ClearRequested,
            Self::ExpressionStarted { .. } => EventKind::ExpressionStarted,
            Self::ExpressionCompleted { .. } => EventKind::ExpressionCompleted,
            Self::BackpressureWarning { .. } => EventKind::BackpressureWarning,
        }
    }
}

/// A stamped event.
///
/// `seq` is the arrival order in the inbox (or publication order for outbound
/// events) and is the only ordering key; `timestamp` is informational.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub seq: u64,
    /// Time since the coordinator was created.
    pub timestamp: Duration,
    pub payload: EventPayload,
}

impl Event {
    #[inline]
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }
}
