//! Output contracts from the tick driver.
//!
//! Each tick produces one pose frame for the rendering collaborator and the
//! list of events it published, in publication order.

use serde::{Deserialize, Serialize};

use crate::error::FaceError;
use crate::events::{Event, EventPayload};
use crate::pose::Pose;

/// Per-tick snapshot handed to the renderer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    /// Index of the tick that produced this frame.
    pub tick: u64,
    pub pose: Pose,
    /// Display hint forwarded from configuration.
    pub fullscreen: bool,
}

/// Rendering collaborator. Called once per tick; must not block.
pub trait PoseSink {
    fn present(&mut self, frame: &PoseFrame);
}

/// Sink that keeps only the latest frame; handy for tests and headless runs.
#[derive(Debug, Default)]
pub struct LatestFrame(pub Option<PoseFrame>);

impl PoseSink for LatestFrame {
    fn present(&mut self, frame: &PoseFrame) {
        self.0 = Some(frame.clone());
    }
}

/// Adapts a closure into a sink.
pub struct FnSink<F>(pub F);

impl<F: FnMut(&PoseFrame)> PoseSink for FnSink<F> {
    fn present(&mut self, frame: &PoseFrame) {
        (self.0)(frame)
    }
}

/// Outputs returned by `FaceEngine::tick()`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TickOutputs {
    pub frame: PoseFrame,
    #[serde(default)]
    pub events: Vec<Event>,
    /// Recoverable problems hit during the tick (unknown names, corrupt instances).
    #[serde(default)]
    pub errors: Vec<FaceError>,
}

impl TickOutputs {
    #[inline]
    pub fn clear(&mut self) {
        self.events.clear();
        self.errors.clear();
    }

    /// Names carried by `expression_started` events, in order.
    pub fn started(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match &e.payload {
                EventPayload::ExpressionStarted { name } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Names carried by `expression_completed` events, in order.
    pub fn completed(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match &e.payload {
                EventPayload::ExpressionCompleted { name } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }
}
