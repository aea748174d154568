//! Application-supplied mapping from inbound event kinds to engine actions.
//!
//! The default mapping is empty: which expression a face or a message should
//! trigger is policy that belongs to the application.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::events::{Emotion, EventKind};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "expression", rename_all = "snake_case")]
pub enum Action {
    /// Queue (or interrupt with) the named expression.
    Enqueue(String),
    /// Drop pending queued work.
    Clear,
    /// Queue the expression configured for the message's emotion.
    PlayEmotion,
    /// Follow the tracked face with the eyes.
    Gaze,
    /// Return the eyes to center.
    ResetGaze,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventMapping {
    pub actions: HashMap<EventKind, Vec<Action>>,
    pub emotions: HashMap<Emotion, String>,
}

impl EventMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an action for `kind`; actions run in insertion order.
    pub fn on(mut self, kind: EventKind, action: Action) -> Self {
        self.actions.entry(kind).or_default().push(action);
        self
    }

    pub fn emotion(mut self, emotion: Emotion, expression: impl Into<String>) -> Self {
        self.emotions.insert(emotion, expression.into());
        self
    }

    pub fn actions_for(&self, kind: EventKind) -> &[Action] {
        self.actions.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn expression_for(&self, emotion: Emotion) -> Option<&str> {
        self.emotions.get(&emotion).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_round_trips_through_json() {
        let mapping = EventMapping::new()
            .on(EventKind::FaceAppeared, Action::Enqueue("happy".into()))
            .on(EventKind::FaceTracked, Action::Gaze)
            .on(EventKind::AssistantMessage, Action::PlayEmotion)
            .emotion(Emotion::Fear, "scared");
        let json = serde_json::to_string(&mapping).unwrap();
        let back: EventMapping = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mapping);
        assert_eq!(back.expression_for(Emotion::Fear), Some("scared"));
        assert!(back.actions_for(EventKind::FaceDisappeared).is_empty());
    }

    #[test]
    fn parses_hand_written_document() {
        let doc = r#"{
            "actions": {
                "face_disappeared": [{"action": "reset_gaze"}, {"action": "enqueue", "expression": "sad"}]
            },
            "emotions": {"happiness": "happy"}
        }"#;
        let mapping: EventMapping = serde_json::from_str(doc).unwrap();
        assert_eq!(
            mapping.actions_for(EventKind::FaceDisappeared),
            &[Action::ResetGaze, Action::Enqueue("sad".into())]
        );
    }
}
