//! Face expression core (renderer-agnostic)
//!
//! Keyframed facial expressions for a robot face: a library of named
//! expressions, a priority-aware queue, a single-instance player with
//! interpolation and cross-fades, an idle scheduler, and a thread-safe
//! event coordinator. `FaceEngine::tick` drives everything and hands one
//! pose frame per tick to a `PoseSink`.

pub mod builtins;
pub mod config;
pub mod coordinator;
pub mod data;
pub mod definition;
pub mod engine;
pub mod error;
pub mod events;
pub mod idle;
pub mod ids;
pub mod interp;
pub mod library;
pub mod mapping;
pub mod outputs;
pub mod player;
pub mod pose;
pub mod queue;

// Re-exports for hosts
pub use config::FaceConfig;
pub use coordinator::{EventCoordinator, EventSender, Handler};
pub use data::{Expression, InterpolationMethod, Keyframe, Priority};
pub use definition::{parse_expression_json, parse_library_json};
pub use engine::{FaceEngine, Gaze};
pub use error::{BackpressureWarning, FaceError, FaceResult};
pub use events::{BoundingBox, Emotion, Event, EventKind, EventPayload};
pub use idle::IdleScheduler;
pub use ids::{InstId, SubscriptionId};
pub use interp::interpolate;
pub use library::ExpressionLibrary;
pub use mapping::{Action, EventMapping};
pub use outputs::{FnSink, LatestFrame, PoseFrame, PoseSink, TickOutputs};
pub use player::{AnimationInstance, AnimationPlayer, InstanceState, PlayerState};
pub use pose::Pose;
pub use queue::{Enqueued, ExpressionQueue};
