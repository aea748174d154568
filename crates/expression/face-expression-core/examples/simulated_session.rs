//! Simulated companion session: a vision thread and a voice thread post
//! events while the main thread runs the face at 30 Hz and prints lifecycle
//! notifications.
//!
//! Run with: RUST_LOG=debug cargo run -p face-expression-core --example simulated_session

use std::thread;
use std::time::Duration;

use face_expression_core::{
    Action, BoundingBox, Emotion, EventKind, EventMapping, EventPayload, EventSender, FaceConfig,
    FaceEngine, FnSink, PoseFrame,
};
use tracing::{info, warn};

/// Post an event; overflow is recoverable but worth surfacing.
fn post(sender: &EventSender, payload: EventPayload) {
    if let Err(warning) = sender.emit(payload) {
        warn!(%warning, "producer outpaced the face engine");
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mapping = EventMapping::new()
        .on(EventKind::FaceAppeared, Action::Enqueue("happy".into()))
        .on(EventKind::FaceAppeared, Action::Gaze)
        .on(EventKind::FaceTracked, Action::Gaze)
        .on(EventKind::FaceDisappeared, Action::ResetGaze)
        .on(EventKind::AssistantMessage, Action::PlayEmotion)
        .emotion(Emotion::Happiness, "love")
        .emotion(Emotion::Fear, "scared")
        .emotion(Emotion::Sadness, "sad");

    let mut engine = match FaceEngine::new(FaceConfig {
        idle_timeout: 2.0,
        ..FaceConfig::default()
    }) {
        Ok(engine) => engine.with_mapping(mapping),
        Err(err) => {
            eprintln!("failed to start face engine: {err}");
            return;
        }
    };

    for kind in [EventKind::ExpressionStarted, EventKind::ExpressionCompleted] {
        engine.subscribe(kind, |ev| info!(seq = ev.seq, payload = ?ev.payload, "lifecycle"));
    }

    let vision = engine.sender();
    let vision_thread = thread::spawn(move || {
        let bbox = BoundingBox {
            x: 0.2,
            y: 0.3,
            width: 0.25,
            height: 0.3,
        };
        post(&vision, EventPayload::FaceAppeared { id: 1, bbox });
        for step in 0..20 {
            thread::sleep(Duration::from_millis(100));
            let x = 0.3 + step as f32 * 0.02;
            post(&vision, EventPayload::FaceTracked {
                id: 1,
                position: [x, 0.45],
                size: Some(0.07),
            });
        }
        post(&vision, EventPayload::FaceDisappeared { id: 1 });
    });

    let voice = engine.sender();
    let voice_thread = thread::spawn(move || {
        for emotion in [Emotion::Happiness, Emotion::Fear, Emotion::Sadness] {
            thread::sleep(Duration::from_millis(700));
            post(&voice, EventPayload::AssistantMessage {
                emotion,
                duration: 1.0,
            });
        }
        post(&voice, EventPayload::AssistantMessageEnd);
    });

    let mut sink = FnSink(|frame: &PoseFrame| {
        if frame.tick % 15 == 0 {
            info!(tick = frame.tick, pose = ?frame.pose, "frame");
        }
    });
    match engine.run(1.0 / 30.0, &mut sink, |out| {
        for err in &out.errors {
            info!(%err, "tick error");
        }
        out.frame.tick < 30 * 6
    }) {
        Ok(ticks) => info!(ticks, "session finished"),
        Err(err) => eprintln!("run failed: {err}"),
    }

    let _ = vision_thread.join();
    let _ = voice_thread.join();
}
