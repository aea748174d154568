//! Engine: tick driver and public API.
//!
//! One `tick(dt)`:
//! 1. drain the inbox (events posted later wait for the next tick)
//! 2. apply each event: built-in requests, then the configured mapping
//! 3. if the player is idle: start the queue head, else maybe an idle behavior
//! 4. advance the player
//! 5. publish backpressure, drained events, then lifecycle events
//! 6. sample the pose (plus gaze overlay) and present the frame
//!
//! The engine is the single writer of all animation state; other threads
//! only reach it through `EventSender`.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::{FaceConfig, ANIMATION_SPEED_RANGE};
use crate::coordinator::{EventCoordinator, EventSender};
use crate::data::{Expression, Priority};
use crate::error::{FaceError, FaceResult};
use crate::events::{Event, EventKind, EventPayload};
use crate::idle::IdleScheduler;
use crate::ids::SubscriptionId;
use crate::library::ExpressionLibrary;
use crate::mapping::{Action, EventMapping};
use crate::outputs::{PoseFrame, PoseSink, TickOutputs};
use crate::player::{AnimationPlayer, PlayerState};
use crate::pose::{Pose, EYE_SCALE, EYE_X, EYE_Y};
use crate::queue::{Enqueued, ExpressionQueue};

/// Eye offset and scale derived from the tracked face.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Gaze {
    pub offset: [f32; 2],
    pub scale: f32,
}

impl Default for Gaze {
    fn default() -> Self {
        Self {
            offset: [0.0, 0.0],
            scale: 1.0,
        }
    }
}

impl Gaze {
    /// Center the eyes on a normalized face position; `size` is the face's box area.
    pub fn track(&mut self, position: [f32; 2], size: Option<f32>, range: f32) {
        for (axis, p) in position.iter().enumerate() {
            self.offset[axis] = ((p - 0.5) * 2.0).clamp(-1.0, 1.0) * range;
        }
        // closer faces (bigger boxes) shrink the eyes slightly
        self.scale = size
            .map(|s| (1.0 + (0.5 - s)).clamp(0.7, 1.1))
            .unwrap_or(1.0);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_neutral(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, pose: &mut Pose) {
        if self.is_neutral() {
            return;
        }
        pose.set(EYE_X, pose.get(EYE_X).unwrap_or(0.0) + self.offset[0]);
        pose.set(EYE_Y, pose.get(EYE_Y).unwrap_or(0.0) + self.offset[1]);
        pose.set(EYE_SCALE, pose.get(EYE_SCALE).unwrap_or(1.0) * self.scale);
    }
}

#[derive(Debug)]
pub struct FaceEngine {
    cfg: FaceConfig,
    library: ExpressionLibrary,
    mapping: EventMapping,
    player: AnimationPlayer,
    queue: ExpressionQueue,
    idle: IdleScheduler,
    coordinator: EventCoordinator,
    gaze: Gaze,
    tick_index: u64,

    // Lifecycle payloads produced since the last publish
    lifecycle: Vec<EventPayload>,
    outputs: TickOutputs,
}

impl FaceEngine {
    /// Engine over the built-in library.
    pub fn new(cfg: FaceConfig) -> FaceResult<Self> {
        Self::with_library(cfg, ExpressionLibrary::new())
    }

    /// Engine over a caller-provided library.
    ///
    /// Fails if the configuration is out of range, or if the rest expression
    /// or an idle expression is missing from the library.
    pub fn with_library(cfg: FaceConfig, library: ExpressionLibrary) -> FaceResult<Self> {
        cfg.validate()?;
        let rest = library
            .get(&cfg.rest_expression)?
            .keyframes
            .first()
            .map(|k| k.pose.clone())
            .unwrap_or_default();
        for name in &cfg.idle_expressions {
            library.get(name)?;
        }

        Ok(Self {
            player: AnimationPlayer::new(rest, cfg.animation_speed),
            queue: ExpressionQueue::new(),
            idle: IdleScheduler::new(cfg.idle_timeout, cfg.idle_expressions.clone(), cfg.idle_seed),
            coordinator: EventCoordinator::new(cfg.inbox_capacity),
            mapping: EventMapping::default(),
            gaze: Gaze::default(),
            tick_index: 0,
            lifecycle: Vec::new(),
            outputs: TickOutputs::default(),
            library,
            cfg,
        })
    }

    pub fn with_mapping(mut self, mapping: EventMapping) -> Self {
        self.mapping = mapping;
        self
    }

    pub fn set_mapping(&mut self, mapping: EventMapping) {
        self.mapping = mapping;
    }

    pub fn config(&self) -> &FaceConfig {
        &self.cfg
    }

    pub fn library(&self) -> &ExpressionLibrary {
        &self.library
    }

    pub fn player(&self) -> &AnimationPlayer {
        &self.player
    }

    pub fn queue(&self) -> &ExpressionQueue {
        &self.queue
    }

    pub fn idle(&self) -> &IdleScheduler {
        &self.idle
    }

    pub fn gaze(&self) -> Gaze {
        self.gaze
    }

    pub fn state(&self) -> PlayerState {
        self.player.state()
    }

    /// Name of the expression currently playing.
    pub fn active_expression(&self) -> Option<&str> {
        self.player.active().map(|i| i.name())
    }

    pub fn current_pose(&self) -> &Pose {
        self.player.current_pose()
    }

    pub fn register(&mut self, expression: Expression) -> FaceResult<()> {
        self.library.register(expression).map(|_| ())
    }

    pub fn set_animation_speed(&mut self, speed: f32) -> FaceResult<()> {
        let (lo, hi) = ANIMATION_SPEED_RANGE;
        if !(lo..=hi).contains(&speed) {
            return Err(FaceError::config(
                "animation_speed",
                format!("{speed} is outside [{lo}, {hi}]"),
            ));
        }
        self.cfg.animation_speed = speed;
        self.player.set_speed(speed);
        Ok(())
    }

    /// Producer handle for other threads.
    pub fn sender(&self) -> EventSender {
        self.coordinator.sender()
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&Event) + Send + 'static,
    {
        self.coordinator.subscribe(kind, handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.coordinator.unsubscribe(id)
    }

    /// Queue an expression by name from the tick thread.
    ///
    /// Unknown names fail with `NotFound` and change nothing. Lifecycle events
    /// caused by an immediate start (interrupts) are published before returning.
    pub fn enqueue(&mut self, name: &str) -> FaceResult<Enqueued> {
        let result = self.request(name);
        self.publish_lifecycle(None);
        result
    }

    /// Drop all queued (not yet playing) expressions.
    pub fn clear(&mut self) -> usize {
        let dropped = self.queue.clear();
        if dropped > 0 {
            debug!(dropped, "expression queue cleared");
        }
        dropped
    }

    fn request(&mut self, name: &str) -> FaceResult<Enqueued> {
        let expression = self.library.get(name)?;
        if expression.priority != Priority::Idle {
            self.idle.reset();
        }
        self.queue
            .enqueue(expression, &mut self.player, &mut self.lifecycle)
    }

    fn request_or_record(&mut self, name: &str) {
        if let Err(err) = self.request(name) {
            warn!(%err, "expression request rejected");
            self.outputs.errors.push(err);
        }
    }

    fn run_action(&mut self, action: &Action, payload: &EventPayload) {
        match action {
            Action::Enqueue(name) => self.request_or_record(name),
            Action::Clear => {
                self.clear();
            }
            Action::PlayEmotion => {
                let EventPayload::AssistantMessage { emotion, .. } = payload else {
                    return;
                };
                match self.mapping.expression_for(*emotion).map(str::to_string) {
                    Some(name) => self.request_or_record(&name),
                    None => debug!(?emotion, "no expression mapped for emotion"),
                }
            }
            Action::Gaze => match payload {
                EventPayload::FaceTracked { position, size, .. } => {
                    self.gaze.track(*position, *size, self.cfg.gaze_range)
                }
                EventPayload::FaceAppeared { bbox, .. } => {
                    self.gaze
                        .track(bbox.center(), Some(bbox.area()), self.cfg.gaze_range)
                }
                _ => {}
            },
            Action::ResetGaze => self.gaze.reset(),
        }
    }

    fn apply_event(&mut self, event: &Event) {
        match &event.payload {
            EventPayload::ExpressionRequested { name } => self.request_or_record(name),
            EventPayload::ClearRequested => {
                self.clear();
            }
            _ => {}
        }
        let actions = self.mapping.actions_for(event.kind()).to_vec();
        for action in &actions {
            self.run_action(action, &event.payload);
        }
    }

    /// Publish pending lifecycle payloads, recording them in `into` when given.
    fn publish_lifecycle(&mut self, mut into: Option<&mut Vec<Event>>) {
        for payload in std::mem::take(&mut self.lifecycle) {
            let event = self.coordinator.publish(payload);
            if let Some(out) = into.as_deref_mut() {
                out.push(event);
            }
        }
    }

    /// Run one iteration of the scheduling loop.
    pub fn tick(&mut self, dt: f32, sink: &mut dyn PoseSink) -> &TickOutputs {
        self.outputs.clear();
        self.tick_index += 1;

        let inbound = self.coordinator.drain();
        for event in &inbound {
            self.apply_event(event);
        }

        if self.player.is_idle() && self.queue.is_empty() {
            self.idle.advance(dt);
        }
        if self.player.is_idle() {
            if let Some(next) = self.queue.dequeue_next(&self.player) {
                self.idle.reset();
                if let Err(err) = self.player.play(next, &mut self.lifecycle) {
                    self.outputs.errors.push(err);
                }
            } else if let Some(expression) =
                self.idle
                    .maybe_trigger_idle(&self.library, self.queue.is_empty(), true)
            {
                if let Err(err) =
                    self.queue
                        .enqueue(expression, &mut self.player, &mut self.lifecycle)
                {
                    self.outputs.errors.push(err);
                }
            }
        }

        self.player.tick(dt, &mut self.lifecycle);

        // subscribers hear about starts and completions before the pose is computed
        let mut published = Vec::with_capacity(inbound.len() + self.lifecycle.len() + 1);
        if let Some(warning) = self.coordinator.take_overflow() {
            published.push(self.coordinator.publish(EventPayload::BackpressureWarning {
                dropped: warning.dropped,
                capacity: warning.capacity,
            }));
        }
        for event in inbound {
            self.coordinator.dispatch(&event);
            published.push(event);
        }
        self.publish_lifecycle(Some(&mut published));
        self.outputs.events = published;

        let sampled = self.player.sample().map(|p| p.clone());
        let mut pose = match sampled {
            Ok(pose) => pose,
            Err(err) => {
                self.outputs.errors.push(err);
                self.player.current_pose().clone()
            }
        };
        self.gaze.apply(&mut pose);

        self.outputs.frame = PoseFrame {
            tick: self.tick_index,
            pose,
            fullscreen: self.cfg.fullscreen,
        };
        sink.present(&self.outputs.frame);
        &self.outputs
    }

    /// Fixed-timestep loop: tick every `dt` seconds until `keep_running` returns false.
    ///
    /// Sleeps for whatever is left of each frame. Returns the number of ticks run.
    pub fn run<F>(&mut self, dt: f32, sink: &mut dyn PoseSink, mut keep_running: F) -> FaceResult<u64>
    where
        F: FnMut(&TickOutputs) -> bool,
    {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(FaceError::config(
                "dt",
                format!("tick interval must be positive, got {dt}"),
            ));
        }
        let frame = Duration::try_from_secs_f32(dt)
            .map_err(|e| FaceError::config("dt", format!("tick interval {dt} s: {e}")))?;
        let mut ticks = 0u64;
        loop {
            let started = Instant::now();
            let outputs = self.tick(dt, sink);
            ticks += 1;
            if !keep_running(outputs) {
                return Ok(ticks);
            }
            if let Some(rest) = frame.checked_sub(started.elapsed()) {
                std::thread::sleep(rest);
            }
        }
    }
}
