//! Animation player: owns the single playing instance.
//!
//! State machine: Idle --play--> Active --complete--> Idle, and
//! Active --play(interrupt)--> Active (old instance discarded silently).
//! Lifecycle notifications are appended to the caller's buffer in the order
//! they happen; the tick driver publishes them.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::data::{Expression, Priority};
use crate::error::{FaceError, FaceResult};
use crate::events::EventPayload;
use crate::ids::InstId;
use crate::interp::interpolate;
use crate::pose::Pose;

/// Shortest settle back to rest after a non-sticky expression.
const MIN_SETTLE: f32 = 0.2;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstanceState {
    Pending,
    Active,
    Completed,
}

/// One playback of an expression.
#[derive(Clone, Debug)]
pub struct AnimationInstance {
    pub id: InstId,
    pub expression: Arc<Expression>,
    /// Expression-local time in seconds (wraps for looping expressions).
    pub elapsed: f32,
    pub state: InstanceState,
}

impl AnimationInstance {
    pub fn new(id: InstId, expression: Arc<Expression>) -> Self {
        Self {
            id,
            expression,
            elapsed: 0.0,
            state: InstanceState::Pending,
        }
    }

    pub fn name(&self) -> &str {
        &self.expression.name
    }

    pub fn priority(&self) -> Priority {
        self.expression.priority
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    Idle,
    Active,
}

/// Blend from the last completed frame back to the rest pose.
#[derive(Clone, Debug)]
struct Settle {
    from: Pose,
    elapsed: f32,
    duration: f32,
}

#[derive(Debug)]
pub struct AnimationPlayer {
    active: Option<AnimationInstance>,
    speed: f32,
    rest: Pose,
    /// Last pose handed out by `sample`.
    shown: Pose,
    /// Pose shown while idle and not settling.
    held: Pose,
    /// Cross-fade source for the active instance and time since it started.
    blend_from: Option<Pose>,
    since_start: f32,
    settle: Option<Settle>,
}

fn fmod(a: f32, b: f32) -> f32 {
    if b == 0.0 {
        return 0.0;
    }
    let m = a % b;
    if (m < 0.0 && b > 0.0) || (m > 0.0 && b < 0.0) {
        m + b
    } else {
        m
    }
}

impl AnimationPlayer {
    pub fn new(rest: Pose, speed: f32) -> Self {
        Self {
            active: None,
            speed,
            shown: rest.clone(),
            held: rest.clone(),
            rest,
            blend_from: None,
            since_start: 0.0,
            settle: None,
        }
    }

    pub fn state(&self) -> PlayerState {
        if self.active.is_some() {
            PlayerState::Active
        } else {
            PlayerState::Idle
        }
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    pub fn active(&self) -> Option<&AnimationInstance> {
        self.active.as_ref()
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    pub fn rest_pose(&self) -> &Pose {
        &self.rest
    }

    /// Last pose returned by `sample`.
    pub fn current_pose(&self) -> &Pose {
        &self.shown
    }

    /// Start an instance.
    ///
    /// While Active, only an `interrupt`-priority instance is accepted; the
    /// replaced instance is dropped without an `expression_completed`.
    pub fn play(
        &mut self,
        mut instance: AnimationInstance,
        events: &mut Vec<EventPayload>,
    ) -> FaceResult<()> {
        if let Some(current) = &self.active {
            if instance.priority() != Priority::Interrupt {
                return Err(FaceError::PlayerBusy {
                    active: current.name().to_string(),
                });
            }
            debug!(
                interrupted = current.name(),
                by = instance.name(),
                "active expression interrupted"
            );
        }

        instance.state = InstanceState::Active;
        instance.elapsed = 0.0;
        self.blend_from = if instance.expression.transition > 0.0 {
            Some(self.shown.clone())
        } else {
            None
        };
        self.since_start = 0.0;
        self.settle = None;
        events.push(EventPayload::ExpressionStarted {
            name: instance.name().to_string(),
        });
        self.active = Some(instance);
        Ok(())
    }

    /// Advance the active instance (or the settle blend) by `dt * speed` seconds.
    pub fn tick(&mut self, dt: f32, events: &mut Vec<EventPayload>) {
        // NaN passes through on purpose so `sample` can discard the instance
        let step = if dt < 0.0 { 0.0 } else { dt * self.speed };

        let Some(inst) = self.active.as_mut() else {
            if let Some(settle) = self.settle.as_mut() {
                if step.is_finite() {
                    settle.elapsed += step;
                }
            }
            return;
        };

        inst.elapsed += step;
        self.since_start += step;
        let duration = inst.expression.duration();

        if inst.expression.r#loop {
            inst.elapsed = fmod(inst.elapsed, duration);
            return;
        }
        if inst.elapsed >= duration {
            inst.state = InstanceState::Completed;
            let expression = Arc::clone(&inst.expression);
            self.active = None;
            self.blend_from = None;

            let last = expression
                .keyframes
                .last()
                .map(|k| self.rest.overlay(&k.pose))
                .unwrap_or_else(|| self.rest.clone());
            if expression.sticky {
                self.held = last;
            } else {
                self.held = self.rest.clone();
                self.settle = Some(Settle {
                    from: last,
                    elapsed: 0.0,
                    duration: expression.transition.max(MIN_SETTLE),
                });
            }
            events.push(EventPayload::ExpressionCompleted {
                name: expression.name.clone(),
            });
        }
    }

    /// Compute the pose for the current time.
    ///
    /// A non-finite time or pose discards the active instance (no completion
    /// event), returns the player to Idle and reports `CorruptInstance`; the
    /// last good pose stays current.
    pub fn sample(&mut self) -> FaceResult<&Pose> {
        let Some(inst) = self.active.as_ref() else {
            let settling = match self.settle.as_ref() {
                Some(s) if s.elapsed < s.duration => {
                    Some(s.from.lerp(&self.rest, s.elapsed / s.duration))
                }
                _ => None,
            };
            self.shown = match settling {
                Some(pose) => pose,
                None => {
                    self.settle = None;
                    self.held.clone()
                }
            };
            return Ok(&self.shown);
        };

        let expression = &inst.expression;
        let corrupt = if !inst.elapsed.is_finite() {
            Some(format!("non-finite elapsed time {}", inst.elapsed))
        } else {
            None
        };
        let frame = match corrupt {
            Some(_) => None,
            None => {
                let animated =
                    interpolate(&expression.keyframes, inst.elapsed, expression.interpolation_method);
                let frame = self.rest.overlay(&animated);
                frame.is_finite().then_some(frame)
            }
        };

        let Some(mut frame) = frame else {
            let name = expression.name.clone();
            let reason = corrupt.unwrap_or_else(|| "non-finite pose value".to_string());
            warn!(expression = %name, %reason, "discarding corrupt animation instance");
            self.active = None;
            self.blend_from = None;
            self.held = self.shown.clone();
            return Err(FaceError::CorruptInstance { name, reason });
        };

        let k = self.since_start / expression.transition;
        match self.blend_from.take() {
            Some(from) if k < 1.0 => {
                frame = from.lerp(&frame, k);
                self.blend_from = Some(from);
            }
            _ => {}
        }
        self.shown = frame;
        Ok(&self.shown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins;
    use crate::ids::IdAllocator;
    use crate::pose::EYE_OPENNESS;

    #[test]
    fn busy_player_rejects_normal_work() {
        let mut ids = IdAllocator::new();
        let mut player = AnimationPlayer::new(builtins::neutral().keyframes[0].pose.clone(), 1.0);
        let mut events = Vec::new();
        let blink = Arc::new(builtins::blink());
        player
            .play(AnimationInstance::new(ids.alloc_inst(), Arc::clone(&blink)), &mut events)
            .unwrap();
        let err = player
            .play(AnimationInstance::new(ids.alloc_inst(), Arc::new(builtins::happy())), &mut events)
            .unwrap_err();
        assert_eq!(err, FaceError::PlayerBusy { active: "blink".into() });
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn completion_is_reported_once() {
        let mut ids = IdAllocator::new();
        let mut player = AnimationPlayer::new(Pose::new().with(EYE_OPENNESS, 1.0), 1.0);
        let mut events = Vec::new();
        player
            .play(AnimationInstance::new(ids.alloc_inst(), Arc::new(builtins::blink())), &mut events)
            .unwrap();
        player.tick(0.06, &mut events);
        assert_eq!(player.sample().unwrap().get(EYE_OPENNESS), Some(0.0));
        player.tick(0.1, &mut events);
        player.tick(0.1, &mut events);
        assert!(player.is_idle());
        let completed = events
            .iter()
            .filter(|e| matches!(e, EventPayload::ExpressionCompleted { .. }))
            .count();
        assert_eq!(completed, 1);
        // negative steps never move time backwards
        player.tick(-1.0, &mut events);
        assert!(player.sample().unwrap().is_finite());
    }
}
