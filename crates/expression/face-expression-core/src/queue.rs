//! Expression queue manager: FIFO of pending normal-priority instances plus
//! the interrupt path straight to the player.
//!
//! The queue never hands out an instance while the player is Active, which
//! together with `AnimationPlayer::play` keeps at most one instance Active.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::debug;

use crate::data::{Expression, Priority};
use crate::error::FaceResult;
use crate::events::EventPayload;
use crate::ids::{IdAllocator, InstId};
use crate::player::{AnimationInstance, AnimationPlayer};

/// Outcome of `ExpressionQueue::enqueue`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Enqueued {
    /// Appended to the tail of the queue.
    Queued(InstId),
    /// Handed to the player and already Active.
    Started(InstId),
    /// Idle-priority request while other work was pending or playing.
    Skipped,
}

#[derive(Debug, Default)]
pub struct ExpressionQueue {
    pending: VecDeque<AnimationInstance>,
    ids: IdAllocator,
}

impl ExpressionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a request by priority.
    ///
    /// - `normal`: appended (FIFO).
    /// - `interrupt`: replaces whatever is playing; queued work stays queued.
    /// - `idle`: started only if the player is idle and nothing is queued,
    ///   otherwise dropped. Idle work is never queued.
    pub fn enqueue(
        &mut self,
        expression: Arc<Expression>,
        player: &mut AnimationPlayer,
        events: &mut Vec<EventPayload>,
    ) -> FaceResult<Enqueued> {
        let id = self.ids.alloc_inst();
        let instance = AnimationInstance::new(id, expression);
        match instance.priority() {
            Priority::Normal => {
                self.pending.push_back(instance);
                Ok(Enqueued::Queued(id))
            }
            Priority::Interrupt => {
                player.play(instance, events)?;
                Ok(Enqueued::Started(id))
            }
            Priority::Idle => {
                if player.is_idle() && self.pending.is_empty() {
                    player.play(instance, events)?;
                    Ok(Enqueued::Started(id))
                } else {
                    debug!(expression = instance.name(), "idle request skipped, engine busy");
                    Ok(Enqueued::Skipped)
                }
            }
        }
    }

    /// Pop the head of the queue, but only while the player is idle.
    pub fn dequeue_next(&mut self, player: &AnimationPlayer) -> Option<AnimationInstance> {
        if !player.is_idle() {
            return None;
        }
        self.pending.pop_front()
    }

    /// Drop all pending work without completion events. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let n = self.pending.len();
        self.pending.clear();
        n
    }

    pub fn peek(&self) -> Option<&AnimationInstance> {
        self.pending.front()
    }

    /// Names of pending expressions, head first.
    pub fn pending_names(&self) -> Vec<String> {
        self.pending.iter().map(|i| i.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins;
    use crate::pose::Pose;

    fn player() -> AnimationPlayer {
        AnimationPlayer::new(Pose::new(), 1.0)
    }

    #[test]
    fn dequeue_waits_for_an_idle_player() {
        let mut queue = ExpressionQueue::new();
        let mut player = player();
        let mut events = Vec::new();
        queue
            .enqueue(Arc::new(builtins::happy()), &mut player, &mut events)
            .unwrap();
        queue
            .enqueue(Arc::new(builtins::sad()), &mut player, &mut events)
            .unwrap();
        assert!(events.is_empty());

        let head = queue.dequeue_next(&player).unwrap();
        assert_eq!(head.name(), "happy");
        player.play(head, &mut events).unwrap();
        assert!(queue.dequeue_next(&player).is_none());
        assert_eq!(queue.peek().map(|i| i.name()), Some("sad"));
        assert_eq!(queue.pending_names(), vec!["sad"]);
    }

    #[test]
    fn interrupt_bypasses_the_queue() {
        let mut queue = ExpressionQueue::new();
        let mut player = player();
        let mut events = Vec::new();
        let urgent = Arc::new(builtins::scared().with_priority(Priority::Interrupt));
        queue
            .enqueue(Arc::new(builtins::happy()), &mut player, &mut events)
            .unwrap();
        let started = queue.enqueue(urgent, &mut player, &mut events).unwrap();
        assert!(matches!(started, Enqueued::Started(_)));
        assert_eq!(player.active().map(|i| i.name()), Some("scared"));
        assert_eq!(queue.len(), 1);
    }
}
