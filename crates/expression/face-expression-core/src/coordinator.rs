//! Event coordinator: the engine's only synchronization boundary.
//!
//! Producers on any thread post into a bounded, mutex-guarded inbox through
//! cloneable `EventSender`s. The tick loop drains the inbox once per tick and
//! publishes to subscribers synchronously on its own thread, so handlers never
//! run concurrently with engine state changes.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::warn;

use crate::error::BackpressureWarning;
use crate::events::{Event, EventKind, EventPayload};
use crate::ids::{IdAllocator, SubscriptionId};

/// Subscriber callback. Runs on the tick thread.
pub type Handler = Box<dyn FnMut(&Event) + Send>;

#[derive(Debug)]
struct InboxState {
    buf: VecDeque<Event>,
    next_seq: u64,
    dropped_since_drain: u64,
}

#[derive(Debug)]
struct Inbox {
    state: Mutex<InboxState>,
    capacity: usize,
    epoch: Instant,
}

impl Inbox {
    fn push(&self, payload: EventPayload) -> Result<(), BackpressureWarning> {
        let timestamp = self.epoch.elapsed();
        let mut state = self.state.lock();
        // seq is assigned under the lock: arrival order is the total order
        let seq = state.next_seq;
        state.next_seq += 1;

        let mut dropped = 0u64;
        while state.buf.len() >= self.capacity {
            state.buf.pop_front();
            dropped += 1;
        }
        state.dropped_since_drain += dropped;
        state.buf.push_back(Event {
            seq,
            timestamp,
            payload,
        });
        drop(state);

        if dropped > 0 {
            warn!(
                dropped,
                capacity = self.capacity,
                "event inbox full, oldest events dropped"
            );
            return Err(BackpressureWarning {
                dropped,
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}

/// Producer handle; cheap to clone and `Send + Sync`.
#[derive(Clone, Debug)]
pub struct EventSender {
    inbox: Arc<Inbox>,
}

impl EventSender {
    /// Post an event for the next tick.
    ///
    /// The event is always accepted. `Err` reports that older pending events
    /// had to be dropped to make room.
    pub fn emit(&self, payload: EventPayload) -> Result<(), BackpressureWarning> {
        self.inbox.push(payload)
    }
}

pub struct EventCoordinator {
    inbox: Arc<Inbox>,
    subscribers: Vec<(SubscriptionId, EventKind, Handler)>,
    ids: IdAllocator,
    next_out_seq: u64,
    overflow: Option<BackpressureWarning>,
}

impl std::fmt::Debug for EventCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventCoordinator")
            .field("capacity", &self.inbox.capacity)
            .field("subscribers", &self.subscribers.len())
            .field("next_out_seq", &self.next_out_seq)
            .finish()
    }
}

impl EventCoordinator {
    /// Coordinator whose inbox holds at most `capacity` (min 1) pending events.
    pub fn new(capacity: usize) -> Self {
        Self {
            inbox: Arc::new(Inbox {
                state: Mutex::new(InboxState {
                    buf: VecDeque::with_capacity(capacity.clamp(1, 4096)),
                    next_seq: 0,
                    dropped_since_drain: 0,
                }),
                capacity: capacity.max(1),
                epoch: Instant::now(),
            }),
            subscribers: Vec::new(),
            ids: IdAllocator::new(),
            next_out_seq: 0,
            overflow: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.inbox.capacity
    }

    pub fn sender(&self) -> EventSender {
        EventSender {
            inbox: Arc::clone(&self.inbox),
        }
    }

    /// Post into the inbox from the owning thread; same semantics as `EventSender::emit`.
    pub fn emit(&self, payload: EventPayload) -> Result<(), BackpressureWarning> {
        self.inbox.push(payload)
    }

    /// Number of events waiting for the next drain.
    pub fn pending(&self) -> usize {
        self.inbox.state.lock().buf.len()
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&Event) + Send + 'static,
    {
        let id = self.ids.alloc_subscription();
        self.subscribers.push((id, kind, Box::new(handler)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Take every pending event in arrival order.
    ///
    /// Events posted after this call wait for the next drain. If events were
    /// dropped since the previous drain, the warning is kept for `take_overflow`.
    pub fn drain(&mut self) -> Vec<Event> {
        let mut state = self.inbox.state.lock();
        let events: Vec<Event> = state.buf.drain(..).collect();
        let dropped = std::mem::take(&mut state.dropped_since_drain);
        drop(state);
        if dropped > 0 {
            self.overflow = Some(BackpressureWarning {
                dropped,
                capacity: self.inbox.capacity,
            });
        }
        events
    }

    /// Overflow recorded by the last `drain`, if any.
    pub fn take_overflow(&mut self) -> Option<BackpressureWarning> {
        self.overflow.take()
    }

    /// Stamp an engine-produced event and deliver it to its subscribers now.
    pub fn publish(&mut self, payload: EventPayload) -> Event {
        let event = Event {
            seq: self.next_out_seq,
            timestamp: self.inbox.epoch.elapsed(),
            payload,
        };
        self.next_out_seq += 1;
        self.dispatch(&event);
        event
    }

    /// Deliver an already stamped event to the subscribers of its kind.
    pub fn dispatch(&mut self, event: &Event) {
        let kind = event.kind();
        for (_, k, handler) in self.subscribers.iter_mut() {
            if *k == kind {
                handler(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_drops_oldest_and_reports_once() {
        let mut coord = EventCoordinator::new(2);
        for id in 0..3 {
            let res = coord.emit(EventPayload::FaceDisappeared { id });
            assert_eq!(res.is_err(), id == 2);
        }
        let events = coord.drain();
        let ids: Vec<u64> = events.iter().map(|e| e.seq).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(
            coord.take_overflow(),
            Some(BackpressureWarning {
                dropped: 1,
                capacity: 2
            })
        );
        assert_eq!(coord.take_overflow(), None);
        assert!(coord.drain().is_empty());
        assert_eq!(coord.take_overflow(), None);
    }
}
