use std::sync::Arc;

use crate::actor::{Actor, ActorId};
use crate::message::Message;

/// Everything guarded by the system's single `access_lock`: the actor
/// table itself (append-only, growth handled by `Vec`) and the four
/// scheduling counters plus round-robin cursor.
pub(crate) struct SystemState {
    pub actors: Vec<Arc<Actor>>,
    pub pending_total: usize,
    pub dead_total: usize,
    pub working_total: usize,
    cursor: usize,
}

impl SystemState {
    pub fn new() -> Self {
        SystemState {
            actors: Vec::with_capacity(64),
            pending_total: 0,
            dead_total: 0,
            working_total: 0,
            cursor: 0,
        }
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// The runtime's quiescence condition: nothing pending, nothing in
    /// flight, and every actor accounted for as dead.
    pub fn is_quiescent(&self) -> bool {
        self.pending_total == 0
            && self.dead_total == self.actor_count()
            && self.working_total == 0
    }

    /// Runs in a worker that already holds `access_lock`.
    ///
    /// Walks at most `actor_count` steps from the cursor, taking each
    /// candidate's own mailbox lock to probe-and-dequeue. Two workers can
    /// never race the same actor's mailbox here because only one `&mut
    /// SystemState` exists at a time (it sits behind the system's single
    /// `Mutex`) — the mailbox lock inside the loop exists for the *dispatch*
    /// side's invariant (no concurrent handler for one actor), not to
    /// arbitrate between concurrent scheduler scans, which the outer mutex
    /// already serializes.
    pub fn schedule_next(&mut self) -> Option<(ActorId, Message)> {
        let n = self.actors.len();
        if n == 0 {
            return None;
        }

        for _ in 0..n {
            let idx = self.cursor;
            self.cursor = (self.cursor + 1) % n;
            let actor = &self.actors[idx];

            let mut mbox = actor.lock_mailbox();
            if let Some(msg) = mbox.try_dequeue() {
                drop(mbox);
                self.pending_total -= 1;
                actor.notify_vacancy();
                return Some((actor.id, msg));
            }
        }
        None
    }
}
