use std::any::Any;
use std::sync::{Condvar, Mutex, MutexGuard};

use crate::error::SendError;
use crate::mailbox::Mailbox;
use crate::message::Message;
use crate::role::RoleRef;

/// Dense, stable identifier assigned in creation order.
pub type ActorId = usize;

/// One addressable actor: a role binding, a mailbox, and a per-actor state
/// slot threaded through every handler invocation.
///
/// Stored behind `Arc` in the system's actor table so that growing the
/// table (a plain `Vec::push`) never invalidates an id already handed to a
/// caller.
pub struct Actor {
    pub id: ActorId,
    pub role: RoleRef,
    state_cell: Mutex<Option<Box<dyn Any + Send>>>,
    mailbox: Mutex<Mailbox>,
    not_full: Condvar,
}

/// Outcome of a non-blocking enqueue attempt. See [`Actor::try_enqueue`].
pub(crate) enum EnqueueAttempt {
    /// The message was enqueued. `was_empty` is whether this was the
    /// mailbox's 0->1 transition.
    Enqueued { was_empty: bool },
    /// The mailbox was full; the message is handed back so the caller can
    /// retry after [`Actor::wait_for_vacancy`] without losing it.
    Full(Message),
}

impl Actor {
    pub fn new(id: ActorId, role: RoleRef, queue_limit: usize) -> Self {
        Actor {
            id,
            role,
            state_cell: Mutex::new(None),
            mailbox: Mutex::new(Mailbox::new(queue_limit)),
            not_full: Condvar::new(),
        }
    }

    /// Locks and returns the mailbox, the single guard covering both the
    /// ring buffer and the `is_dead` flag.
    pub(crate) fn lock_mailbox(&self) -> MutexGuard<'_, Mailbox> {
        self.mailbox.lock().expect("actor mailbox lock poisoned")
    }

    pub(crate) fn lock_state(&self) -> MutexGuard<'_, Option<Box<dyn Any + Send>>> {
        self.state_cell.lock().expect("actor state cell poisoned")
    }

    /// Enqueues `m`, blocking the caller on the per-actor "not full"
    /// condition variable while the mailbox is at capacity. Returns
    /// `Err(SendError::Dead)` if the actor was already dead at or during
    /// the wait — never silently drops a message.
    ///
    /// Returns `Ok(true)` if this enqueue was the mailbox's 0->1
    /// transition (the caller uses this to decide whether to signal the
    /// system's work condition variable). Used directly only where no
    /// outer counter needs to be kept in lockstep with the enqueue (actor
    /// 0's initial `HELLO` during bringup, and tests that drive an `Actor`
    /// on its own); `System::send` uses [`Actor::try_enqueue`]/
    /// [`Actor::wait_for_vacancy`] instead, so `pending_total` is updated
    /// under the same `access_lock` section that performs the enqueue.
    pub(crate) fn enqueue_blocking(&self, m: Message) -> Result<bool, SendError> {
        let mut guard = self.lock_mailbox();
        loop {
            if guard.is_dead() {
                return Err(SendError::Dead);
            }
            if !guard.is_full() {
                let was_empty = guard.is_empty();
                guard
                    .enqueue(m)
                    .expect("mailbox reported full after vacancy check");
                return Ok(was_empty);
            }
            guard = self
                .not_full
                .wait(guard)
                .expect("actor mailbox lock poisoned while waiting for vacancy");
        }
    }

    /// Non-blocking enqueue attempt, for callers (`System::send`) that need
    /// to keep the system's `pending_total` counter updated in the same
    /// `access_lock` critical section that performs the enqueue. Never
    /// blocks: returns [`EnqueueAttempt::Full`] with the message handed
    /// back when the mailbox has no room, so the caller can drop
    /// `access_lock` before waiting for vacancy.
    pub(crate) fn try_enqueue(&self, m: Message) -> Result<EnqueueAttempt, SendError> {
        let mut guard = self.lock_mailbox();
        if guard.is_dead() {
            return Err(SendError::Dead);
        }
        if guard.is_full() {
            return Ok(EnqueueAttempt::Full(m));
        }
        let was_empty = guard.is_empty();
        guard
            .enqueue(m)
            .expect("mailbox reported full after vacancy check");
        Ok(EnqueueAttempt::Enqueued { was_empty })
    }

    /// Blocks the caller on the per-actor "not full" condition variable
    /// until the mailbox has room or the actor dies. Called with no
    /// `access_lock` held, so the caller must re-validate system state
    /// (the actor could have been marked dead, or the sender must recheck
    /// counters) after this returns before touching the mailbox again.
    pub(crate) fn wait_for_vacancy(&self) -> Result<(), SendError> {
        let mut guard = self.lock_mailbox();
        while !guard.is_dead() && guard.is_full() {
            guard = self
                .not_full
                .wait(guard)
                .expect("actor mailbox lock poisoned while waiting for vacancy");
        }
        if guard.is_dead() {
            Err(SendError::Dead)
        } else {
            Ok(())
        }
    }

    /// Marks the actor dead, waking any sender blocked on mailbox vacancy
    /// so it can observe the death rather than wait forever. Returns
    /// whether this call performed the 0->1 transition.
    pub(crate) fn mark_dead(&self) -> bool {
        let mut guard = self.lock_mailbox();
        let transitioned = guard.mark_dead();
        drop(guard);
        self.not_full.notify_all();
        transitioned
    }

    pub(crate) fn notify_vacancy(&self) {
        self.not_full.notify_one();
    }
}
