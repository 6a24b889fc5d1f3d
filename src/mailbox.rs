use std::collections::VecDeque;

use crate::error::MailboxFull;
use crate::message::Message;

/// Bounded FIFO of pending messages for one actor, plus its liveness flag.
///
/// A ring buffer of head/tail/count is the classic shape here; a
/// capacity-bounded `VecDeque` gives the same invariants (`0 <= len <=
/// capacity`, FIFO order) without hand-rolling index arithmetic the
/// standard library already provides.
pub struct Mailbox {
    queue: VecDeque<Message>,
    capacity: usize,
    dead: bool,
}

impl Mailbox {
    pub fn new(capacity: usize) -> Self {
        Mailbox {
            queue: VecDeque::with_capacity(capacity),
            capacity,
            dead: false,
        }
    }

    /// Appends `m` at the tail. Caller must hold the actor's mailbox lock.
    pub fn enqueue(&mut self, m: Message) -> Result<(), MailboxFull> {
        if self.queue.len() == self.capacity {
            return Err(MailboxFull);
        }
        self.queue.push_back(m);
        Ok(())
    }

    /// Removes and returns the head message, if any. Caller must hold the
    /// actor's mailbox lock.
    pub fn try_dequeue(&mut self) -> Option<Message> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.queue.len() == self.capacity
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Marks the mailbox dead. Idempotent; returns whether this call was
    /// the 0->1 transition.
    pub fn mark_dead(&mut self) -> bool {
        if self.dead {
            false
        } else {
            self.dead = true;
            true
        }
    }

    /// Messages still in the ring at teardown are discarded, not dispatched.
    pub fn drain_discard(&mut self) {
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enqueue_respects_capacity() {
        let mut mbox = Mailbox::new(2);
        assert!(mbox.enqueue(Message::empty(10)).is_ok());
        assert!(mbox.enqueue(Message::empty(11)).is_ok());
        assert!(mbox.enqueue(Message::empty(12)).is_err());
    }

    #[test]
    fn fifo_order() {
        let mut mbox = Mailbox::new(4);
        for k in 0..4 {
            mbox.enqueue(Message::empty(k)).unwrap();
        }
        for k in 0..4 {
            assert_eq!(mbox.try_dequeue().unwrap().kind, k);
        }
        assert!(mbox.try_dequeue().is_none());
    }

    #[test]
    fn mark_dead_is_idempotent_and_reports_transition() {
        let mut mbox = Mailbox::new(1);
        assert!(mbox.mark_dead());
        assert!(!mbox.mark_dead());
        assert!(mbox.is_dead());
    }
}
