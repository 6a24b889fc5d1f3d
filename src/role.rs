use std::any::Any;
use std::sync::Arc;

use crate::message::Message;

/// A handler invoked for one message kind.
///
/// Handler at index `k` of a [`Role`] serves user messages of kind `k`.
/// It is given the actor's persistent state cell (`None` on the first
/// call, and on every `HELLO` dispatch) and the message that triggered it.
pub type Handler = Box<dyn Fn(&mut Option<Box<dyn Any + Send>>, Message) + Send + Sync>;

/// An immutable, shared table of message handlers.
///
/// Bound to an actor at creation and never mutated afterwards; many actors
/// may share one `Role` (it is reference-counted, not cloned per actor).
pub struct Role {
    handlers: Vec<Handler>,
}

/// Shared handle to a `Role`, cheap to clone and to carry inside a `SPAWN`
/// message's payload.
pub type RoleRef = Arc<Role>;

impl Role {
    /// Build a role from an ordered, non-empty sequence of handlers.
    ///
    /// # Panics
    /// Panics if `handlers` is empty — a `Role` with no handlers could never
    /// usefully dispatch even its own `HELLO`.
    pub fn new(handlers: Vec<Handler>) -> RoleRef {
        assert!(
            !handlers.is_empty(),
            "a Role must declare at least one handler (index 0 serves HELLO)"
        );
        Arc::new(Role { handlers })
    }

    pub fn handler(&self, index: u32) -> Option<&Handler> {
        self.handlers.get(index as usize)
    }
}

/// A handler that ignores its message. Convenient filler for handler index
/// 0 (the `HELLO` slot) when a role has nothing to do on introduction.
pub fn blank_handler() -> Handler {
    Box::new(|_state, _msg| {})
}
