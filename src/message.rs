use std::any::Any;
use std::fmt;

use crate::actor::ActorId;

/// Reserved message kinds, dispatched by the runtime itself rather than
/// handed to a role's handlers. `HELLO` is fixed at 0; `GODIE`/`SPAWN` sit
/// at the top of the kind space instead of immediately after it, since
/// small kinds like `1` are meant to stay free for ordinary user handlers.
pub const HELLO: u32 = 0;
pub const GODIE: u32 = u32::MAX - 1;
pub const SPAWN: u32 = u32::MAX;

/// The smallest kind value a [`Role`](crate::Role) handler may occupy.
///
/// Only kind `0` is reserved below this: a `Role`'s handler table is
/// indexed by kind directly, so handler 0 is the `HELLO` introduction
/// handler and every kind from `FIRST_USER_KIND` up to (but not including)
/// `GODIE` is available to user roles.
pub const FIRST_USER_KIND: u32 = 1;

/// One unit of work delivered to an actor's mailbox.
///
/// `payload` owns whatever the caller handed to `send`; the runtime never
/// inspects it except to downcast a `SPAWN` message's [`SpawnPayload`] or
/// hand a user kind's payload to its handler untouched.
pub struct Message {
    pub kind: u32,
    pub payload: Box<dyn Any + Send>,
}

impl Message {
    pub fn new(kind: u32, payload: Box<dyn Any + Send>) -> Self {
        Message { kind, payload }
    }

    /// Convenience for a control or user message that carries no payload.
    pub fn empty(kind: u32) -> Self {
        Message::new(kind, Box::new(()))
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Message").field("kind", &self.kind).finish()
    }
}

/// Payload carried by a synthesized `SPAWN` message: the role to bind the
/// new actor to.
pub struct SpawnPayload {
    pub role: crate::role::RoleRef,
}

/// Payload carried by the `HELLO` message the runtime enqueues to every
/// newly spawned actor: the id of the actor that spawned it.
#[derive(Debug, Clone, Copy)]
pub struct HelloPayload {
    pub spawned_by: ActorId,
}
