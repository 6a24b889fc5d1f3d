//! `cacti`: an in-process actor runtime on a fixed-size worker thread pool.
//!
//! Clients register [`Role`]s (ordered tables of message handlers), spawn
//! actors bound to a role through the reserved `SPAWN` control message, and
//! deliver messages with [`System::send`]. The runtime guarantees that each
//! actor processes at most one message at a time while many actors make
//! progress in parallel across the pool.
#![deny(clippy::all)]
#![allow(clippy::new_ret_no_self)]

mod actor;
mod config;
mod error;
mod logger;
mod mailbox;
mod message;
mod role;
mod scheduler;
mod system;

pub use actor::ActorId;
pub use config::Config;
pub use error::{CreateError, SendError};
pub use message::{HelloPayload, Message, SpawnPayload, FIRST_USER_KIND, GODIE, HELLO, SPAWN};
pub use role::{blank_handler, Handler, Role, RoleRef};
pub use system::{self_id, send, System};
