use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use signal_hook::consts::SIGINT;
use signal_hook::iterator::Signals;
use slog::{debug, error, info, warn};

use crate::actor::{Actor, ActorId, EnqueueAttempt};
use crate::config::Config;
use crate::error::{CreateError, SendError};
use crate::message::{HelloPayload, Message, SpawnPayload, GODIE, HELLO, SPAWN};
use crate::role::RoleRef;
use crate::scheduler::SystemState;

thread_local! {
    static CURRENT: RefCell<Option<(System, ActorId)>> = RefCell::new(None);
}

/// Returns the id of the actor currently being dispatched on this thread, or
/// `None` when called outside of dispatch.
pub fn self_id() -> Option<ActorId> {
    CURRENT.with(|c| c.borrow().as_ref().map(|&(_, id)| id))
}

/// Sends `message` to `actor_id` using the system that is dispatching the
/// calling handler — a thread-local "current runtime" so handlers can
/// `send`/spawn without being handed a `System`.
///
/// # Panics
/// Panics if called from outside of actor dispatch. A handler is always
/// dispatched with this context set; code calling this from any other
/// thread should hold a `System` and call [`System::send`] directly.
pub fn send(actor_id: ActorId, message: Message) -> Result<(), SendError> {
    CURRENT.with(|c| {
        let borrow = c.borrow();
        let (system, _) = borrow
            .as_ref()
            .expect("cacti::send called outside of actor dispatch; use System::send instead");
        system.send(actor_id, message)
    })
}

struct Inner {
    state: Mutex<SystemState>,
    work_cv: Condvar,
    config: Config,
    log: slog::Logger,
    workers: Mutex<Vec<JoinHandle<()>>>,
    shutdown: Mutex<Option<JoinHandle<()>>>,
    joined: AtomicBool,
}

/// Handle to a running actor system.
///
/// Cheap to clone (an `Arc` underneath); every clone refers to the same
/// runtime. An explicit handle, not a process-wide global pointer.
#[derive(Clone)]
pub struct System {
    inner: Arc<Inner>,
}

impl System {
    /// `system_create`: brings up the worker pool and the shutdown
    /// controller, creates actor 0 bound to `role`, and enqueues `HELLO(0)`
    /// to it.
    pub fn create(role: RoleRef, config: Config) -> Result<(System, ActorId), CreateError> {
        let log = crate::logger::root_logger();
        let mut state = SystemState::new();

        let first = Actor::new(0, role, config.actor_queue_limit);
        first
            .enqueue_blocking(Message::new(HELLO, Box::new(HelloPayload { spawned_by: 0 })))
            .expect("freshly created actor cannot already be dead");
        state.actors.push(Arc::new(first));
        state.pending_total = 1;

        let inner = Arc::new(Inner {
            state: Mutex::new(state),
            work_cv: Condvar::new(),
            config,
            log,
            workers: Mutex::new(Vec::new()),
            shutdown: Mutex::new(None),
            joined: AtomicBool::new(false),
        });
        let system = System { inner };

        let mut workers = Vec::with_capacity(system.inner.config.pool_size);
        for idx in 0..system.inner.config.pool_size {
            let worker_sys = system.clone();
            match thread::Builder::new()
                .name(format!("cacti-worker-{}", idx))
                .spawn(move || worker_sys.worker_loop())
            {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    system.abort_bringup(workers);
                    return Err(CreateError::ThreadSpawn(e.to_string()));
                }
            }
        }
        *system.inner.workers.lock().expect("workers lock poisoned") = workers;

        let signals = match Signals::new([SIGINT]) {
            Ok(s) => s,
            Err(e) => {
                let workers =
                    std::mem::take(&mut *system.inner.workers.lock().expect("workers lock poisoned"));
                system.abort_bringup(workers);
                return Err(CreateError::SignalInstall(e.to_string()));
            }
        };

        let shutdown_sys = system.clone();
        match thread::Builder::new()
            .name("cacti-shutdown".into())
            .spawn(move || shutdown_sys.shutdown_controller(signals))
        {
            Ok(shutdown_handle) => {
                *system
                    .inner
                    .shutdown
                    .lock()
                    .expect("shutdown handle lock poisoned") = Some(shutdown_handle);
            }
            Err(e) => {
                let workers =
                    std::mem::take(&mut *system.inner.workers.lock().expect("workers lock poisoned"));
                system.abort_bringup(workers);
                return Err(CreateError::ThreadSpawn(e.to_string()));
            }
        }

        info!(system.inner.log, "actor system started";
            "pool_size" => system.inner.config.pool_size,
            "cast_limit" => system.inner.config.cast_limit);
        Ok((system, 0))
    }

    /// Tears down a failed bringup: marks every actor dead so any worker
    /// already running observes quiescence and exits on its own, then joins
    /// the workers that did get spawned before the failure. No partial
    /// system is ever handed back to the caller of [`System::create`].
    fn abort_bringup(&self, workers: Vec<JoinHandle<()>>) {
        {
            let mut state = self.inner.state.lock().expect("access lock poisoned");
            let n = state.actor_count();
            for i in 0..n {
                let actor = state.actors[i].clone();
                if actor.mark_dead() {
                    state.dead_total += 1;
                }
            }
            self.inner.work_cv.notify_all();
        }
        for handle in workers {
            let _ = handle.join();
        }
    }

    /// `system_join`: blocks until the shutdown controller (and
    /// transitively every worker) has finished. Idempotent — a second call
    /// observes the threads already joined and returns immediately.
    pub fn join(&self, _actor_id: ActorId) {
        if self.inner.joined.swap(true, Ordering::SeqCst) {
            return;
        }
        let handle = self
            .inner
            .shutdown
            .lock()
            .expect("shutdown handle lock poisoned")
            .take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
        debug!(self.inner.log, "actor system joined");
    }

    /// `send`: validates the id, attempts the enqueue, and accounts
    /// `pending_total` all under one `access_lock` section — matching
    /// spec.md §5's "the send path takes [access_lock, mailbox_lock] in
    /// the same order" and keeping the scheduler's direct mailbox scan
    /// (scheduler.rs) from ever dequeuing a message whose `pending_total`
    /// increment hasn't landed yet. When the mailbox is momentarily full,
    /// `access_lock` is dropped before blocking on the recipient's "not
    /// full" condition variable, and the id/liveness check is redone on
    /// the next loop iteration once a slot opens up.
    pub fn send(&self, actor_id: ActorId, message: Message) -> Result<(), SendError> {
        let mut message = message;
        loop {
            let mut state = self.inner.state.lock().expect("access lock poisoned");
            let actor = state
                .actors
                .get(actor_id)
                .cloned()
                .ok_or(SendError::NoSuchActor)?;

            match actor.try_enqueue(message)? {
                EnqueueAttempt::Enqueued { was_empty } => {
                    state.pending_total += 1;
                    if was_empty && state.working_total < self.inner.config.pool_size {
                        self.inner.work_cv.notify_one();
                    }
                    return Ok(());
                }
                EnqueueAttempt::Full(returned) => {
                    message = returned;
                    drop(state);
                    actor.wait_for_vacancy()?;
                }
            }
        }
    }

    fn worker_loop(&self) {
        loop {
            let mut state = self.inner.state.lock().expect("access lock poisoned");
            while state.pending_total == 0 && state.dead_total < state.actor_count() {
                state = self
                    .inner
                    .work_cv
                    .wait(state)
                    .expect("access lock poisoned while waiting for work");
            }
            if state.pending_total == 0 && state.dead_total == state.actor_count() {
                self.inner.work_cv.notify_all();
                return;
            }

            let (actor_id, message) = state
                .schedule_next()
                .expect("pending_total > 0 but the scheduler scan found no message");
            state.working_total += 1;
            let actor = state.actors[actor_id].clone();
            drop(state);

            self.dispatch(actor_id, &actor, message);

            let mut state = self.inner.state.lock().expect("access lock poisoned");
            state.working_total -= 1;
            if state.is_quiescent() {
                self.inner.work_cv.notify_all();
            }
        }
    }

    fn dispatch(&self, actor_id: ActorId, actor: &Arc<Actor>, message: Message) {
        match message.kind {
            SPAWN => self.handle_spawn(actor_id, message),
            GODIE => self.handle_godie(actor_id, actor),
            HELLO => self.invoke_handler(actor_id, actor, 0, message, true),
            kind => self.invoke_handler(actor_id, actor, kind, message, false),
        }
    }

    fn handle_spawn(&self, spawning_actor: ActorId, message: Message) {
        let payload = match message.payload.downcast::<SpawnPayload>() {
            Ok(p) => p,
            Err(_) => {
                error!(self.inner.log, "malformed SPAWN payload"; "actor" => spawning_actor);
                return;
            }
        };

        let new_id = {
            let mut state = self.inner.state.lock().expect("access lock poisoned");
            if state.actor_count() >= self.inner.config.cast_limit {
                debug!(self.inner.log, "cast limit reached, dropping SPAWN"; "actor" => spawning_actor);
                return;
            }
            let id = state.actor_count();
            let actor = Actor::new(id, payload.role.clone(), self.inner.config.actor_queue_limit);
            state.actors.push(Arc::new(actor));
            id
        };

        let hello = Message::new(HELLO, Box::new(HelloPayload { spawned_by: spawning_actor }));
        match self.send(new_id, hello) {
            Ok(()) => debug!(self.inner.log, "actor spawned"; "id" => new_id, "by" => spawning_actor),
            Err(e) => error!(self.inner.log, "failed to enqueue HELLO to new actor"; "id" => new_id, "error" => %e),
        }
    }

    fn handle_godie(&self, actor_id: ActorId, actor: &Arc<Actor>) {
        let mut state = self.inner.state.lock().expect("access lock poisoned");
        if actor.mark_dead() {
            state.dead_total += 1;
            debug!(self.inner.log, "actor died"; "id" => actor_id);
        }
    }

    fn invoke_handler(
        &self,
        actor_id: ActorId,
        actor: &Arc<Actor>,
        handler_index: u32,
        message: Message,
        hello: bool,
    ) {
        let handler = match actor.role.handler(handler_index) {
            Some(h) => h,
            None => {
                warn!(self.inner.log, "no handler for message kind"; "actor" => actor_id, "kind" => handler_index);
                return;
            }
        };

        CURRENT.with(|c| *c.borrow_mut() = Some((self.clone(), actor_id)));
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            if hello {
                let mut blank = None;
                handler(&mut blank, message);
            } else {
                let mut cell = actor.lock_state();
                handler(&mut cell, message);
            }
        }));
        CURRENT.with(|c| *c.borrow_mut() = None);

        if outcome.is_err() {
            error!(self.inner.log, "handler panicked"; "actor" => actor_id, "kind" => handler_index);
        }
    }

    fn shutdown_controller(&self, mut signals: Signals) {
        // Block synchronously for the signal (sigwait-style), rather than
        // an async signal handler taking mutexes from signal context.
        for _ in signals.forever() {
            break;
        }

        info!(self.inner.log, "SIGINT received, marking all actors dead");
        {
            let mut state = self.inner.state.lock().expect("access lock poisoned");
            let n = state.actor_count();
            for i in 0..n {
                let actor = state.actors[i].clone();
                if actor.mark_dead() {
                    state.dead_total += 1;
                }
            }
            self.inner.work_cv.notify_all();
        }

        let workers = std::mem::take(&mut *self.inner.workers.lock().expect("workers lock poisoned"));
        for handle in workers {
            let _ = handle.join();
        }

        // Workers only stop once pending_total has reached zero, so this is
        // normally a no-op; it exists so nothing left in a ring ever gets
        // dispatched after this point, whatever the reason it's still there.
        {
            let state = self.inner.state.lock().expect("access lock poisoned");
            for actor in state.actors.iter() {
                actor.lock_mailbox().drain_discard();
            }
        }

        info!(self.inner.log, "all workers joined, system terminated");
    }
}
