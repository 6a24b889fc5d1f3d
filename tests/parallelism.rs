mod common;

use std::sync::{Arc, Condvar, Mutex, OnceLock};
use std::time::{Duration, Instant};

use cacti::{Config, Handler, HelloPayload, Message, Role, RoleRef, SpawnPayload, System, SPAWN};

/// S6 (parallelism): a role handler that sleeps 50 ms is given one message
/// each on three distinct actors. Wall-clock from the first dispatch to
/// the last completion must stay well under the sum of the sleeps, which
/// only holds if the pool actually runs actors concurrently rather than
/// one at a time.
#[test]
fn three_actors_run_concurrently() {
    let role_cell: Arc<OnceLock<RoleRef>> = Arc::new(OnceLock::new());

    let created_pair: Arc<(Mutex<Vec<usize>>, Condvar)> =
        Arc::new((Mutex::new(vec![0]), Condvar::new()));
    let completions_pair: Arc<(Mutex<Vec<Instant>>, Condvar)> =
        Arc::new((Mutex::new(Vec::new()), Condvar::new()));

    let created_h = created_pair.clone();
    let hello_handler: Handler = Box::new(move |_state, msg| {
        msg.payload.downcast::<HelloPayload>().expect("HELLO payload");
        let me = cacti::self_id().expect("dispatched inside HELLO");
        let (lock, cvar) = &*created_h;
        let mut ids = lock.lock().unwrap();
        if !ids.contains(&me) {
            ids.push(me);
        }
        cvar.notify_all();
    });

    let completions_k = completions_pair.clone();
    let sleep_handler: Handler = Box::new(move |_state, _msg| {
        std::thread::sleep(Duration::from_millis(50));
        let (lock, cvar) = &*completions_k;
        lock.lock().unwrap().push(Instant::now());
        cvar.notify_all();
    });

    let role = Role::new(vec![hello_handler, sleep_handler]);
    role_cell.set(role.clone()).ok();

    let config = Config {
        pool_size: 3,
        ..Config::default()
    };
    let (system, first) = System::create(role.clone(), config).expect("system creates");

    // Grow the table to three actors (ids 0, 1, 2) before timing anything.
    for _ in 0..2 {
        system
            .send(
                first,
                Message::new(SPAWN, Box::new(SpawnPayload { role: role.clone() })),
            )
            .expect("spawn while actor 0 is alive");
    }
    {
        let (lock, cvar) = &*created_pair;
        let guard = lock.lock().unwrap();
        cvar.wait_timeout_while(guard, Duration::from_secs(2), |ids| ids.len() < 3)
            .expect("condvar wait");
    }

    let start = Instant::now();
    for actor_id in 0..3usize {
        system
            .send(actor_id, Message::empty(1))
            .expect("send to a live actor");
    }

    {
        let (lock, cvar) = &*completions_pair;
        let guard = lock.lock().unwrap();
        let (guard, result) = cvar
            .wait_timeout_while(guard, Duration::from_secs(2), |done| done.len() < 3)
            .expect("condvar wait");
        assert!(!result.timed_out(), "all three actors should finish within the timeout");
        drop(guard);
    }
    let elapsed = start.elapsed();

    assert!(
        elapsed < Duration::from_millis(120),
        "three 50ms handlers should overlap, not serialize (took {:?})",
        elapsed
    );

    common::interrupt_after(50);
    system.join(first);
}
