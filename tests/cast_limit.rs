mod common;

use std::sync::{Arc, Mutex, OnceLock};

use cacti::{Config, Handler, HelloPayload, Message, Role, RoleRef, SpawnPayload, System, GODIE, SPAWN};

/// S3 (cap): with `cast_limit = 4`, repeated `SPAWN` from actor 0 succeeds
/// for the first three children and is silently absorbed afterward.
#[test]
fn spawn_stops_silently_at_cast_limit() {
    let role_cell: Arc<OnceLock<RoleRef>> = Arc::new(OnceLock::new());
    let hello_count = Arc::new(Mutex::new(0usize));

    let hello_count_h = hello_count.clone();
    let hello_handler: Handler = Box::new(move |_state, msg| {
        msg.payload.downcast::<HelloPayload>().expect("HELLO payload");
        *hello_count_h.lock().unwrap() += 1;
    });

    let role_cell_k = role_cell.clone();
    let kind1_handler: Handler = Box::new(move |_state, _msg| {
        let me = cacti::self_id().expect("dispatched inside a handler");
        let role = role_cell_k
            .get()
            .expect("role is set before the system starts dispatching")
            .clone();
        for _ in 0..10 {
            let _ = cacti::send(me, Message::new(SPAWN, Box::new(SpawnPayload { role: role.clone() })));
        }
        let _ = cacti::send(me, Message::empty(GODIE));
    });

    let role = Role::new(vec![hello_handler, kind1_handler]);
    role_cell.set(role.clone()).ok();

    let config = Config {
        cast_limit: 4,
        ..Config::default()
    };
    let (system, first) = System::create(role, config).expect("system creates");

    system
        .send(first, Message::empty(1))
        .expect("trigger the spawn burst");

    common::interrupt_after(300);
    system.join(first);

    assert_eq!(
        *hello_count.lock().unwrap(),
        4,
        "cast_limit=4 should cap total actors ever created, including actor 0"
    );
}
