mod common;

use std::sync::{Arc, Mutex};

use cacti::{blank_handler, Config, Message, Role, System, GODIE};

/// S1 (echo): handler at kind 1 appends the message's payload byte to a
/// per-actor log. Expect the log `"abcde"` after sending five messages and
/// a `GODIE`, then an external interrupt.
#[test]
fn echo_appends_payload_bytes_in_order() {
    let log = Arc::new(Mutex::new(Vec::<u8>::new()));
    let log_for_handler = log.clone();

    let role = Role::new(vec![
        blank_handler(),
        Box::new(move |_state, msg| {
            let byte = *msg.payload.downcast::<u8>().expect("echo payload is a u8");
            log_for_handler.lock().unwrap().push(byte);
        }),
    ]);

    let (system, first) = System::create(role, Config::default()).expect("system creates");

    for byte in b'a'..=b'e' {
        system
            .send(first, Message::new(1, Box::new(byte)))
            .expect("send succeeds while actor is alive");
    }
    system
        .send(first, Message::empty(GODIE))
        .expect("GODIE is a normal send");

    common::interrupt_after(50);
    system.join(first);

    assert_eq!(&*log.lock().unwrap(), b"abcde");
}
