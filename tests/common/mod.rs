use std::thread;
use std::time::Duration;

/// Raises `SIGINT` against this test process after `delay_ms`, standing in
/// for the external interrupt the shutdown controller waits on — there is
/// no in-process "stop" call by design.
pub fn interrupt_after(delay_ms: u64) {
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(delay_ms));
        unsafe {
            libc::kill(libc::getpid(), libc::SIGINT);
        }
    });
}
