use slog::{o, Drain};

/// Build the system's root logger.
///
/// Plain terminal output through an async drain, the common `slog`
/// wiring (`slog_term::TermDecorator` -> `slog_async::Async`).
pub fn root_logger() -> slog::Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    slog::Logger::root(drain, o!("crate" => "cacti"))
}
