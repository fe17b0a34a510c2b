//! Process-wide log setup for back-office binaries and tests.

pub mod subscriber;

pub use subscriber::{LogFormat, init_with};

/// Install JSON logging filtered by `RUST_LOG` (default `info`).
///
/// Only the first call in a process installs a subscriber; later calls return quietly.
pub fn init() {
    init_with(LogFormat::Json, "info");
}
