//! Host-testable log backend. Used by `cargo test` and by any out-of-tree
//! userland harness that wants to drive the kernel without real hardware.

use alloc::string::String;
use alloc::vec::Vec;

use spin::Mutex;

static LOG: Mutex<Vec<String>> = Mutex::new(Vec::new());

pub fn write_line(line: &str) {
    LOG.lock().push(String::from(line));
}

/// Drains and returns every line written so far. Test-only: production
/// code has no reason to read its own log back.
#[cfg(test)]
pub fn drain_log() -> Vec<String> {
    core::mem::take(&mut *LOG.lock())
}
