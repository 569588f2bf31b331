//! Structured kernel log sink.
//!
//! Every line is composed here and handed to `arch::write_line`, which is
//! the only part that differs between a hosted build (a buffer behind a
//! lock, inspectable from tests) and real hardware (ITM or semihosting).

use core::fmt::Write;

use alloc::string::String;

use abi::{Status, Sysnum};

use crate::object::Object;

pub fn log_message(task: &Object, message: &[u8]) {
    let task_obj = task.as_task().expect("log_message called with a non-task object");
    let text = core::str::from_utf8(message).unwrap_or("<invalid utf8>");
    let mut line = String::new();
    let _ = write!(line, "{}({}) {}", task_obj.name, task.handle().0, text);
    crate::arch::write_line(&line);
}

pub fn log_debug(task: &Object, val: i32) {
    let task_obj = task.as_task().expect("log_debug called with a non-task object");
    let mut line = String::new();
    let _ = write!(line, "{}({}) {}", task_obj.name, task.handle().0, val);
    crate::arch::write_line(&line);
}

/// Logs a syscall that returned anything other than `Status::Success`,
/// matching the "log on failure" half of the dispatch contract.
pub fn log_syscall_failure(task: &Object, sysnum: Sysnum, status: Status) {
    let task_obj = task
        .as_task()
        .expect("log_syscall_failure called with a non-task object");
    let mut line = String::new();
    let _ = write!(
        line,
        "{}({}): {}() -> {}",
        task_obj.name,
        task.handle().0,
        sysnum.name(),
        status
    );
    crate::arch::write_line(&line);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Domain;
    use crate::object::Payload;
    use crate::space::SpaceObject;
    use crate::task::TaskObject;
    use abi::{Capability, TaskFlags};
    use alloc::sync::Arc;

    fn new_task(name: &str) -> Arc<Object> {
        let domain = Object::new(Payload::Domain(Domain::new()));
        let space = Object::new(Payload::Space(SpaceObject::new()));
        Object::new(Payload::Task(TaskObject::new(
            name,
            domain,
            space,
            Capability::all(),
            TaskFlags::USER,
        )))
    }

    #[test]
    fn log_message_includes_task_name_and_handle() {
        let task = new_task("drv.uart");
        log_message(&task, b"hello");
        let lines = crate::arch::drain_log();
        let last = lines.last().expect("a line was written");
        assert!(last.contains("drv.uart"));
        assert!(last.contains(&task.handle().0.to_string()));
        assert!(last.contains("hello"));
    }

    #[test]
    fn log_syscall_failure_includes_status_and_sysnum_name() {
        let task = new_task("drv.net");
        log_syscall_failure(&task, Sysnum::Map, Status::BadHandle);
        let lines = crate::arch::drain_log();
        let last = lines.last().expect("a line was written");
        assert!(last.contains("map"));
        assert!(last.contains("BAD_HANDLE"));
    }
}
