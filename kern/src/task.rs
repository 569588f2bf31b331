//! Tasks: the unit of execution, and the current-task context the rest of
//! the kernel consults while servicing a syscall.

use alloc::string::String;
use alloc::sync::Arc;

use abi::{Capability, TaskFlags};
use spin::Mutex;

use crate::object::Object;
use crate::sched::SchedState;

pub struct TaskObject {
    pub name: String,
    /// The domain this task's handles are resolved against.
    pub domain: Arc<Object>,
    /// The address space this task runs in.
    pub space: Arc<Object>,
    pub caps: Mutex<Capability>,
    pub flags: TaskFlags,
    pub sched: Mutex<SchedState>,
}

impl TaskObject {
    pub fn new(
        name: &str,
        domain: Arc<Object>,
        space: Arc<Object>,
        caps: Capability,
        flags: TaskFlags,
    ) -> Self {
        Self {
            name: String::from(name),
            domain,
            space,
            caps: Mutex::new(caps),
            flags,
            sched: Mutex::new(SchedState::Stopped),
        }
    }
}

#[cfg(test)]
std::thread_local! {
    static CURRENT_TASK: core::cell::RefCell<Option<Arc<Object>>> =
        core::cell::RefCell::new(None);
}

#[cfg(not(test))]
static CURRENT_TASK: Mutex<Option<Arc<Object>>> = Mutex::new(None);

/// Returns the task the dispatcher is currently servicing a syscall for.
///
/// Panics if called outside of a syscall context (there is always supposed
/// to be a current task while `dispatch` is on the stack).
pub fn current_task() -> Arc<Object> {
    try_current_task().expect("no current task set")
}

#[cfg(test)]
pub fn try_current_task() -> Option<Arc<Object>> {
    CURRENT_TASK.with(|cell| cell.borrow().clone())
}

#[cfg(not(test))]
pub fn try_current_task() -> Option<Arc<Object>> {
    CURRENT_TASK.lock().clone()
}

/// Returns the current task's own domain.
pub fn current_domain() -> Arc<Object> {
    Arc::clone(&current_task().as_task().expect("current task is a Task object").domain)
}

/// Returns the current task's own address space.
pub fn current_space() -> Arc<Object> {
    Arc::clone(&current_task().as_task().expect("current task is a Task object").space)
}

/// Installs `task` as the current task for the duration of `body`, then
/// restores whatever was current before. Intended for tests and for any
/// host harness driving `kern::dispatch` directly, since real hardware
/// tracks the current task through its own core-local mechanism instead.
#[cfg(test)]
pub fn with_current_task_for_test<R>(task: Arc<Object>, body: impl FnOnce() -> R) -> R {
    let previous = CURRENT_TASK.with(|cell| cell.replace(Some(task)));
    let result = body();
    CURRENT_TASK.with(|cell| *cell.borrow_mut() = previous);
    result
}

/// Marks the start of a syscall for the current task. A hook for
/// accounting or diagnostics; the dispatcher brackets every handler
/// invocation with this and `task_end_syscall`.
pub fn task_begin_syscall() {}

/// Marks the end of a syscall for the current task.
pub fn task_end_syscall() {}
