//! Minimal scheduling state machine.
//!
//! This deliberately doesn't model preemption, priorities, or blocking --
//! just enough to make `sys_start`/`sys_exit` observably correct. A task
//! starts `Stopped`, becomes `Runnable` when started, and becomes `Exited`
//! when it exits; there is no path back to `Runnable` after `Exited`.

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SchedState {
    Stopped,
    Runnable,
    Exited { exit_value: u32 },
}

pub fn start(state: &spin::Mutex<SchedState>) {
    *state.lock() = SchedState::Runnable;
}

pub fn stop(state: &spin::Mutex<SchedState>, exit_value: u32) {
    *state.lock() = SchedState::Exited { exit_value };
}
