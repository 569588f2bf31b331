//! Kernel startup: builds the root task and its capabilities before handing
//! control to it.
//!
//! There is no app image or region table to parse here -- the root task is
//! simply the one task the kernel creates with every capability, and every
//! other task descends from it through `sys_create`. The bootstrap routine
//! below is also what the syscall test suite uses to get a current task
//! without going through real hardware bring-up.

use alloc::sync::Arc;

use abi::{Capability, TaskFlags};

use crate::domain::Domain;
use crate::object::{Object, Payload};
use crate::space::SpaceObject;
use crate::task::TaskObject;

/// Builds a fresh root task: its own domain, its own (empty) address space,
/// every capability bit set, and nothing in its domain yet. Installing it as
/// the current task and driving `dispatch` is how every other object in the
/// system comes to exist.
pub fn bootstrap_root_task(name: &str) -> Arc<Object> {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_root_task_has_every_capability() {
        let root = bootstrap_root_task("root");
        let task = root.as_task().unwrap();
        assert_eq!(*task.caps.lock(), Capability::all());
    }

    #[test]
    fn bootstrap_root_task_domain_starts_empty() {
        let root = bootstrap_root_task("root");
        let domain = root.as_task().unwrap().domain.as_domain().unwrap();
        assert_eq!(domain.len(), 0);
    }
}
