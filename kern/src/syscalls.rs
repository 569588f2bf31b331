//! Syscall handlers.
//!
//! Each function here implements exactly one syscall, against the domain
//! and address space of whichever task `task::current_task` names. None of
//! them do their own cleanup on the error paths: a resolved `Arc<Object>`
//! is a local variable, and an early `?` return drops it via ordinary scope
//! exit, which is the only "release on every exit path" these need.

use alloc::sync::Arc;

use abi::{
    Capability, CreateArgs, CreateMemArgs, CreateSpaceArgs, CreateTaskArgs, Handle, Kind,
    MemObjFlags, Status, SyscallArgs, TaskFlags,
};

use crate::domain::Domain;
use crate::err::KResult;
use crate::memobj::MemoryObject;
use crate::object::{Object, Payload};
use crate::space::SpaceObject;
use crate::{hostlog, pmm, sched, task};

fn resolve(handle: Handle, kind: Kind) -> KResult<Arc<Object>> {
    let domain_obj = task::current_domain();
    domain_obj
        .as_domain()
        .expect("a task's domain field always names a Domain object")
        .lookup(handle, kind)
        .ok_or(Status::BadHandle)
}

fn resolve_space(handle: Handle) -> KResult<Arc<Object>> {
    if handle == Handle::SELF_SPACE {
        Ok(task::current_space())
    } else {
        resolve(handle, Kind::Space)
    }
}

fn resolve_task(handle: Handle) -> KResult<Arc<Object>> {
    if handle == Handle::SELF_TASK {
        Ok(task::current_task())
    } else {
        resolve(handle, Kind::Task)
    }
}

pub fn sys_log(args: &mut SyscallArgs) -> KResult<()> {
    let args = match args {
        SyscallArgs::Log(a) => a,
        _ => return Err(Status::BadArguments),
    };
    hostlog::log_message(&task::current_task(), args.message);
    Ok(())
}

pub fn sys_debug(args: &mut SyscallArgs) -> KResult<()> {
    let args = match args {
        SyscallArgs::Debug(a) => a,
        _ => return Err(Status::BadArguments),
    };
    hostlog::log_debug(&task::current_task(), args.val);
    Ok(())
}

pub fn sys_map(args: &mut SyscallArgs) -> KResult<()> {
    let args = match args {
        SyscallArgs::Map(a) => a,
        _ => return Err(Status::BadArguments),
    };

    let space_obj = resolve_space(args.space)?;
    let mem_obj = resolve(args.mem_obj, Kind::Memory)?;

    let base = space_obj
        .as_space()
        .expect("resolve_space always names a Space object")
        .map(mem_obj, args.offset, args.size, args.vaddr)?;

    args.vaddr = base;
    Ok(())
}

pub fn sys_unmap(args: &mut SyscallArgs) -> KResult<()> {
    let args = match args {
        SyscallArgs::Unmap(a) => a,
        _ => return Err(Status::BadArguments),
    };

    let space_obj = resolve_space(args.space)?;
    space_obj
        .as_space()
        .expect("resolve_space always names a Space object")
        .unmap(args.vaddr, args.size);
    Ok(())
}

fn create_task(args: &mut CreateTaskArgs) -> KResult<()> {
    let current = task::current_task();
    let current_task = current.as_task().expect("current task is a Task object");

    let space_obj = resolve_space(args.space)?;
    let caps = args.caps & *current_task.caps.lock();
    let flags = args.flags | TaskFlags::USER;

    let domain_obj = Object::new(Payload::Domain(Domain::new()));
    let task_obj = crate::task::TaskObject::new(args.name, domain_obj, space_obj, caps, flags);
    let new_task = Object::new(Payload::Task(task_obj));

    current_task
        .domain
        .as_domain()
        .expect("a task's domain field always names a Domain object")
        .add(Arc::clone(&new_task));

    args.task_handle = new_task.handle();
    Ok(())
}

fn create_space(args: &mut CreateSpaceArgs) -> KResult<()> {
    let space = Object::new(Payload::Space(SpaceObject::new()));
    task::current_domain()
        .as_domain()
        .expect("a task's domain field always names a Domain object")
        .add(Arc::clone(&space));
    args.space_handle = space.handle();
    Ok(())
}

fn create_memory(args: &mut CreateMemArgs) -> KResult<()> {
    let current = task::current_task();
    let current_task = current.as_task().expect("current task is a Task object");

    let mem_obj = if args.flags.contains(MemObjFlags::PMM) {
        if !current_task.caps.lock().contains(Capability::PMM) {
            return Err(Status::BadCapability);
        }
        MemoryObject::borrowed(pmm::PhysRange {
            base: args.addr,
            size: args.size,
        })
    } else {
        MemoryObject::owning(pmm::alloc(args.size)?)
    };

    let obj = Object::new(Payload::Memory(mem_obj));
    current_task
        .domain
        .as_domain()
        .expect("a task's domain field always names a Domain object")
        .add(Arc::clone(&obj));
    args.mem_obj_handle = obj.handle();
    Ok(())
}

pub fn sys_create(args: &mut SyscallArgs) -> KResult<()> {
    let create_args = match args {
        SyscallArgs::Create(a) => a,
        _ => return Err(Status::BadArguments),
    };

    let has_task_cap = task::current_task()
        .as_task()
        .expect("current task is a Task object")
        .caps
        .lock()
        .contains(Capability::TASK);
    if !has_task_cap {
        return Err(Status::BadCapability);
    }

    match &mut **create_args {
        CreateArgs::Task(task_args) => create_task(task_args),
        CreateArgs::Space(space_args) => create_space(space_args),
        CreateArgs::Memory(mem_args) => create_memory(mem_args),
    }
}

pub fn sys_start(args: &mut SyscallArgs) -> KResult<()> {
    let args = match args {
        SyscallArgs::Start(a) => a,
        _ => return Err(Status::BadArguments),
    };

    let task_obj = resolve(args.task, Kind::Task)?;
    sched::start(
        &task_obj
            .as_task()
            .expect("resolve(.., Kind::Task) always names a Task object")
            .sched,
    );
    Ok(())
}

pub fn sys_exit(args: &mut SyscallArgs) -> KResult<()> {
    let args = match args {
        SyscallArgs::Exit(a) => a,
        _ => return Err(Status::BadArguments),
    };

    let task_obj = resolve_task(args.task)?;
    sched::stop(
        &task_obj
            .as_task()
            .expect("resolve_task always names a Task object")
            .sched,
        args.exit_value,
    );
    Ok(())
}

pub fn sys_drop(args: &mut SyscallArgs) -> KResult<()> {
    let args = match args {
        SyscallArgs::Drop(a) => a,
        _ => return Err(Status::BadArguments),
    };

    let task_obj = resolve_task(args.task)?;
    let task_obj = task_obj
        .as_task()
        .expect("resolve_task always names a Task object");
    let mut caps = task_obj.caps.lock();
    if !caps.contains(args.cap) {
        return Err(Status::BadCapability);
    }
    *caps &= !args.cap;
    Ok(())
}

pub fn sys_close(args: &mut SyscallArgs) -> KResult<()> {
    let args = match args {
        SyscallArgs::Close(a) => a,
        _ => return Err(Status::BadArguments),
    };

    task::current_domain()
        .as_domain()
        .expect("a task's domain field always names a Domain object")
        .remove(args.handle);
    Ok(())
}

pub fn sys_ipc(args: &mut SyscallArgs) -> KResult<()> {
    match args {
        SyscallArgs::Ipc(_) => Err(Status::NotImplemented),
        _ => Err(Status::BadArguments),
    }
}

pub fn sys_irq(args: &mut SyscallArgs) -> KResult<()> {
    match args {
        SyscallArgs::Irq(_) => {
            let has_irq_cap = task::current_task()
                .as_task()
                .expect("current task is a Task object")
                .caps
                .lock()
                .contains(Capability::IRQ);
            if !has_irq_cap {
                return Err(Status::BadCapability);
            }
            Err(Status::NotImplemented)
        }
        _ => Err(Status::BadArguments),
    }
}
