//! The syscall dispatcher: validates the syscall number, invokes the bound
//! handler, logs on failure, and returns the uniform status code.

use core::convert::TryFrom;

use abi::{Status, Sysnum, SyscallArgs};

use crate::err::KResult;
use crate::{hostlog, syscalls, task};

type HandlerFn = fn(&mut SyscallArgs) -> KResult<()>;

/// Binds a syscall number to its handler. A dense `match` rather than a
/// lookup table, since every number in `0..SYSCALL_COUNT` is valid -- there
/// are no reserved gaps to leave `None`, unlike a sparse syscall ABI.
fn handler_for(sysnum: Sysnum) -> HandlerFn {
    match sysnum {
        Sysnum::Log => syscalls::sys_log,
        Sysnum::Debug => syscalls::sys_debug,
        Sysnum::Map => syscalls::sys_map,
        Sysnum::Unmap => syscalls::sys_unmap,
        Sysnum::Create => syscalls::sys_create,
        Sysnum::Start => syscalls::sys_start,
        Sysnum::Exit => syscalls::sys_exit,
        Sysnum::Ipc => syscalls::sys_ipc,
        Sysnum::Irq => syscalls::sys_irq,
        Sysnum::Drop => syscalls::sys_drop,
        Sysnum::Close => syscalls::sys_close,
    }
}

/// Dispatches one syscall.
///
/// `raw_sysnum` is whatever number the caller actually passed; `args` is
/// the typed argument blob the caller built for the syscall they *meant* to
/// make. If the two disagree -- an out-of-range number, or a mismatch
/// between the number and the shape of `args` -- this returns
/// `Status::BadSyscall` without invoking any handler.
pub fn dispatch(raw_sysnum: u32, args: &mut SyscallArgs) -> Status {
    let sysnum = match Sysnum::try_from(raw_sysnum) {
        Ok(sysnum) if sysnum as u32 == args.sysnum() as u32 => sysnum,
        _ => return Status::BadSyscall,
    };

    task::task_begin_syscall();

    let handler = handler_for(sysnum);
    let status = match handler(args) {
        Ok(()) => Status::Success,
        Err(status) => status,
    };

    if !status.is_success() {
        hostlog::log_syscall_failure(&task::current_task(), sysnum, status);
    }

    task::task_end_syscall();
    status
}

#[cfg(test)]
mod tests {
    use super::*;
    use abi::{DebugArgs, LogArgs};

    #[test]
    fn out_of_range_syscall_number_is_bad_syscall() {
        let mut args = DebugArgs { val: 1 };
        let mut wrapped = SyscallArgs::Debug(&mut args);
        assert_eq!(dispatch(abi::SYSCALL_COUNT, &mut wrapped), Status::BadSyscall);
    }

    #[test]
    fn mismatched_sysnum_and_args_shape_is_bad_syscall() {
        let mut args = LogArgs { message: b"hi" };
        let mut wrapped = SyscallArgs::Log(&mut args);
        // Sysnum::Debug's number, but Log-shaped args.
        assert_eq!(
            dispatch(Sysnum::Debug as u32, &mut wrapped),
            Status::BadSyscall
        );
    }
}
