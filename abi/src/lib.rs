//! Wire-level ABI shared between the kernel's object/handle subsystem and
//! whatever sits on the other side of the syscall boundary.
//!
//! This crate defines the things that cross that boundary: handles,
//! capability bits, the single flat status enumeration, and the per-syscall
//! argument layouts. None of it knows how the kernel resolves a handle into
//! an object, or what a domain is made of — that's `kern`'s job.

#![cfg_attr(not(test), no_std)]

use serde::Serialize;
use zerocopy::{AsBytes, FromBytes, Unaligned};

/// Opaque, non-forgeable name for a kernel object within a domain.
///
/// Ordinary handles are issued by a process-wide counter starting above the
/// reserved sentinels, so a `Handle` constructed from an arbitrary `u32` can
/// only ever name an object if the kernel itself handed that value out.
#[derive(
    Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, FromBytes, AsBytes, Unaligned,
)]
#[repr(transparent)]
pub struct Handle(pub u32);

impl Handle {
    /// Refers to the calling task's own address space in a `map`/`unmap`
    /// call, without needing to know its handle.
    pub const SELF_SPACE: Self = Self(0xFFFF_FFFE);
    /// Refers to the calling task itself in `exit`/`drop`, without needing to
    /// know its own handle.
    pub const SELF_TASK: Self = Self(0xFFFF_FFFF);

    /// Lowest value a freshly allocated handle may take. Below this are the
    /// reserved sentinels above; nothing the allocator hands out may collide
    /// with them.
    pub const FIRST_ALLOCATED: u32 = 1;

    pub fn is_sentinel(self) -> bool {
        self == Self::SELF_SPACE || self == Self::SELF_TASK
    }
}

/// Discriminates the four kinds of kernel object. Immutable after creation;
/// a typed lookup that asks for the wrong kind fails rather than reinterpret
/// the object.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum Kind {
    Memory,
    Domain,
    Space,
    Task,
}

bitflags::bitflags! {
    /// Single bits in a task's capability bitmask. Monotonically subtractive:
    /// a task may only ever lose bits over its lifetime (see `sys_drop`).
    #[derive(FromBytes)]
    #[repr(transparent)]
    pub struct Capability: u32 {
        /// May create new tasks, address spaces, and memory objects.
        const TASK = 1 << 0;
        /// May wrap an arbitrary physical range in a non-owning memory
        /// object instead of going through the physical allocator.
        const PMM = 1 << 1;
        /// May register interrupt handlers (`sys_irq`).
        const IRQ = 1 << 2;

        const RESERVED = !((1 << 3) - 1);
    }
}

bitflags::bitflags! {
    /// Flags attached to a task at creation time.
    #[derive(FromBytes)]
    #[repr(transparent)]
    pub struct TaskFlags: u32 {
        /// Set on every task created through `sys_create`; distinguishes
        /// ordinary tasks from the (hypothetical) kernel-internal ones.
        const USER = 1 << 0;

        const RESERVED = !1;
    }
}

bitflags::bitflags! {
    /// Flags attached to a memory-object creation request.
    #[derive(FromBytes)]
    #[repr(transparent)]
    pub struct MemObjFlags: u32 {
        /// Wrap an already-existing physical range (named by `addr`/`size`)
        /// instead of allocating fresh memory. Gated on `Capability::PMM`.
        const PMM = 1 << 0;

        const RESERVED = !1;
    }
}

/// The single flat status enumeration returned by every syscall.
///
/// `Success` is the only non-error member; everything else is a taxonomy
/// entry from spec §7 (usage errors, resource errors, or the stable
/// `NotImplemented` contract for reserved syscalls).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum Status {
    Success,
    /// The syscall number was out of range or had no handler bound.
    BadSyscall,
    /// A handle argument did not resolve, or resolved to the wrong kind.
    BadHandle,
    /// The caller lacked a capability the operation requires.
    BadCapability,
    /// Arguments were malformed in a way no other status describes.
    BadArguments,
    /// The syscall is reserved but not yet implemented.
    NotImplemented,
    /// The physical allocator could not satisfy a request.
    OutOfMemory,
    /// A `map` request's virtual range overlaps an existing mapping.
    RangeConflict,
    /// A `map` request's address or size was misaligned.
    AlignmentFault,
}

impl Status {
    pub fn is_success(self) -> bool {
        self == Status::Success
    }

    /// Stable, parseable name used in structured log lines (spec §6/§7).
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Success => "SUCCESS",
            Status::BadSyscall => "BAD_SYSCALL",
            Status::BadHandle => "BAD_HANDLE",
            Status::BadCapability => "BAD_CAPABILITY",
            Status::BadArguments => "BAD_ARGUMENTS",
            Status::NotImplemented => "NOT_IMPLEMENTED",
            Status::OutOfMemory => "OUT_OF_MEMORY",
            Status::RangeConflict => "RANGE_CONFLICT",
            Status::AlignmentFault => "ALIGNMENT_FAULT",
        }
    }
}

impl core::fmt::Display for Status {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dense enumeration of syscall numbers, beginning at zero.
///
/// We use an explicit `TryFrom` impl rather than pulling in `num-traits` for
/// one conversion, the same call the teacher's own `abi::Sysnum` makes.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[repr(u32)]
pub enum Sysnum {
    Log = 0,
    Debug = 1,
    Map = 2,
    Unmap = 3,
    Create = 4,
    Start = 5,
    Exit = 6,
    Ipc = 7,
    Irq = 8,
    Drop = 9,
    Close = 10,
}

/// Bounds the handler table; `dispatch` rejects any syscall number at or
/// above this as `BadSyscall`.
pub const SYSCALL_COUNT: u32 = 11;

impl Sysnum {
    pub fn name(self) -> &'static str {
        match self {
            Sysnum::Log => "log",
            Sysnum::Debug => "debug",
            Sysnum::Map => "map",
            Sysnum::Unmap => "unmap",
            Sysnum::Create => "create",
            Sysnum::Start => "start",
            Sysnum::Exit => "exit",
            Sysnum::Ipc => "ipc",
            Sysnum::Irq => "irq",
            Sysnum::Drop => "drop",
            Sysnum::Close => "close",
        }
    }
}

impl core::convert::TryFrom<u32> for Sysnum {
    type Error = ();

    fn try_from(x: u32) -> Result<Self, Self::Error> {
        match x {
            0 => Ok(Self::Log),
            1 => Ok(Self::Debug),
            2 => Ok(Self::Map),
            3 => Ok(Self::Unmap),
            4 => Ok(Self::Create),
            5 => Ok(Self::Start),
            6 => Ok(Self::Exit),
            7 => Ok(Self::Ipc),
            8 => Ok(Self::Irq),
            9 => Ok(Self::Drop),
            10 => Ok(Self::Close),
            _ => Err(()),
        }
    }
}

/// Which kind of object `sys_create` should make. Distinct from `Kind`
/// because not every `Kind` is createable this way (there is no
/// `CreateKind::Domain`: a task's domain is implicit, not user-created).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[repr(u32)]
pub enum CreateKind {
    Task = 0,
    Space = 1,
    Memory = 2,
}

impl core::convert::TryFrom<u32> for CreateKind {
    type Error = ();

    fn try_from(x: u32) -> Result<Self, Self::Error> {
        match x {
            0 => Ok(Self::Task),
            1 => Ok(Self::Space),
            2 => Ok(Self::Memory),
            _ => Err(()),
        }
    }
}

/// Arguments to `sys_log`. The message bytes themselves are not `Sized` and
/// so travel alongside this struct rather than inside it.
#[derive(Copy, Clone, Debug)]
pub struct LogArgs<'a> {
    pub message: &'a [u8],
}

/// Arguments to `sys_debug`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, FromBytes, AsBytes, Unaligned)]
#[repr(C)]
pub struct DebugArgs {
    pub val: i32,
}

/// Arguments to `sys_map`. `vaddr` is in/out: on entry it is the caller's
/// requested base (zero meaning "pick one for me"); on success it is
/// overwritten with the base the space actually chose.
#[derive(Copy, Clone, Debug, Eq, PartialEq, FromBytes, AsBytes, Unaligned)]
#[repr(C)]
pub struct MapArgs {
    pub space: Handle,
    pub mem_obj: Handle,
    pub offset: u64,
    pub size: u64,
    pub vaddr: u64,
}

/// Arguments to `sys_unmap`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, FromBytes, AsBytes, Unaligned)]
#[repr(C)]
pub struct UnmapArgs {
    pub space: Handle,
    pub vaddr: u64,
    pub size: u64,
}

/// Arguments to the `CreateKind::Task` variant of `sys_create`. `task_handle`
/// is the out field, written back only on `Status::Success`.
#[derive(Copy, Clone, Debug)]
pub struct CreateTaskArgs<'a> {
    pub name: &'a str,
    pub space: Handle,
    pub caps: Capability,
    pub flags: TaskFlags,
    pub task_handle: Handle,
}

/// Arguments to the `CreateKind::Space` variant of `sys_create`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, FromBytes, AsBytes, Unaligned)]
#[repr(C)]
pub struct CreateSpaceArgs {
    pub flags: u32,
    pub space_handle: Handle,
}

/// Arguments to the `CreateKind::Memory` variant of `sys_create`. Only
/// `FromBytes`, not `AsBytes`/`Unaligned`: `flags` is a `MemObjFlags`
/// bitflags value, and bitflags only derives `FromBytes` (see its
/// definition above), the same restraint the teacher's `abi::TaskDesc` and
/// `abi::RegionDesc` show around their own embedded bitflags fields.
#[derive(Copy, Clone, Debug, Eq, PartialEq, FromBytes)]
#[repr(C)]
pub struct CreateMemArgs {
    pub flags: MemObjFlags,
    pub addr: u64,
    pub size: u64,
    pub mem_obj_handle: Handle,
}

/// Tagged union of the three `sys_create` payloads. `abi::CreateKind` (read
/// from the raw syscall) picks the variant; a mismatch between the two is a
/// `BadArguments` at the dispatch layer.
#[derive(Clone, Debug)]
pub enum CreateArgs<'a> {
    Task(CreateTaskArgs<'a>),
    Space(CreateSpaceArgs),
    Memory(CreateMemArgs),
}

impl<'a> CreateArgs<'a> {
    pub fn kind(&self) -> CreateKind {
        match self {
            CreateArgs::Task(_) => CreateKind::Task,
            CreateArgs::Space(_) => CreateKind::Space,
            CreateArgs::Memory(_) => CreateKind::Memory,
        }
    }
}

/// Arguments to `sys_start`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, FromBytes, AsBytes, Unaligned)]
#[repr(C)]
pub struct StartArgs {
    pub task: Handle,
    pub ip: u32,
    pub sp: u32,
    pub args: [u32; 4],
}

/// Arguments to `sys_exit`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, FromBytes, AsBytes, Unaligned)]
#[repr(C)]
pub struct ExitArgs {
    pub task: Handle,
    pub exit_value: u32,
}

/// Arguments to `sys_drop`. Only `FromBytes`: `cap` is a `Capability`
/// bitflags value, which only derives `FromBytes` (see above).
#[derive(Copy, Clone, Debug, Eq, PartialEq, FromBytes)]
#[repr(C)]
pub struct DropArgs {
    pub task: Handle,
    pub cap: Capability,
}

/// Arguments to `sys_close`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, FromBytes, AsBytes, Unaligned)]
#[repr(C)]
pub struct CloseArgs {
    pub handle: Handle,
}

/// Arguments to the reserved `sys_ipc`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, FromBytes, AsBytes, Unaligned)]
#[repr(C)]
pub struct IpcArgs {
    pub reserved: u32,
}

/// Arguments to the reserved `sys_irq`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, FromBytes, AsBytes, Unaligned)]
#[repr(C)]
pub struct IrqArgs {
    pub reserved: u32,
}

/// The "argument blob" of spec §4.6.1/§6: a reference to exactly one
/// syscall's argument struct, tagged by which one it is.
pub enum SyscallArgs<'a> {
    Log(&'a mut LogArgs<'a>),
    Debug(&'a mut DebugArgs),
    Map(&'a mut MapArgs),
    Unmap(&'a mut UnmapArgs),
    Create(&'a mut CreateArgs<'a>),
    Start(&'a mut StartArgs),
    Exit(&'a mut ExitArgs),
    Ipc(&'a mut IpcArgs),
    Irq(&'a mut IrqArgs),
    Drop(&'a mut DropArgs),
    Close(&'a mut CloseArgs),
}

impl<'a> SyscallArgs<'a> {
    pub fn sysnum(&self) -> Sysnum {
        match self {
            SyscallArgs::Log(_) => Sysnum::Log,
            SyscallArgs::Debug(_) => Sysnum::Debug,
            SyscallArgs::Map(_) => Sysnum::Map,
            SyscallArgs::Unmap(_) => Sysnum::Unmap,
            SyscallArgs::Create(_) => Sysnum::Create,
            SyscallArgs::Start(_) => Sysnum::Start,
            SyscallArgs::Exit(_) => Sysnum::Exit,
            SyscallArgs::Ipc(_) => Sysnum::Ipc,
            SyscallArgs::Irq(_) => Sysnum::Irq,
            SyscallArgs::Drop(_) => Sysnum::Drop,
            SyscallArgs::Close(_) => Sysnum::Close,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::TryFrom;

    #[test]
    fn sentinels_do_not_collide_with_allocated_range() {
        assert!(Handle::SELF_SPACE.0 >= Handle::FIRST_ALLOCATED);
        assert!(Handle::SELF_TASK.0 >= Handle::FIRST_ALLOCATED);
        assert_ne!(Handle::SELF_SPACE, Handle::SELF_TASK);
        assert!(Handle::SELF_SPACE.is_sentinel());
        assert!(Handle::SELF_TASK.is_sentinel());
        assert!(!Handle(Handle::FIRST_ALLOCATED).is_sentinel());
    }

    #[test]
    fn sysnum_round_trips_through_try_from() {
        for raw in 0..SYSCALL_COUNT {
            let sysnum = Sysnum::try_from(raw).expect("in-range syscall number");
            assert_eq!(sysnum as u32, raw);
        }
        assert!(Sysnum::try_from(SYSCALL_COUNT).is_err());
    }

    #[test]
    fn status_display_is_stable_and_parseable() {
        assert_eq!(Status::BadHandle.to_string(), "BAD_HANDLE");
        assert_eq!(Status::Success.as_str(), "SUCCESS");
    }

    #[test]
    fn capability_is_subtractive_by_construction() {
        let caps = Capability::TASK | Capability::PMM;
        let dropped = caps & !Capability::PMM;
        assert!(dropped.contains(Capability::TASK));
        assert!(!dropped.contains(Capability::PMM));
    }
}
