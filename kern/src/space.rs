//! Address spaces: a task's view of which memory objects are mapped where.
//!
//! Backed by a sorted list of non-overlapping mappings -- closer to a toy
//! VMA list than a production red-black-tree manager, but enough to detect
//! overlaps, pick a free base, and release a memory object's reference on
//! unmap.

use alloc::sync::Arc;
use alloc::vec::Vec;

use abi::Status;
use spin::Mutex;

use crate::err::KResult;
use crate::object::Object;

pub const PAGE_SIZE: u64 = 4096;
const USER_BASE: u64 = 0x1000_0000;
const USER_LIMIT: u64 = 0xF000_0000;

struct Mapping {
    vaddr: u64,
    size: u64,
    mem_obj: Arc<Object>,
}

pub struct SpaceObject {
    mappings: Mutex<Vec<Mapping>>,
}

impl SpaceObject {
    pub fn new() -> Self {
        Self {
            mappings: Mutex::new(Vec::new()),
        }
    }

    /// Maps the `[offset, offset+size)` slice of `mem_obj` at `vaddr` (or,
    /// if zero, at a base this space picks), returning the base actually
    /// used.
    pub fn map(
        &self,
        mem_obj: Arc<Object>,
        offset: u64,
        size: u64,
        vaddr: u64,
    ) -> KResult<u64> {
        if size == 0 || size % PAGE_SIZE != 0 || offset % PAGE_SIZE != 0 {
            return Err(Status::AlignmentFault);
        }
        if vaddr != 0 && vaddr % PAGE_SIZE != 0 {
            return Err(Status::AlignmentFault);
        }
        let obj_size = mem_obj
            .as_memory()
            .map(|m| m.range.size)
            .ok_or(Status::BadHandle)?;
        if offset.checked_add(size).map_or(true, |end| end > obj_size) {
            return Err(Status::BadArguments);
        }

        let mut mappings = self.mappings.lock();
        let base = if vaddr != 0 {
            vaddr
        } else {
            find_free_range(&mappings, size)?
        };

        if mappings
            .iter()
            .any(|m| ranges_overlap(base, size, m.vaddr, m.size))
        {
            return Err(Status::RangeConflict);
        }

        let pos = mappings.partition_point(|m| m.vaddr < base);
        mappings.insert(
            pos,
            Mapping {
                vaddr: base,
                size,
                mem_obj,
            },
        );
        Ok(base)
    }

    /// Removes every mapping overlapping `[vaddr, vaddr+size)`, dropping
    /// each one's reference to its underlying memory object. A range that
    /// overlaps no mapping at all is not an error.
    pub fn unmap(&self, vaddr: u64, size: u64) {
        let mut mappings = self.mappings.lock();
        mappings.retain(|m| !ranges_overlap(vaddr, size, m.vaddr, m.size));
    }

    #[cfg(test)]
    fn mapping_count(&self) -> usize {
        self.mappings.lock().len()
    }
}

impl Default for SpaceObject {
    fn default() -> Self {
        Self::new()
    }
}

fn ranges_overlap(a_base: u64, a_size: u64, b_base: u64, b_size: u64) -> bool {
    a_base < b_base + b_size && b_base < a_base + a_size
}

fn find_free_range(mappings: &[Mapping], size: u64) -> KResult<u64> {
    let mut candidate = USER_BASE;
    for m in mappings {
        if candidate + size <= m.vaddr {
            return Ok(candidate);
        }
        candidate = candidate.max(m.vaddr + m.size);
    }
    if candidate + size <= USER_LIMIT {
        Ok(candidate)
    } else {
        Err(Status::OutOfMemory)
    }
}
