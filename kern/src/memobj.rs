//! Memory objects: a named, shareable range of physical memory that an
//! address space can map in.

use crate::pmm::{self, PhysRange};

/// Whether a memory object's physical range should be returned to the
/// allocator when the object is destroyed.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Ownership {
    /// Allocated by the kernel on the object's behalf; freed on drop.
    Owning,
    /// Wraps physical memory the object didn't allocate (e.g. a
    /// capability-gated MMIO window); left alone on drop.
    Borrowed,
}

pub struct MemoryObject {
    pub range: PhysRange,
    pub ownership: Ownership,
}

impl MemoryObject {
    pub fn owning(range: PhysRange) -> Self {
        Self {
            range,
            ownership: Ownership::Owning,
        }
    }

    pub fn borrowed(range: PhysRange) -> Self {
        Self {
            range,
            ownership: Ownership::Borrowed,
        }
    }
}

impl Drop for MemoryObject {
    fn drop(&mut self) {
        if self.ownership == Ownership::Owning {
            pmm::free(self.range);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropping_an_owning_object_returns_its_range_to_the_arena() {
        let range = pmm::alloc(4096).unwrap();
        let obj = MemoryObject::owning(range);
        drop(obj);
        let reused = pmm::alloc(4096).unwrap();
        assert_eq!(range, reused);
    }

    #[test]
    fn dropping_a_borrowed_object_does_not_touch_the_arena() {
        let range = PhysRange {
            base: 0xE000_0000,
            size: 4096,
        };
        let obj = MemoryObject::borrowed(range);
        drop(obj);
        // No assertion beyond "this didn't panic or corrupt the global
        // arena's bitmap" -- a borrowed range was never the arena's to
        // begin with.
    }
}
