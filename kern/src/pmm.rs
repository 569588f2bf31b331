//! Physical memory allocator.
//!
//! A fixed-size arena with a bitmap free list -- not how a production
//! allocator would track pages, but the simplest implementation that can
//! actually exhaust and report `Status::OutOfMemory`, which is what the rest
//! of the kernel needs from this collaborator.

use spin::Mutex;

use abi::Status;

use crate::err::KResult;

pub const PAGE_SIZE: u64 = 4096;
const ARENA_SIZE: u64 = 16 * 1024 * 1024;
const PAGE_COUNT: usize = (ARENA_SIZE / PAGE_SIZE) as usize;

/// A contiguous, page-aligned physical range.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PhysRange {
    pub base: u64,
    pub size: u64,
}

fn page_count_for(size: u64) -> usize {
    ((size + PAGE_SIZE - 1) / PAGE_SIZE) as usize
}

/// A single arena's free-page bitmap. The kernel keeps one of these as a
/// process-wide global; tests make their own so they don't fight over
/// arena state when run concurrently.
pub struct Allocator {
    free: Mutex<[bool; PAGE_COUNT]>,
}

impl Allocator {
    pub const fn new() -> Self {
        Self {
            free: Mutex::new([true; PAGE_COUNT]),
        }
    }

    pub fn alloc(&self, size: u64) -> KResult<PhysRange> {
        let pages = page_count_for(size).max(1);
        let mut free = self.free.lock();

        let mut run_start = None;
        let mut run_len = 0;
        for i in 0..PAGE_COUNT {
            if free[i] {
                if run_start.is_none() {
                    run_start = Some(i);
                }
                run_len += 1;
                if run_len == pages {
                    let start = run_start.unwrap();
                    for slot in free.iter_mut().take(start + pages).skip(start) {
                        *slot = false;
                    }
                    return Ok(PhysRange {
                        base: start as u64 * PAGE_SIZE,
                        size: pages as u64 * PAGE_SIZE,
                    });
                }
            } else {
                run_start = None;
                run_len = 0;
            }
        }
        Err(Status::OutOfMemory)
    }

    pub fn free(&self, range: PhysRange) {
        let start = (range.base / PAGE_SIZE) as usize;
        let pages = page_count_for(range.size);
        let mut free = self.free.lock();
        for slot in free.iter_mut().take(start + pages).skip(start) {
            *slot = true;
        }
    }
}

static GLOBAL: Allocator = Allocator::new();

pub fn alloc(size: u64) -> KResult<PhysRange> {
    GLOBAL.alloc(size)
}

pub fn free(range: PhysRange) {
    GLOBAL.free(range)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_rounds_up_to_whole_pages() {
        let arena = Allocator::new();
        let range = arena.alloc(1).unwrap();
        assert_eq!(range.size, PAGE_SIZE);
    }

    #[test]
    fn freed_pages_can_be_reallocated() {
        let arena = Allocator::new();
        let a = arena.alloc(PAGE_SIZE * 4).unwrap();
        arena.free(a);
        let b = arena.alloc(PAGE_SIZE * 4).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn exhausting_the_arena_reports_out_of_memory() {
        let arena = Allocator::new();
        let mut held = alloc::vec::Vec::new();
        loop {
            match arena.alloc(PAGE_SIZE) {
                Ok(range) => held.push(range),
                Err(Status::OutOfMemory) => break,
                Err(other) => panic!("unexpected status {:?}", other),
            }
        }
        assert_eq!(held.len(), PAGE_COUNT);
    }
}
