//! The kernel object base: a tagged, reference-counted payload plus the
//! process-wide registry that lets a privileged caller resolve a bare
//! `Handle` without going through any particular domain.
//!
//! Every object lives behind an `Arc`. `Arc::clone` is `ref()`, dropping the
//! last `Arc` runs the payload's destructor, and `Arc::strong_count` is the
//! refcount -- there is no separate bookkeeping to get wrong.

use alloc::collections::BTreeMap;
use alloc::sync::{Arc, Weak};
use core::sync::atomic::{AtomicU32, Ordering};

use abi::{Handle, Kind};
use spin::Mutex;

use crate::domain::Domain;
use crate::memobj::MemoryObject;
use crate::space::SpaceObject;
use crate::task::TaskObject;

/// Per-kind payload carried by an `Object`. Matching on this, rather than
/// casting through a C-style header, is what makes a typed lookup a
/// compile-time guarantee instead of a runtime hope.
pub enum Payload {
    Memory(MemoryObject),
    Domain(Domain),
    Space(SpaceObject),
    Task(TaskObject),
}

/// A kernel object: a stable handle plus its kind-specific state.
pub struct Object {
    handle: Handle,
    payload: Payload,
}

impl Object {
    /// Allocates a fresh handle, wraps `payload` in an `Object`, and
    /// registers it in the global table so `global_lookup` can find it
    /// later. Returns the first (and canonical) strong reference.
    pub fn new(payload: Payload) -> Arc<Object> {
        let handle = alloc_handle();
        let obj = Arc::new(Object { handle, payload });
        REGISTRY.lock().insert(handle, Arc::downgrade(&obj));
        obj
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn kind(&self) -> Kind {
        match &self.payload {
            Payload::Memory(_) => Kind::Memory,
            Payload::Domain(_) => Kind::Domain,
            Payload::Space(_) => Kind::Space,
            Payload::Task(_) => Kind::Task,
        }
    }

    pub fn as_memory(&self) -> Option<&MemoryObject> {
        match &self.payload {
            Payload::Memory(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_domain(&self) -> Option<&Domain> {
        match &self.payload {
            Payload::Domain(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_space(&self) -> Option<&SpaceObject> {
        match &self.payload {
            Payload::Space(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_task(&self) -> Option<&TaskObject> {
        match &self.payload {
            Payload::Task(t) => Some(t),
            _ => None,
        }
    }
}

impl Drop for Object {
    fn drop(&mut self) {
        REGISTRY.lock().remove(&self.handle);
    }
}

static NEXT_HANDLE: AtomicU32 = AtomicU32::new(Handle::FIRST_ALLOCATED);

fn alloc_handle() -> Handle {
    Handle(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
}

/// Process-wide weak table of every live object, keyed by handle. Populated
/// at construction, pruned on drop. Ordinary syscall handlers never consult
/// this directly -- they go through a task's own `Domain` -- but a handful
/// of privileged call sites (the scheduler, debug tooling) need to resolve a
/// handle with no domain in hand.
static REGISTRY: Mutex<BTreeMap<Handle, Weak<Object>>> = Mutex::new(BTreeMap::new());

pub fn global_lookup(handle: Handle, kind: Kind) -> Option<Arc<Object>> {
    let registry = REGISTRY.lock();
    let obj = registry.get(&handle)?.upgrade()?;
    if obj.kind() == kind {
        Some(obj)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::SpaceObject;

    fn new_space() -> Arc<Object> {
        Object::new(Payload::Space(SpaceObject::new()))
    }

    #[test]
    fn handles_are_allocated_uniquely() {
        let a = new_space();
        let b = new_space();
        assert_ne!(a.handle(), b.handle());
    }

    #[test]
    fn global_lookup_respects_kind() {
        let obj = new_space();
        let handle = obj.handle();
        assert!(global_lookup(handle, Kind::Space).is_some());
        assert!(global_lookup(handle, Kind::Memory).is_none());
    }

    #[test]
    fn global_lookup_fails_once_every_strong_reference_is_gone() {
        let obj = new_space();
        let handle = obj.handle();
        drop(obj);
        assert!(global_lookup(handle, Kind::Space).is_none());
    }

    #[test]
    fn concurrent_ref_and_deref_leave_exactly_one_strong_reference() {
        let obj = new_space();
        let mut threads = alloc::vec::Vec::new();
        for _ in 0..8 {
            let clone = Arc::clone(&obj);
            threads.push(std::thread::spawn(move || {
                let inner = Arc::clone(&clone);
                drop(inner);
                drop(clone);
            }));
        }
        for t in threads {
            t.join().unwrap();
        }
        assert_eq!(Arc::strong_count(&obj), 1);
    }
}
