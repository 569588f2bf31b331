//! A domain: the per-task namespace mapping handles to the objects a task
//! is allowed to name. Adding an object under a handle that's already
//! present replaces the old entry (and drops its reference) rather than
//! holding two strong references to it under one name.

use alloc::collections::BTreeMap;
use alloc::sync::Arc;

use abi::{Handle, Kind};
use spin::Mutex;

use crate::object::Object;

pub struct Domain {
    table: Mutex<BTreeMap<Handle, Arc<Object>>>,
}

impl Domain {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(BTreeMap::new()),
        }
    }

    /// Inserts `object` under its own handle. If that handle was already
    /// occupied, the previous occupant's reference is dropped.
    pub fn add(&self, object: Arc<Object>) {
        self.table.lock().insert(object.handle(), object);
    }

    pub fn remove(&self, handle: Handle) -> Option<Arc<Object>> {
        self.table.lock().remove(&handle)
    }

    /// Looks `handle` up and returns a fresh strong reference, but only if
    /// the object it names is of the expected `kind`.
    pub fn lookup(&self, handle: Handle, kind: Kind) -> Option<Arc<Object>> {
        let table = self.table.lock();
        let object = table.get(&handle)?;
        if object.kind() == kind {
            Some(Arc::clone(object))
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.table.lock().contains_key(&handle)
    }
}

impl Default for Domain {
    fn default() -> Self {
        Self::new()
    }
}
