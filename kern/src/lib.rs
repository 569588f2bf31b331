//! Kernel object model and syscall boundary.
//!
//! This crate owns everything a task can name through a handle -- memory
//! objects, address spaces, domains, and other tasks -- and the dispatcher
//! that validates and services a syscall against them. Objects are ordinary
//! reference-counted values (`Arc<Object>`); there is no separate
//! destruction path to get wrong, since dropping the last reference runs the
//! object's `Drop` impl directly.
//!
//! # Algorithm Naivety Principles
//!
//! This implementation uses straightforward algorithms over clever ones:
//!
//! 1. Use safe Rust for as much as possible.
//! 2. Use easily understood and debugged data structures (`BTreeMap`, a
//!    bitmap free list) over anything bespoke.
//! 3. Revisit these decisions if they become performance problems.
//!
//! Assumptions enabling our naivete:
//!
//! - The number of live objects in a system is small enough that a
//!   `BTreeMap` lookup is not a bottleneck.
//! - We are not attempting to achieve predictably low worst-case execution
//!   bounds or any realtime nonsense like that.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod arch;

pub mod dispatch;
pub mod domain;
pub mod err;
pub mod hostlog;
pub mod memobj;
pub mod object;
pub mod pmm;
pub mod sched;
pub mod space;
pub mod startup;
pub mod syscalls;
pub mod task;
