//! Common error-handling support.
//!
//! Kernel-internal code speaks in `KResult`, a thin alias over the single
//! flat status enumeration that actually crosses the syscall boundary.
//! Centralizing on one error type here means a handler never has to decide
//! how to translate some bespoke internal error into a caller-visible code
//! -- it already is one.

pub type KResult<T> = Result<T, abi::Status>;
