//! Architecture selection.
//!
//! Real hardware (`target_os = "none"`) gets the ARMv7/8-M log backend;
//! every other target -- host builds, `cargo test` -- gets the simulator
//! backend so the rest of the kernel is actually exercisable without
//! bringing up real hardware.

cfg_if::cfg_if! {
    if #[cfg(target_os = "none")] {
        mod arm_m;
        pub use arm_m::write_line;
    } else {
        mod simulator;
        pub use simulator::write_line;
        #[cfg(test)]
        pub use simulator::drain_log;
    }
}
