//! Log backend for ARMv7/8-M hardware targets.
//!
//! Real task scheduling and memory protection on this architecture are out
//! of scope here; this module only supplies the physical sink `hostlog`
//! writes composed lines through, via whichever of the `klog-itm` /
//! `klog-semihosting` features is enabled.

#[cfg(feature = "klog-itm")]
pub fn write_line(line: &str) {
    #[allow(unused_unsafe)]
    unsafe {
        let stim = &mut (*cortex_m::peripheral::ITM::ptr()).stim[0];
        cortex_m::iprintln!(stim, "{}", line);
    }
}

#[cfg(feature = "klog-semihosting")]
pub fn write_line(line: &str) {
    let _ = cortex_m_semihosting::hprintln!("{}", line);
}

#[cfg(not(any(feature = "klog-itm", feature = "klog-semihosting")))]
pub fn write_line(_line: &str) {}
