use crate::sink::{EarlySink, write_best_effort};
use firmware_layout::LayoutError;
use firmware_platform::BootStage;
use firmware_platform::images::FIRMWARE_WELCOME_STR;

/// Print the boot banner.
pub fn banner<S: EarlySink + ?Sized>(sink: &mut S, stage: BootStage) {
    write_best_effort(sink, format_args!("{FIRMWARE_WELCOME_STR}"));
    write_best_effort(sink, format_args!("{stage}: {}\n", stage.image().file_name()));
}

/// Write a layout failure to `sink`, one line per violation.
pub fn report<S: EarlySink + ?Sized>(sink: &mut S, error: &LayoutError) {
    write_best_effort(sink, format_args!("FATAL: {error}\n"));
    if let LayoutError::LayoutViolation(violation) = error {
        for v in violation.violations() {
            write_best_effort(sink, format_args!("  - {v}\n"));
        }
    }
    sink.flush();
}

/// Park the core forever.
pub fn halt() -> ! {
    loop {
        #[cfg(target_arch = "aarch64")]
        // SAFETY: waiting for an event has no side effects
        unsafe {
            core::arch::asm!("wfe", options(nomem, nostack, preserves_flags));
        }
        #[cfg(not(target_arch = "aarch64"))]
        core::hint::spin_loop();
    }
}

/// Report `error` through `sink`, then halt.
pub fn report_and_halt<S: EarlySink + ?Sized>(sink: &mut S, error: &LayoutError) -> ! {
    report(sink, error);
    halt()
}

/// Unwrap a boot-time result or report the failure and halt.
///
/// ```rust,no_run
/// use firmware_console::{boot_or_halt, MemorySink};
/// use firmware_layout::{build_layout, LayoutConfig};
/// use firmware_platform::BootStage;
///
/// let mut console = MemorySink::<256>::new();
/// let config = boot_or_halt(&mut console, LayoutConfig::lcb(BootStage::Bl31).map_err(Into::into));
/// let layout = boot_or_halt(&mut console, build_layout(&config));
/// # let _ = layout;
/// ```
pub fn boot_or_halt<T, S: EarlySink + ?Sized>(sink: &mut S, result: Result<T, LayoutError>) -> T {
    match result {
        Ok(value) => value,
        Err(error) => report_and_halt(sink, &error),
    }
}
