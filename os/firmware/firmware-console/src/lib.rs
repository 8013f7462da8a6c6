//! # Early Diagnostic Console
//!
//! The earliest output channel of a boot stage: usable before the layout is
//! validated, so that a layout failure can be reported before the core halts.
//!
//! ## Output path
//!
//! ```text
//! log::info! / early_trace!        report_and_halt
//!          ↓                              ↓
//!   ConsoleLogger<S> ──── SpinLock ──► EarlySink (fmt::Write)
//!                                         ↓
//!                               Pl011 UART / MemorySink
//! ```
//!
//! ## Components
//!
//! - [`EarlySink`]: a non-allocating byte sink; [`Pl011`] for the UART the boot
//!   ROM leaves configured, [`MemorySink`] for a RAM buffer.
//! - [`ConsoleLogger`]: `log::Log` implementation, `"[LEVEL] target: message"`
//!   per line, serialized across cores.
//! - [`early_trace!`]: formatted output bypassing the log framework. Compiled
//!   out without the `enabled` feature.
//! - [`boot_or_halt`] / [`report_and_halt`]: terminal failure reporting. Always
//!   compiled in.
//!
//! ```rust
//! use firmware_console::{report, ConsoleLogger, MemorySink};
//! use firmware_layout::{build_layout, LayoutConfig};
//! use firmware_platform::BootStage;
//! use log::LevelFilter;
//!
//! static CONSOLE: ConsoleLogger<MemorySink<1024>> =
//!     ConsoleLogger::new(MemorySink::new(), LevelFilter::Info);
//! CONSOLE.init().unwrap();
//!
//! let mut config = LayoutConfig::lcb(BootStage::Bl2).unwrap();
//! config.limits.max_mmap_regions = 1;
//! if let Err(e) = build_layout(&config) {
//!     CONSOLE.with_sink(|sink| report(sink, &e));
//! }
//! CONSOLE.with_sink(|sink| assert!(sink.as_str().contains("FATAL: 1 layout violation(s) for bl2")));
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod fatal;
mod logger;
mod pl011;
mod sink;

pub use fatal::{banner, boot_or_halt, halt, report, report_and_halt};
pub use logger::ConsoleLogger;
pub use pl011::Pl011;
pub use sink::{EarlySink, MemorySink, write_best_effort};

/// Formatted output to an [`EarlySink`], without allocation.
///
/// ```rust
/// use firmware_console::{early_trace, MemorySink};
///
/// let mut sink = MemorySink::<64>::new();
/// early_trace!(&mut sink, "core {} parked\n", 3);
/// # #[cfg(feature = "enabled")]
/// assert_eq!(sink.as_str(), "core 3 parked\n");
/// ```
#[cfg(feature = "enabled")]
#[macro_export]
macro_rules! early_trace {
    ($sink:expr, $($arg:tt)*) => {{
        $crate::write_best_effort($sink, core::format_args!($($arg)*));
    }};
}

#[cfg(not(feature = "enabled"))]
#[macro_export]
macro_rules! early_trace {
    ($sink:expr, $($arg:tt)*) => {{
        let _ = &$sink;
        if false {
            let _ = core::format_args!($($arg)*);
        }
    }};
}
