use crate::early_trace;
use crate::sink::EarlySink;
use firmware_sync::SpinLock;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// `log::Log` writing one line per record to an [`EarlySink`].
///
/// Declare it as a `static` and [`init`](Self::init) it; records from all
/// cores are serialized line by line.
pub struct ConsoleLogger<S> {
    max_level: LevelFilter,
    sink: SpinLock<S>,
}

impl<S: EarlySink> ConsoleLogger<S> {
    #[must_use]
    pub const fn new(sink: S, max_level: LevelFilter) -> Self {
        Self {
            max_level,
            sink: SpinLock::new(sink),
        }
    }

    /// Install as the global logger. Call once during early init.
    ///
    /// # Errors
    /// If another logger was installed first.
    pub fn init(&'static self) -> Result<(), SetLoggerError>
    where
        S: 'static,
    {
        log::set_logger(self)?;
        log::set_max_level(self.max_level);
        Ok(())
    }

    /// Borrow the sink, e.g. to write a report that bypasses level filtering.
    pub fn with_sink<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        self.sink.with_lock(f)
    }

    #[must_use]
    pub const fn max_level(&self) -> LevelFilter {
        self.max_level
    }
}

impl<S: EarlySink> Log for ConsoleLogger<S> {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        // "[LEVEL] target: message\n"
        self.sink.with_lock(|sink| {
            early_trace!(
                sink,
                "[{}] {}: {}\n",
                record.level(),
                record.target(),
                record.args()
            );
        });
    }

    fn flush(&self) {
        self.sink.with_lock(EarlySink::flush);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemorySink;
    use log::Level;

    #[test]
    #[cfg(feature = "enabled")]
    fn formats_and_filters() {
        let logger = ConsoleLogger::new(MemorySink::<128>::new(), LevelFilter::Info);

        logger.log(
            &Record::builder()
                .level(Level::Info)
                .target("firmware_layout::validate")
                .args(format_args!("bl2 layout valid"))
                .build(),
        );
        logger.log(
            &Record::builder()
                .level(Level::Debug)
                .target("firmware_layout::derive")
                .args(format_args!("derived bl2"))
                .build(),
        );

        logger.with_sink(|sink| {
            assert_eq!(
                sink.as_str(),
                "[INFO] firmware_layout::validate: bl2 layout valid\n"
            );
        });
    }
}
