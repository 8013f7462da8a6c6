use core::fmt::{self, Write};

/// Byte-oriented output available before anything else is initialized.
///
/// Implementations must not allocate and should not fail: a sink that cannot
/// keep up drops output rather than returning an error.
pub trait EarlySink: Write + Send {
    /// Push buffered output to the device.
    fn flush(&mut self) {}
}

/// Write `args` to `sink`, ignoring errors; diagnostics are best-effort.
#[inline]
pub fn write_best_effort<S: EarlySink + ?Sized>(sink: &mut S, args: fmt::Arguments<'_>) {
    let _ = sink.write_fmt(args);
}

/// Fixed-size in-memory sink.
///
/// Keeps the first `N` bytes written and counts the rest, so that the start
/// of a failure report survives even when the report is long.
pub struct MemorySink<const N: usize> {
    buf: [u8; N],
    len: usize,
    dropped: usize,
}

impl<const N: usize> MemorySink<N> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buf: [0; N],
            len: 0,
            dropped: 0,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Captured text. Truncation may split a multi-byte character; the
    /// partial character is left out.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match core::str::from_utf8(self.as_bytes()) {
            Ok(s) => s,
            Err(e) => {
                let valid = &self.buf[..e.valid_up_to()];
                core::str::from_utf8(valid).unwrap_or_default()
            }
        }
    }

    /// Bytes that did not fit.
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.dropped
    }

    pub const fn clear(&mut self) {
        self.len = 0;
        self.dropped = 0;
    }
}

impl<const N: usize> Default for MemorySink<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Write for MemorySink<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let bytes = s.as_bytes();
        let take = bytes.len().min(N - self.len);
        self.buf[self.len..self.len + take].copy_from_slice(&bytes[..take]);
        self.len += take;
        self.dropped += bytes.len() - take;
        Ok(())
    }
}

impl<const N: usize> EarlySink for MemorySink<N> {}

impl<S: EarlySink + ?Sized> EarlySink for &mut S {
    fn flush(&mut self) {
        (**self).flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_head_and_counts_tail() {
        let mut sink = MemorySink::<8>::new();
        write_best_effort(&mut sink, format_args!("bl{}: {}", 31, "entry"));
        assert_eq!(sink.as_str(), "bl31: en");
        assert_eq!(sink.dropped(), 3);

        sink.clear();
        assert_eq!(sink.as_str(), "");
    }

    #[test]
    fn split_character_is_left_out() {
        let mut sink = MemorySink::<4>::new();
        write_best_effort(&mut sink, format_args!("ab→"));
        assert_eq!(sink.as_bytes().len(), 4);
        assert_eq!(sink.as_str(), "ab");
    }
}
