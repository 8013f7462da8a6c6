use crate::EarlySink;
use core::fmt::{self, Write};
use core::hint::spin_loop;
use core::ptr::{read_volatile, write_volatile};

/// Data register.
const UARTDR: usize = 0x00;
/// Flag register.
const UARTFR: usize = 0x18;
/// Transmit FIFO full.
const FR_TXFF: u32 = 1 << 5;

/// Transmit-only PL011 UART, already configured by the boot ROM.
pub struct Pl011 {
    base: *mut u32,
}

// Safety: the registers are device memory owned by whoever holds the sink.
unsafe impl Send for Pl011 {}

impl Pl011 {
    /// # Safety
    /// `base` must point to the mapped register block of a PL011 that no one
    /// else writes to.
    #[must_use]
    pub const unsafe fn new(base: *mut u32) -> Self {
        Self { base }
    }

    #[inline]
    fn register(&self, offset: usize) -> *mut u32 {
        self.base.wrapping_byte_add(offset)
    }

    pub fn write_byte(&mut self, byte: u8) {
        // SAFETY: `new` guarantees a valid register block
        unsafe {
            while read_volatile(self.register(UARTFR)) & FR_TXFF != 0 {
                spin_loop();
            }
            write_volatile(self.register(UARTDR), u32::from(byte));
        }
    }
}

impl Write for Pl011 {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            if byte == b'\n' {
                self.write_byte(b'\r');
            }
            self.write_byte(byte);
        }
        Ok(())
    }
}

impl EarlySink for Pl011 {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_data_register() {
        // register block in ordinary memory, FIFO never full
        let mut regs = [0u32; 0x48 / 4];
        let mut uart = unsafe { Pl011::new(regs.as_mut_ptr()) };
        uart.write_str("ok").unwrap();
        assert_eq!(regs[UARTDR / 4], u32::from(b'k'));
        assert_eq!(regs[UARTFR / 4], 0);
    }
}
