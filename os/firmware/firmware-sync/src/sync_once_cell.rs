use core::{
    cell::UnsafeCell,
    hint::spin_loop,
    mem::MaybeUninit,
    sync::atomic::{AtomicU8, Ordering},
};

const UNINIT: u8 = 0;
const INITING: u8 = 1;
const READY: u8 = 2;

/// A cell written at most once and read lock-free afterwards.
///
/// ### Semantics
/// - [`set`](Self::set) / [`try_get_or_init`](Self::try_get_or_init) publish a
///   value exactly once; later attempts see the first value.
/// - Readers racing with the writer spin until the value is published; after
///   that, [`get`](Self::get) is a single acquire load.
/// - A failed fallible initializer leaves the cell empty.
///
/// ```rust
/// use firmware_sync::SyncOnceCell;
///
/// static LAYOUT_CHECKSUM: SyncOnceCell<u32> = SyncOnceCell::new();
///
/// assert!(LAYOUT_CHECKSUM.get().is_none());
/// assert_eq!(LAYOUT_CHECKSUM.set(7), Ok(&7));
/// assert_eq!(LAYOUT_CHECKSUM.set(8), Err(8));
/// assert_eq!(LAYOUT_CHECKSUM.get(), Some(&7));
/// ```
pub struct SyncOnceCell<T> {
    state: AtomicU8,
    value: UnsafeCell<MaybeUninit<T>>,
}

impl<T> Default for SyncOnceCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SyncOnceCell<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(UNINIT),
            value: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }

    /// Returns `Some(&T)` if already initialized.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        if self.state.load(Ordering::Acquire) == READY {
            // SAFETY: READY guarantees the write is done
            Some(unsafe { &*(*self.value.get()).as_ptr() })
        } else {
            None
        }
    }

    /// Whether a value has been published.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.state.load(Ordering::Acquire) == READY
    }

    /// Publish `value` unless the cell already holds one.
    ///
    /// # Errors
    /// Hands `value` back if another value was (or is being) published.
    pub fn set(&self, value: T) -> Result<&T, T> {
        if !self.try_begin() {
            return Err(value);
        }
        Ok(self.publish(value))
    }

    /// Initialize at most once and return `&T`.
    pub fn get_or_init(&self, init: impl FnOnce() -> T) -> &T {
        match self.try_get_or_init(|| Ok::<T, core::convert::Infallible>(init())) {
            Ok(v) => v,
            Err(never) => match never {},
        }
    }

    /// Initialize at most once with a fallible initializer.
    ///
    /// If `init` fails the cell goes back to empty and the error is returned;
    /// a later call may try again.
    ///
    /// # Errors
    /// Propagates the initializer's error.
    pub fn try_get_or_init<E>(&self, init: impl FnOnce() -> Result<T, E>) -> Result<&T, E> {
        // Fast path
        if let Some(v) = self.get() {
            return Ok(v);
        }

        if self.try_begin() {
            return match init() {
                Ok(v) => Ok(self.publish(v)),
                Err(e) => {
                    self.state.store(UNINIT, Ordering::Release);
                    Err(e)
                }
            };
        }

        // Someone else is initializing; wait until READY or abandoned
        loop {
            match self.state.load(Ordering::Acquire) {
                READY => {
                    // SAFETY: READY
                    return Ok(unsafe { &*(*self.value.get()).as_ptr() });
                }
                UNINIT => return self.try_get_or_init(init),
                _ => spin_loop(),
            }
        }
    }

    fn try_begin(&self) -> bool {
        self.state
            .compare_exchange(UNINIT, INITING, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    /// Caller must hold the INITING state.
    fn publish(&self, v: T) -> &T {
        unsafe {
            (*self.value.get()).write(v);
        }
        // Publish value before marking READY
        self.state.store(READY, Ordering::Release);
        // SAFETY: just wrote it
        unsafe { &*(*self.value.get()).as_ptr() }
    }
}

impl<T> Drop for SyncOnceCell<T> {
    fn drop(&mut self) {
        if *self.state.get_mut() == READY {
            // SAFETY: READY and we have exclusive access
            unsafe { self.value.get_mut().assume_init_drop() };
        }
    }
}

// Safety: shared after READY; initialization is single-writer.
unsafe impl<T: Sync + Send> Sync for SyncOnceCell<T> {}
unsafe impl<T: Send> Send for SyncOnceCell<T> {}
