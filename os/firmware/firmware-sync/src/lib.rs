//! # Firmware synchronization primitives
//!
//! Boot firmware has two shared-state patterns:
//!
//! - a value computed once by the primary core before secondaries are
//!   released, then read by every core without locking ([`SyncOnceCell`]);
//! - a device every core may write to, such as the early console
//!   ([`SpinLock`]).

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod spin_lock;
mod sync_once_cell;

pub use spin_lock::{SpinLock, SpinLockGuard};
pub use sync_once_cell::SyncOnceCell;
