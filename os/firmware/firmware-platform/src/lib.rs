//! # Platform Configuration for the Secure Boot Chain
//!
//! This crate holds the static facts a boot stage needs about the platform it
//! runs on, and the per-stage parameters that shape the memory map. It is the
//! single source of configuration for the layout engine: nothing in here is a
//! free-floating global constant that some other stage could edit out of
//! sync.
//!
//! ## Overview
//!
//! | Item | Module | Description |
//! |------|--------|-------------|
//! | [`PlatformTopology`] | [`topology`] | Validated cores, clusters, caches, DRAM, ROM and address width. |
//! | [`CacheGeometry`] | [`cache`] | Line size per cache level; the mailbox stride is the *largest*. |
//! | [`BootStage`] | [`stage`] | Which boot stage a layout is being built or validated for. |
//! | [`StageLimits`] | [`stage`] | Translation table and mapped region budget of one stage. |
//! | [`StageBudgets`] | [`budgets`] | Region sizes and offsets of every stage. |
//! | [`BootImage`] | [`images`] | Image file names loaded by the chain. |
//! | [`lcb`] | [`lcb`] | Reference profile of the LCB board. |
//!
//! ## Lifecycle
//!
//! A [`PlatformTopology`] is created exactly once through
//! [`PlatformTopology::new`], which is the only place the raw configuration is
//! checked. Afterwards it is immutable and handed to every other component by
//! shared reference.
//!
//! ```rust
//! use firmware_platform::{lcb, BootStage, PlatformTopology};
//!
//! let topology = PlatformTopology::new(lcb::topology_config()).unwrap();
//! assert_eq!(topology.core_count(), 6);
//! assert_eq!(topology.cache_line_size(), 64);
//! assert_eq!(lcb::stage_limits(BootStage::Bl31).max_xlat_tables, 2);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

pub mod budgets;
pub mod cache;
pub mod images;
pub mod lcb;
pub mod stage;
pub mod topology;

pub use budgets::StageBudgets;
pub use cache::{CacheGeometry, MAX_CACHE_LEVELS};
pub use images::BootImage;
pub use stage::{BootStage, StageLimits};
pub use topology::{PlatformTopology, TopologyConfig, TopologyError};
