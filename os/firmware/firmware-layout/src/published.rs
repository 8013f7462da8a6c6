//! # Published Layout
//!
//! The primary core validates the layout once, before releasing secondaries;
//! every core then reads the same instance without locking.

use crate::error::LayoutError;
use crate::validate::ValidatedLayout;
use firmware_sync::SyncOnceCell;
use log::info;

static PUBLISHED: SyncOnceCell<ValidatedLayout> = SyncOnceCell::new();

/// Publish `layout` for all cores.
///
/// # Errors
/// Hands the layout back if one was already published.
pub fn publish(layout: ValidatedLayout) -> Result<&'static ValidatedLayout, ValidatedLayout> {
    let stage = layout.stage();
    let published = PUBLISHED.set(layout)?;
    info!("{stage} layout published");
    Ok(published)
}

/// The published layout, if any.
#[must_use]
pub fn published() -> Option<&'static ValidatedLayout> {
    PUBLISHED.get()
}

/// Build and publish the layout unless already published.
///
/// A failed build leaves nothing published; a later call may try again.
///
/// # Errors
/// Whatever `build` returns.
pub fn publish_with(
    build: impl FnOnce() -> Result<ValidatedLayout, LayoutError>,
) -> Result<&'static ValidatedLayout, LayoutError> {
    PUBLISHED.try_get_or_init(build)
}
