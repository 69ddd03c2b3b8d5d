//! Optional process-wide registry.
//!
//! Passing a [`Registry`] explicitly is preferred. When a single shared
//! instance is more convenient, build and fill it during start-up, then hand
//! it to [`install`] once; after that it is read-only.

use std::sync::OnceLock;

use tracing::info;

use crate::registry::Registry;

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Install the process-wide registry. Fails, returning the registry, if one
/// is already installed.
pub fn install(registry: Registry) -> Result<(), Registry> {
    let count = registry.len();
    GLOBAL.set(registry)?;
    info!(types = count, "installed global envelope registry");
    Ok(())
}

/// The installed registry, if any.
pub fn registry() -> Option<&'static Registry> {
    GLOBAL.get()
}
