//! Construction of the engine over the live system backends.
//!
//! All commands that talk to the operating system go through
//! [`engine`]. On non-Windows hosts it fails up front, so the
//! file-backed commands (`list`, `dump`, `export`) keep working
//! everywhere while the rest explain themselves instead of
//! half-running.

use anyhow::Result;
use svckit_engine::ServiceEngine;

#[cfg(windows)]
pub type PlatformEngine =
    ServiceEngine<svckit_engine::scm::ScmServiceControl, svckit_engine::scm::RegistryParameterStore>;

#[cfg(not(windows))]
pub type PlatformEngine =
    ServiceEngine<svckit_engine::MemoryServiceControl, svckit_engine::MemoryParameterStore>;

#[cfg(windows)]
pub fn engine() -> Result<PlatformEngine> {
    use svckit_engine::scm::{RegistryParameterStore, ScmServiceControl};

    Ok(ServiceEngine::new(
        ScmServiceControl::new(),
        RegistryParameterStore::new(),
    ))
}

#[cfg(not(windows))]
pub fn engine() -> Result<PlatformEngine> {
    anyhow::bail!("live service control requires Windows; only list, dump and export work here")
}
