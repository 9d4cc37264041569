//! svckit engine — descriptor translation and native service control.
//!
//! Public API surface:
//! - [`control`] — [`NativeServiceControl`] gateway seam + [`ControlError`]
//! - [`params`] — [`ParameterStore`] seam, [`ParamValue`], recognized [`keys`]
//! - [`translator`] — [`ServiceEngine`], the boundary the CLI/GUI consume
//! - [`dump`] — descriptor → management-command text
//! - [`memory`] — in-memory fake of both seams
//! - [`scm`] — Windows production backends (compiled on Windows only)

pub mod control;
pub mod dump;
pub mod error;
pub mod memory;
pub mod params;
#[cfg(windows)]
pub mod scm;
pub mod translator;

pub use control::{ControlError, NativeConfig, NativeServiceControl};
pub use error::EngineError;
pub use memory::{MemoryParameterStore, MemoryServiceControl, MemorySystem};
pub use params::{keys, ParamError, ParamValue, ParameterStore};
pub use translator::{FailedWrite, InstallReport, ServiceEngine};
