//! svckit core library — descriptor types, wire codecs, descriptor files.
//!
//! Public API surface:
//! - [`types`] — [`ServiceDescriptor`] and friends
//! - [`cmdline`] — combined binary-path codec
//! - [`deps`] — NUL-delimited dependency-list codec
//! - [`configs`] — JSON descriptor persistence
//! - [`error`] — [`ConfigStoreError`]

pub mod cmdline;
pub mod configs;
pub mod deps;
pub mod error;
pub mod types;

pub use error::ConfigStoreError;
pub use types::{
    ServiceDescriptor, ServiceName, ServiceState, StartupType, DEFAULT_LOG_ROTATION_FILES,
    DEFAULT_LOG_ROTATION_SIZE_MB, DEFAULT_PRIORITY,
};
