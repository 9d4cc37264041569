//! Native service-control gateway seam.
//!
//! The trait carries the native-format field set so every backend — the
//! Windows SCM and the in-memory fake alike — sits behind the same boundary
//! the control-manager API defines. Conversions between descriptor fields and
//! native format (command-line composition, dependency wire encoding) happen
//! above this seam, in the translator.

use thiserror::Error;

/// Field set for a native create/change call.
///
/// String fields use the empty string for "absent": an empty `username`
/// means LocalSystem, an empty `dependencies` wire means no dependency list,
/// and on a change call an empty `binary_path` or `display_name` leaves the
/// existing value untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NativeConfig {
    pub name: String,
    pub display_name: String,
    /// Set through the secondary config-level call after create/change.
    pub description: String,
    /// Combined `"path" arguments` string (see `svckit_core::cmdline`).
    pub binary_path: String,
    /// Raw native start-type code.
    pub start_type: u32,
    /// NUL-delimited, double-NUL-terminated wire string
    /// (see `svckit_core::deps`).
    pub dependencies: String,
    pub username: String,
}

/// Scoped operations against the OS service control manager.
///
/// Every method acquires and releases its manager/service handles within the
/// call; nothing is cached between calls.
pub trait NativeServiceControl {
    /// Create the service and apply its description.
    fn install(&self, config: &NativeConfig, password: Option<&str>) -> Result<(), ControlError>;

    /// Mutate an existing service's configuration in place.
    fn change_config(
        &self,
        config: &NativeConfig,
        password: Option<&str>,
    ) -> Result<(), ControlError>;

    /// Mark the service for deletion. Native semantics: the service
    /// disappears once all open handles are released, not necessarily
    /// before this returns.
    fn delete(&self, name: &str) -> Result<(), ControlError>;

    fn start(&self, name: &str) -> Result<(), ControlError>;

    /// Issue a stop control. Reports whether the request was accepted, not
    /// whether the service reached the stopped state.
    fn stop(&self, name: &str) -> Result<(), ControlError>;

    /// Raw current-state code.
    fn query_status(&self, name: &str) -> Result<u32, ControlError>;

    fn query_config(&self, name: &str) -> Result<NativeConfig, ControlError>;

    /// Every service known to the OS, not just svckit-managed ones.
    fn list_all(&self) -> Result<Vec<String>, ControlError>;
}

/// Failures from the native control manager, keyed by operation.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("cannot open the service control manager: {0}")]
    ManagerUnavailable(String),

    #[error("service not found: {name}")]
    NotFound { name: String },

    #[error("service already exists: {name}")]
    AlreadyExists { name: String },

    #[error("failed to create service '{name}': {reason}")]
    CreateFailed { name: String, reason: String },

    #[error("failed to change configuration of '{name}': {reason}")]
    ChangeFailed { name: String, reason: String },

    #[error("failed to delete service '{name}': {reason}")]
    DeleteFailed { name: String, reason: String },

    #[error("failed to start service '{name}': {reason}")]
    StartFailed { name: String, reason: String },

    /// Stop was requested for a service that is not running. Benign for
    /// restart; an error everywhere else.
    #[error("service '{name}' is not running")]
    NotRunning { name: String },

    #[error("stop request for '{name}' was not accepted: {reason}")]
    StopFailed { name: String, reason: String },

    #[error("failed to query service '{name}': {reason}")]
    QueryFailed { name: String, reason: String },
}
