//! Extended parameter store seam.
//!
//! One namespace per service holding the configuration fields the native API
//! has no slot for. Keys are flat with an optional second-level sub-key to
//! emulate nested groups (e.g. a per-exit-code recovery action under
//! `("AppExit", "2")`). No deeper nesting exists.

use std::fmt;

use thiserror::Error;

/// Registry value names the translator reads and writes.
pub mod keys {
    pub const WORKING_DIRECTORY: &str = "WorkingDirectory";
    pub const ENVIRONMENT: &str = "Environment";
    pub const STDOUT_PATH: &str = "StdoutPath";
    pub const STDERR_PATH: &str = "StderrPath";
    pub const PROCESS_PRIORITY: &str = "ProcessPriority";
    pub const CPU_AFFINITY: &str = "CpuAffinity";
    pub const RECOVERY_ACTIONS: &str = "RecoveryActions";
    pub const LOG_ROTATION: &str = "LogRotation";
    pub const LOG_ROTATION_SIZE_MB: &str = "LogRotationSizeMB";
    pub const LOG_ROTATION_FILES: &str = "LogRotationFiles";
    pub const SERVICE_DESCRIPTION: &str = "ServiceDescription";
    /// Sentinel consumed by the runtime host; writing it requests one
    /// rotation, the store itself never rotates anything.
    pub const ROTATE_LOG_NOW: &str = "RotateLogNow";
}

/// A stored parameter value.
///
/// `MultiText` is a registry multi-string written as one opaque blob — the
/// environment block uses it; the engine never parses the pairs inside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    MultiText(String),
    Number(i64),
}

impl ParamValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) | ParamValue::MultiText(s) => Some(s),
            ParamValue::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            ParamValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Text(s) | ParamValue::MultiText(s) => s.fmt(f),
            ParamValue::Number(n) => n.fmt(f),
        }
    }
}

/// Two-level persistent key-value store, one namespace per service.
pub trait ParameterStore {
    /// `Ok(None)` when the namespace or the key does not exist.
    fn get(
        &self,
        service: &str,
        param: &str,
        sub_param: Option<&str>,
    ) -> Result<Option<ParamValue>, ParamError>;

    /// Fails with [`ParamError::NamespaceUnavailable`] when the service's
    /// namespace is missing. A `sub_param` creates its nested group
    /// implicitly.
    fn set(
        &self,
        service: &str,
        param: &str,
        sub_param: Option<&str>,
        value: ParamValue,
    ) -> Result<(), ParamError>;

    /// Idempotent: absent namespaces, groups, and keys are a no-op.
    fn delete(&self, service: &str, param: &str, sub_param: Option<&str>)
        -> Result<(), ParamError>;
}

#[derive(Debug, Error)]
pub enum ParamError {
    /// The per-service namespace does not exist — typically the service was
    /// never installed through this engine.
    #[error("no parameter namespace for service '{service}'")]
    NamespaceUnavailable { service: String },

    #[error("parameter store failure for '{service}': {reason}")]
    StoreFailure { service: String, reason: String },
}
