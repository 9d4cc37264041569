//! Domain types for svckit service descriptors.
//!
//! Path-like fields (`executable_path`, `working_directory`, the redirection
//! targets) are plain `String`s on purpose: they describe the configuration of
//! a *service host* and are never opened by this process, and the combined
//! binary-path field is a command line, not a filesystem path.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Priority class slot meaning "normal" (the native default).
pub const DEFAULT_PRIORITY: u32 = 3;
/// Rotation size limit assumed when the parameter is absent.
pub const DEFAULT_LOG_ROTATION_SIZE_MB: u32 = 10;
/// Rotated-file count assumed when the parameter is absent.
pub const DEFAULT_LOG_ROTATION_FILES: u32 = 5;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed service name — also the native service identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceName(pub String);

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ServiceName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ServiceName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Native start-type of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StartupType {
    Boot,
    System,
    Automatic,
    #[default]
    Manual,
    Disabled,
}

impl StartupType {
    /// The native start-type code (`SERVICE_BOOT_START` .. `SERVICE_DISABLED`).
    pub fn code(self) -> u32 {
        match self {
            StartupType::Boot => 0,
            StartupType::System => 1,
            StartupType::Automatic => 2,
            StartupType::Manual => 3,
            StartupType::Disabled => 4,
        }
    }

    /// Inverse of [`code`](Self::code); `None` for codes the SCM never defines.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(StartupType::Boot),
            1 => Some(StartupType::System),
            2 => Some(StartupType::Automatic),
            3 => Some(StartupType::Manual),
            4 => Some(StartupType::Disabled),
            _ => None,
        }
    }
}

impl fmt::Display for StartupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupType::Boot => write!(f, "boot"),
            StartupType::System => write!(f, "system"),
            StartupType::Automatic => write!(f, "automatic"),
            StartupType::Manual => write!(f, "manual"),
            StartupType::Disabled => write!(f, "disabled"),
        }
    }
}

/// Current run-state of a service as reported by the control manager.
///
/// Total over the seven SCM states; anything else maps to [`Unknown`]
/// so a status query always yields something renderable.
///
/// [`Unknown`]: ServiceState::Unknown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Stopped,
    StartPending,
    StopPending,
    Running,
    ContinuePending,
    PausePending,
    Paused,
    Unknown(u32),
}

impl ServiceState {
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => ServiceState::Stopped,
            2 => ServiceState::StartPending,
            3 => ServiceState::StopPending,
            4 => ServiceState::Running,
            5 => ServiceState::ContinuePending,
            6 => ServiceState::PausePending,
            7 => ServiceState::Paused,
            other => ServiceState::Unknown(other),
        }
    }

    pub fn code(self) -> u32 {
        match self {
            ServiceState::Stopped => 1,
            ServiceState::StartPending => 2,
            ServiceState::StopPending => 3,
            ServiceState::Running => 4,
            ServiceState::ContinuePending => 5,
            ServiceState::PausePending => 6,
            ServiceState::Paused => 7,
            ServiceState::Unknown(code) => code,
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceState::Stopped => write!(f, "stopped"),
            ServiceState::StartPending => write!(f, "start-pending"),
            ServiceState::StopPending => write!(f, "stop-pending"),
            ServiceState::Running => write!(f, "running"),
            ServiceState::ContinuePending => write!(f, "continue-pending"),
            ServiceState::PausePending => write!(f, "pause-pending"),
            ServiceState::Paused => write!(f, "paused"),
            ServiceState::Unknown(code) => write!(f, "unknown({code})"),
        }
    }
}

// ---------------------------------------------------------------------------
// Descriptor
// ---------------------------------------------------------------------------

/// Everything svckit knows about one service, native and extended fields
/// alike. One descriptor per service, keyed by `name`.
///
/// `executable_path` and `arguments` are always kept separate here even
/// though the native API stores them as one combined string (see the
/// `cmdline` codec). `password` is write-only: it is handed to the native
/// API on install/edit and never read back from the live system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub name: ServiceName,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    pub executable_path: String,
    #[serde(default)]
    pub arguments: String,
    #[serde(default)]
    pub working_directory: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub startup_type: StartupType,
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Opaque delimited `key=value` text; stored whole as a multi-string
    /// parameter, never parsed by the engine.
    #[serde(default)]
    pub environment_variables: String,
    #[serde(default)]
    pub stdout_path: String,
    #[serde(default)]
    pub stderr_path: String,
    #[serde(default = "default_priority")]
    pub priority: u32,
    /// CPU affinity bitmask; 0 means unconstrained.
    #[serde(default)]
    pub cpu_affinity: u64,
    /// Encoded `action/delayMs,...` text, interpreted by the runtime host.
    #[serde(default)]
    pub recovery_actions: String,
    #[serde(default)]
    pub log_rotation: bool,
    #[serde(default = "default_rotation_size")]
    pub log_rotation_size_mb: u32,
    #[serde(default = "default_rotation_files")]
    pub log_rotation_files: u32,
}

fn default_priority() -> u32 {
    DEFAULT_PRIORITY
}

fn default_rotation_size() -> u32 {
    DEFAULT_LOG_ROTATION_SIZE_MB
}

fn default_rotation_files() -> u32 {
    DEFAULT_LOG_ROTATION_FILES
}

impl ServiceDescriptor {
    /// Minimal descriptor: display name defaults to the service name, every
    /// extended field to its documented default.
    pub fn new(name: impl Into<ServiceName>, executable_path: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            display_name: name.0.clone(),
            name,
            description: String::new(),
            executable_path: executable_path.into(),
            arguments: String::new(),
            working_directory: String::new(),
            username: String::new(),
            password: String::new(),
            startup_type: StartupType::default(),
            dependencies: Vec::new(),
            environment_variables: String::new(),
            stdout_path: String::new(),
            stderr_path: String::new(),
            priority: DEFAULT_PRIORITY,
            cpu_affinity: 0,
            recovery_actions: String::new(),
            log_rotation: false,
            log_rotation_size_mb: DEFAULT_LOG_ROTATION_SIZE_MB,
            log_rotation_files: DEFAULT_LOG_ROTATION_FILES,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_display() {
        assert_eq!(ServiceName::from("svcA").to_string(), "svcA");
    }

    #[test]
    fn startup_type_codes_roundtrip() {
        for ty in [
            StartupType::Boot,
            StartupType::System,
            StartupType::Automatic,
            StartupType::Manual,
            StartupType::Disabled,
        ] {
            assert_eq!(StartupType::from_code(ty.code()), Some(ty));
        }
        assert_eq!(StartupType::from_code(99), None);
    }

    #[test]
    fn startup_type_defaults_to_manual() {
        assert_eq!(StartupType::default(), StartupType::Manual);
        assert_eq!(StartupType::default().code(), 3);
    }

    #[test]
    fn service_state_total_over_defined_codes() {
        assert_eq!(ServiceState::from_code(1), ServiceState::Stopped);
        assert_eq!(ServiceState::from_code(4), ServiceState::Running);
        assert_eq!(ServiceState::from_code(7), ServiceState::Paused);
        assert_eq!(ServiceState::from_code(42), ServiceState::Unknown(42));
        assert_eq!(ServiceState::Unknown(42).to_string(), "unknown(42)");
    }

    #[test]
    fn descriptor_serde_roundtrip_with_defaults() {
        let desc = ServiceDescriptor::new("svcA", r"C:\app\a.exe");
        let json = serde_json::to_string(&desc).expect("serialize");
        let back: ServiceDescriptor = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, desc);

        // Minimal document fills in the documented defaults.
        let minimal: ServiceDescriptor =
            serde_json::from_str(r#"{"name":"svcA","executable_path":"C:\\app\\a.exe"}"#)
                .expect("deserialize minimal");
        assert_eq!(minimal.priority, DEFAULT_PRIORITY);
        assert_eq!(minimal.log_rotation_size_mb, DEFAULT_LOG_ROTATION_SIZE_MB);
        assert_eq!(minimal.log_rotation_files, DEFAULT_LOG_ROTATION_FILES);
        assert_eq!(minimal.startup_type, StartupType::Manual);
    }
}
