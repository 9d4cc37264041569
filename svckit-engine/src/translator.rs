//! Descriptor translator — turns a [`ServiceDescriptor`] into native control
//! calls plus extended parameter writes, and reassembles one on read-back.
//!
//! Install and edit are two independent steps against two subsystems with no
//! transaction between them: the native create/change first, the parameter
//! writes second. A failure in between leaves them inconsistent; install
//! reports partial failures explicitly in its [`InstallReport`], edit fails
//! fast.

use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use svckit_core::types::{
    ServiceDescriptor, ServiceState, StartupType, DEFAULT_LOG_ROTATION_FILES,
    DEFAULT_LOG_ROTATION_SIZE_MB, DEFAULT_PRIORITY,
};
use svckit_core::{cmdline, deps};

use crate::control::{ControlError, NativeConfig, NativeServiceControl};
use crate::error::EngineError;
use crate::params::{keys, ParamError, ParamValue, ParameterStore};

/// Outcome of an install whose primary create succeeded.
///
/// Extended writes are best-effort and independent; each failure lands here
/// instead of aborting the remaining writes or rolling back the create.
#[derive(Debug, Default)]
pub struct InstallReport {
    pub failed_writes: Vec<FailedWrite>,
}

impl InstallReport {
    pub fn fully_applied(&self) -> bool {
        self.failed_writes.is_empty()
    }
}

/// One extended parameter write that failed during install.
#[derive(Debug)]
pub struct FailedWrite {
    pub param: &'static str,
    pub error: ParamError,
}

/// The engine: codecs + native gateway + parameter store behind one API.
#[derive(Debug)]
pub struct ServiceEngine<C, P> {
    control: C,
    params: P,
}

impl<C: NativeServiceControl, P: ParameterStore> ServiceEngine<C, P> {
    pub fn new(control: C, params: P) -> Self {
        Self { control, params }
    }

    // -----------------------------------------------------------------------
    // Install / edit / uninstall
    // -----------------------------------------------------------------------

    /// Register the service and write its extended fields.
    ///
    /// Non-empty extended fields are written best-effort after the create;
    /// the returned report lists any that failed.
    pub fn install(&self, descriptor: &ServiceDescriptor) -> Result<InstallReport, EngineError> {
        validate(descriptor, true)?;
        let config = native_config(descriptor);
        debug!(service = %descriptor.name, binary = %config.binary_path, "installing service");
        self.control
            .install(&config, password_of(descriptor))?;

        let mut report = InstallReport::default();
        for (param, value) in install_writes(descriptor) {
            if let Err(error) = self.params.set(&descriptor.name.0, param, None, value) {
                warn!(service = %descriptor.name, param, %error, "extended parameter write failed");
                report.failed_writes.push(FailedWrite { param, error });
            }
        }
        Ok(report)
    }

    /// Change an existing service's configuration in place, then overwrite
    /// the full extended-field set. Extended writes fail fast here.
    pub fn edit(&self, descriptor: &ServiceDescriptor) -> Result<(), EngineError> {
        validate(descriptor, false)?;
        let config = native_config(descriptor);
        debug!(service = %descriptor.name, "editing service");
        self.control
            .change_config(&config, password_of(descriptor))?;

        let name = &descriptor.name.0;
        for (param, value) in edit_text_writes(descriptor) {
            self.params.set(name, param, None, value)?;
        }
        // Rotation, priority, and affinity are rewritten even when unchanged.
        self.params.set(
            name,
            keys::LOG_ROTATION,
            None,
            ParamValue::Number(i64::from(descriptor.log_rotation)),
        )?;
        self.params.set(
            name,
            keys::LOG_ROTATION_SIZE_MB,
            None,
            ParamValue::Number(i64::from(descriptor.log_rotation_size_mb)),
        )?;
        self.params.set(
            name,
            keys::LOG_ROTATION_FILES,
            None,
            ParamValue::Number(i64::from(descriptor.log_rotation_files)),
        )?;
        self.params.set(
            name,
            keys::PROCESS_PRIORITY,
            None,
            ParamValue::Number(i64::from(descriptor.priority)),
        )?;
        self.params.set(
            name,
            keys::CPU_AFFINITY,
            None,
            ParamValue::Number(descriptor.cpu_affinity as i64),
        )?;
        Ok(())
    }

    /// Delete the native service. The parameter namespace is deliberately
    /// left behind; a later install under the same name overwrites it.
    pub fn uninstall(&self, name: &str) -> Result<(), EngineError> {
        debug!(service = name, "uninstalling service");
        self.control.delete(name)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Read-back
    // -----------------------------------------------------------------------

    /// Reassemble a descriptor from the native configuration plus the
    /// extended parameter namespace. The password is never read back.
    pub fn read(&self, name: &str) -> Result<ServiceDescriptor, EngineError> {
        let config = self.control.query_config(name)?;
        let (executable_path, arguments) = cmdline::decompose(&config.binary_path);
        let dependencies = deps::decode(&config.dependencies);
        // The OS only hands back the five defined codes; anything else
        // falls to the default.
        let startup_type = StartupType::from_code(config.start_type).unwrap_or_default();

        Ok(ServiceDescriptor {
            name: name.into(),
            display_name: config.display_name,
            description: self.text_param(name, keys::SERVICE_DESCRIPTION)?,
            executable_path,
            arguments,
            working_directory: self.text_param(name, keys::WORKING_DIRECTORY)?,
            username: config.username,
            password: String::new(),
            startup_type,
            dependencies,
            environment_variables: self.text_param(name, keys::ENVIRONMENT)?,
            stdout_path: self.text_param(name, keys::STDOUT_PATH)?,
            stderr_path: self.text_param(name, keys::STDERR_PATH)?,
            priority: self
                .num_param(name, keys::PROCESS_PRIORITY)?
                .map_or(DEFAULT_PRIORITY, |n| n as u32),
            cpu_affinity: self
                .num_param(name, keys::CPU_AFFINITY)?
                .map_or(0, |n| n as u64),
            recovery_actions: self.text_param(name, keys::RECOVERY_ACTIONS)?,
            log_rotation: self
                .num_param(name, keys::LOG_ROTATION)?
                .is_some_and(|n| n != 0),
            log_rotation_size_mb: self
                .num_param(name, keys::LOG_ROTATION_SIZE_MB)?
                .map_or(DEFAULT_LOG_ROTATION_SIZE_MB, |n| n as u32),
            log_rotation_files: self
                .num_param(name, keys::LOG_ROTATION_FILES)?
                .map_or(DEFAULT_LOG_ROTATION_FILES, |n| n as u32),
        })
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    pub fn start(&self, name: &str) -> Result<(), EngineError> {
        self.control.start(name)?;
        Ok(())
    }

    /// Issue a stop control. Returns once the request is accepted; the
    /// service may still be stopping.
    pub fn stop(&self, name: &str) -> Result<(), EngineError> {
        self.control.stop(name)?;
        Ok(())
    }

    /// Stop, wait for the stopped state, then start.
    ///
    /// Polls the status every `poll_interval` until `timeout` expires;
    /// a service that never reaches stopped yields
    /// [`EngineError::StopTimeout`] and start is not issued.
    pub fn restart(
        &self,
        name: &str,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<(), EngineError> {
        match self.control.stop(name) {
            Ok(()) => {}
            // An already-stopped service is fine; the poll below confirms.
            // Any other stop failure (access denied, control rejected)
            // propagates instead of degrading into a timeout.
            Err(ControlError::NotRunning { .. }) => {}
            Err(err) => return Err(err.into()),
        }

        let deadline = Instant::now() + timeout;
        loop {
            let (state, _) = self.query_status(name)?;
            if state == ServiceState::Stopped {
                break;
            }
            if Instant::now() >= deadline {
                return Err(EngineError::StopTimeout {
                    name: name.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                });
            }
            thread::sleep(poll_interval);
        }
        self.start(name)
    }

    /// Current state as `(symbol, raw code)`; total over every code the OS
    /// can return.
    pub fn query_status(&self, name: &str) -> Result<(ServiceState, u32), EngineError> {
        let code = self.control.query_status(name)?;
        Ok((ServiceState::from_code(code), code))
    }

    /// Every service known to the OS.
    pub fn list_all(&self) -> Result<Vec<String>, EngineError> {
        Ok(self.control.list_all()?)
    }

    // -----------------------------------------------------------------------
    // Parameter passthrough
    // -----------------------------------------------------------------------

    pub fn get_parameter(
        &self,
        service: &str,
        param: &str,
        sub_param: Option<&str>,
    ) -> Result<Option<ParamValue>, EngineError> {
        Ok(self.params.get(service, param, sub_param)?)
    }

    pub fn set_parameter(
        &self,
        service: &str,
        param: &str,
        sub_param: Option<&str>,
        value: ParamValue,
    ) -> Result<(), EngineError> {
        Ok(self.params.set(service, param, sub_param, value)?)
    }

    /// Idempotent delete of a parameter or sub-parameter.
    pub fn delete_parameter(
        &self,
        service: &str,
        param: &str,
        sub_param: Option<&str>,
    ) -> Result<(), EngineError> {
        Ok(self.params.delete(service, param, sub_param)?)
    }

    /// Remove a top-level override. There is no stored default to restore —
    /// this is exactly a delete, historically surfaced as "reset".
    pub fn remove_override(&self, service: &str, param: &str) -> Result<(), EngineError> {
        self.delete_parameter(service, param, None)
    }

    /// Ask the runtime host for one log rotation by setting the sentinel
    /// flag it watches. No rotation happens here.
    pub fn trigger_log_rotate(&self, service: &str) -> Result<(), EngineError> {
        self.set_parameter(service, keys::ROTATE_LOG_NOW, None, ParamValue::Number(1))
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    fn text_param(&self, service: &str, param: &str) -> Result<String, EngineError> {
        Ok(self
            .params
            .get(service, param, None)?
            .and_then(|value| value.as_text().map(str::to_string))
            .unwrap_or_default())
    }

    fn num_param(&self, service: &str, param: &str) -> Result<Option<i64>, EngineError> {
        Ok(self
            .params
            .get(service, param, None)?
            .and_then(|value| value.as_number()))
    }
}

// ---------------------------------------------------------------------------
// Descriptor → native format
// ---------------------------------------------------------------------------

fn native_config(descriptor: &ServiceDescriptor) -> NativeConfig {
    NativeConfig {
        name: descriptor.name.0.clone(),
        display_name: descriptor.display_name.clone(),
        description: descriptor.description.clone(),
        binary_path: if descriptor.executable_path.is_empty() {
            String::new()
        } else {
            cmdline::compose(&descriptor.executable_path, &descriptor.arguments)
        },
        start_type: descriptor.startup_type.code(),
        dependencies: deps::encode(&descriptor.dependencies),
        username: descriptor.username.clone(),
    }
}

fn password_of(descriptor: &ServiceDescriptor) -> Option<&str> {
    if descriptor.password.is_empty() {
        None
    } else {
        Some(&descriptor.password)
    }
}

fn validate(descriptor: &ServiceDescriptor, installing: bool) -> Result<(), EngineError> {
    if descriptor.name.0.is_empty() {
        return Err(EngineError::InvalidDescriptor(
            "service name must not be empty".to_string(),
        ));
    }
    if installing && descriptor.executable_path.is_empty() {
        return Err(EngineError::InvalidDescriptor(
            "executable path must not be empty when installing".to_string(),
        ));
    }
    for dep in &descriptor.dependencies {
        if dep.is_empty() || dep.contains('\0') {
            return Err(EngineError::InvalidDescriptor(format!(
                "invalid dependency name {dep:?}"
            )));
        }
    }
    Ok(())
}

/// Non-empty extended fields written after a successful create, in the
/// order the native tooling historically wrote them.
fn install_writes(descriptor: &ServiceDescriptor) -> Vec<(&'static str, ParamValue)> {
    let mut writes = Vec::new();
    if !descriptor.environment_variables.is_empty() {
        writes.push((
            keys::ENVIRONMENT,
            ParamValue::MultiText(descriptor.environment_variables.clone()),
        ));
    }
    if !descriptor.stdout_path.is_empty() {
        writes.push((
            keys::STDOUT_PATH,
            ParamValue::Text(descriptor.stdout_path.clone()),
        ));
    }
    if !descriptor.stderr_path.is_empty() {
        writes.push((
            keys::STDERR_PATH,
            ParamValue::Text(descriptor.stderr_path.clone()),
        ));
    }
    if descriptor.log_rotation {
        writes.push((keys::LOG_ROTATION, ParamValue::Number(1)));
        writes.push((
            keys::LOG_ROTATION_SIZE_MB,
            ParamValue::Number(i64::from(descriptor.log_rotation_size_mb)),
        ));
        writes.push((
            keys::LOG_ROTATION_FILES,
            ParamValue::Number(i64::from(descriptor.log_rotation_files)),
        ));
    }
    if descriptor.priority != DEFAULT_PRIORITY {
        writes.push((
            keys::PROCESS_PRIORITY,
            ParamValue::Number(i64::from(descriptor.priority)),
        ));
    }
    if descriptor.cpu_affinity != 0 {
        writes.push((
            keys::CPU_AFFINITY,
            ParamValue::Number(descriptor.cpu_affinity as i64),
        ));
    }
    if !descriptor.recovery_actions.is_empty() {
        writes.push((
            keys::RECOVERY_ACTIONS,
            ParamValue::Text(descriptor.recovery_actions.clone()),
        ));
    }
    if !descriptor.description.is_empty() {
        writes.push((
            keys::SERVICE_DESCRIPTION,
            ParamValue::Text(descriptor.description.clone()),
        ));
    }
    if !descriptor.working_directory.is_empty() {
        writes.push((
            keys::WORKING_DIRECTORY,
            ParamValue::Text(descriptor.working_directory.clone()),
        ));
    }
    writes
}

/// Text-valued extended fields rewritten on edit when non-empty.
fn edit_text_writes(descriptor: &ServiceDescriptor) -> Vec<(&'static str, ParamValue)> {
    let mut writes = Vec::new();
    if !descriptor.working_directory.is_empty() {
        writes.push((
            keys::WORKING_DIRECTORY,
            ParamValue::Text(descriptor.working_directory.clone()),
        ));
    }
    if !descriptor.stdout_path.is_empty() {
        writes.push((
            keys::STDOUT_PATH,
            ParamValue::Text(descriptor.stdout_path.clone()),
        ));
    }
    if !descriptor.stderr_path.is_empty() {
        writes.push((
            keys::STDERR_PATH,
            ParamValue::Text(descriptor.stderr_path.clone()),
        ));
    }
    if !descriptor.environment_variables.is_empty() {
        writes.push((
            keys::ENVIRONMENT,
            ParamValue::MultiText(descriptor.environment_variables.clone()),
        ));
    }
    if !descriptor.recovery_actions.is_empty() {
        writes.push((
            keys::RECOVERY_ACTIONS,
            ParamValue::Text(descriptor.recovery_actions.clone()),
        ));
    }
    if !descriptor.description.is_empty() {
        writes.push((
            keys::SERVICE_DESCRIPTION,
            ParamValue::Text(descriptor.description.clone()),
        ));
    }
    writes
}
