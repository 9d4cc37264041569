//! In-memory fake of the control manager and parameter store.
//!
//! Both trait handles share one state table behind a lock, so installing a
//! service through the control side also creates its parameter namespace —
//! the same coupling the real SCM has with `Services\<name>` registry keys.
//! Deleting a service leaves the namespace behind, which is exactly the
//! orphaned-parameter behavior the engine documents.
//!
//! Test hooks:
//! - [`MemorySystem::set_stop_latency`] — stopped services report
//!   stop-pending for N status queries before reaching stopped.
//! - [`MemorySystem::set_params_unavailable`] — the parameter side behaves
//!   as if every namespace were missing.
//! - [`MemorySystem::set_stop_rejected`] — stop requests fail outright, as
//!   they would under an access-denied SCM handle.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::control::{ControlError, NativeConfig, NativeServiceControl};
use crate::params::{ParamError, ParamValue, ParameterStore};

const STATE_STOPPED: u32 = 1;
const STATE_STOP_PENDING: u32 = 3;
const STATE_RUNNING: u32 = 4;

#[derive(Debug, Default)]
struct Namespace {
    values: BTreeMap<String, ParamValue>,
    groups: BTreeMap<String, BTreeMap<String, ParamValue>>,
}

#[derive(Debug)]
struct ServiceRecord {
    config: NativeConfig,
    state_code: u32,
    /// Status queries left that still see stop-pending.
    pending_stop: u32,
}

#[derive(Debug, Default)]
struct SystemState {
    services: BTreeMap<String, ServiceRecord>,
    namespaces: BTreeMap<String, Namespace>,
    params_unavailable: bool,
    stop_latency: u32,
    stop_rejected: bool,
}

/// Shared fake system; [`control`](Self::control) and
/// [`params`](Self::params) hand out trait impls over the same state.
#[derive(Debug, Clone, Default)]
pub struct MemorySystem {
    inner: Arc<Mutex<SystemState>>,
}

impl MemorySystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn control(&self) -> MemoryServiceControl {
        MemoryServiceControl {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn params(&self) -> MemoryParameterStore {
        MemoryParameterStore {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Future stops report stop-pending for `queries` status queries.
    pub fn set_stop_latency(&self, queries: u32) {
        self.lock().stop_latency = queries;
    }

    /// Make the parameter side treat every namespace as missing.
    pub fn set_params_unavailable(&self, unavailable: bool) {
        self.lock().params_unavailable = unavailable;
    }

    /// Reject future stop requests outright, as an access-denied SCM would.
    pub fn set_stop_rejected(&self, rejected: bool) {
        self.lock().stop_rejected = rejected;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SystemState> {
        self.inner.lock().expect("memory system lock poisoned")
    }
}

/// Control-side handle of a [`MemorySystem`].
#[derive(Debug, Clone)]
pub struct MemoryServiceControl {
    inner: Arc<Mutex<SystemState>>,
}

impl MemoryServiceControl {
    fn lock(&self) -> std::sync::MutexGuard<'_, SystemState> {
        self.inner.lock().expect("memory system lock poisoned")
    }
}

impl NativeServiceControl for MemoryServiceControl {
    fn install(&self, config: &NativeConfig, _password: Option<&str>) -> Result<(), ControlError> {
        let mut state = self.lock();
        if state.services.contains_key(&config.name) {
            return Err(ControlError::AlreadyExists {
                name: config.name.clone(),
            });
        }
        state.services.insert(
            config.name.clone(),
            ServiceRecord {
                config: config.clone(),
                state_code: STATE_STOPPED,
                pending_stop: 0,
            },
        );
        // CreateService also creates the service's registry key.
        state.namespaces.entry(config.name.clone()).or_default();
        Ok(())
    }

    fn change_config(
        &self,
        config: &NativeConfig,
        _password: Option<&str>,
    ) -> Result<(), ControlError> {
        let mut state = self.lock();
        let record = state
            .services
            .get_mut(&config.name)
            .ok_or_else(|| ControlError::NotFound {
                name: config.name.clone(),
            })?;
        let mut merged = config.clone();
        // Empty change-call fields mean "leave unchanged".
        if merged.binary_path.is_empty() {
            merged.binary_path = record.config.binary_path.clone();
        }
        if merged.display_name.is_empty() {
            merged.display_name = record.config.display_name.clone();
        }
        record.config = merged;
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<(), ControlError> {
        let mut state = self.lock();
        if state.services.remove(name).is_none() {
            return Err(ControlError::NotFound {
                name: name.to_string(),
            });
        }
        // The parameter namespace stays behind, as documented.
        Ok(())
    }

    fn start(&self, name: &str) -> Result<(), ControlError> {
        let mut state = self.lock();
        let record = state
            .services
            .get_mut(name)
            .ok_or_else(|| ControlError::NotFound {
                name: name.to_string(),
            })?;
        if record.state_code == STATE_RUNNING {
            return Err(ControlError::StartFailed {
                name: name.to_string(),
                reason: "service is already running".to_string(),
            });
        }
        record.state_code = STATE_RUNNING;
        record.pending_stop = 0;
        Ok(())
    }

    fn stop(&self, name: &str) -> Result<(), ControlError> {
        let mut state = self.lock();
        let latency = state.stop_latency;
        let rejected = state.stop_rejected;
        let record = state
            .services
            .get_mut(name)
            .ok_or_else(|| ControlError::NotFound {
                name: name.to_string(),
            })?;
        if rejected {
            return Err(ControlError::StopFailed {
                name: name.to_string(),
                reason: "access is denied".to_string(),
            });
        }
        if record.state_code == STATE_STOPPED {
            return Err(ControlError::NotRunning {
                name: name.to_string(),
            });
        }
        if latency > 0 {
            record.state_code = STATE_STOP_PENDING;
            record.pending_stop = latency;
        } else {
            record.state_code = STATE_STOPPED;
        }
        Ok(())
    }

    fn query_status(&self, name: &str) -> Result<u32, ControlError> {
        let mut state = self.lock();
        let record = state
            .services
            .get_mut(name)
            .ok_or_else(|| ControlError::NotFound {
                name: name.to_string(),
            })?;
        if record.pending_stop > 0 {
            record.pending_stop -= 1;
            if record.pending_stop == 0 {
                record.state_code = STATE_STOPPED;
            }
            return Ok(STATE_STOP_PENDING);
        }
        Ok(record.state_code)
    }

    fn query_config(&self, name: &str) -> Result<NativeConfig, ControlError> {
        let state = self.lock();
        state
            .services
            .get(name)
            .map(|record| record.config.clone())
            .ok_or_else(|| ControlError::NotFound {
                name: name.to_string(),
            })
    }

    fn list_all(&self) -> Result<Vec<String>, ControlError> {
        Ok(self.lock().services.keys().cloned().collect())
    }
}

/// Parameter-side handle of a [`MemorySystem`].
#[derive(Debug, Clone)]
pub struct MemoryParameterStore {
    inner: Arc<Mutex<SystemState>>,
}

impl MemoryParameterStore {
    fn lock(&self) -> std::sync::MutexGuard<'_, SystemState> {
        self.inner.lock().expect("memory system lock poisoned")
    }
}

impl ParameterStore for MemoryParameterStore {
    fn get(
        &self,
        service: &str,
        param: &str,
        sub_param: Option<&str>,
    ) -> Result<Option<ParamValue>, ParamError> {
        let state = self.lock();
        if state.params_unavailable {
            return Ok(None);
        }
        let Some(namespace) = state.namespaces.get(service) else {
            return Ok(None);
        };
        let value = match sub_param {
            None => namespace.values.get(param),
            Some(sub) => namespace.groups.get(param).and_then(|group| group.get(sub)),
        };
        Ok(value.cloned())
    }

    fn set(
        &self,
        service: &str,
        param: &str,
        sub_param: Option<&str>,
        value: ParamValue,
    ) -> Result<(), ParamError> {
        let mut state = self.lock();
        if state.params_unavailable || !state.namespaces.contains_key(service) {
            return Err(ParamError::NamespaceUnavailable {
                service: service.to_string(),
            });
        }
        let namespace = state
            .namespaces
            .get_mut(service)
            .expect("namespace checked above");
        match sub_param {
            None => {
                namespace.values.insert(param.to_string(), value);
            }
            Some(sub) => {
                namespace
                    .groups
                    .entry(param.to_string())
                    .or_default()
                    .insert(sub.to_string(), value);
            }
        }
        Ok(())
    }

    fn delete(
        &self,
        service: &str,
        param: &str,
        sub_param: Option<&str>,
    ) -> Result<(), ParamError> {
        let mut state = self.lock();
        if state.params_unavailable {
            return Ok(());
        }
        let Some(namespace) = state.namespaces.get_mut(service) else {
            return Ok(());
        };
        match sub_param {
            None => {
                namespace.values.remove(param);
            }
            Some(sub) => {
                if let Some(group) = namespace.groups.get_mut(param) {
                    group.remove(sub);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn installed(system: &MemorySystem, name: &str) {
        let config = NativeConfig {
            name: name.to_string(),
            display_name: name.to_string(),
            binary_path: format!("\"C:\\svc\\{name}.exe\""),
            start_type: 3,
            ..NativeConfig::default()
        };
        system.control().install(&config, None).expect("install");
    }

    #[test]
    fn install_creates_parameter_namespace() {
        let system = MemorySystem::new();
        installed(&system, "svcA");
        system
            .params()
            .set("svcA", "WorkingDirectory", None, ParamValue::Text("C:\\w".into()))
            .expect("set into fresh namespace");
    }

    #[test]
    fn install_twice_reports_already_exists() {
        let system = MemorySystem::new();
        installed(&system, "svcA");
        let config = NativeConfig {
            name: "svcA".to_string(),
            ..NativeConfig::default()
        };
        assert!(matches!(
            system.control().install(&config, None),
            Err(ControlError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn set_without_namespace_is_unavailable() {
        let system = MemorySystem::new();
        let err = system
            .params()
            .set("ghost", "K", None, ParamValue::Number(1))
            .unwrap_err();
        assert!(matches!(err, ParamError::NamespaceUnavailable { .. }));
        // Reads and deletes stay quiet.
        assert!(system.params().get("ghost", "K", None).unwrap().is_none());
        system.params().delete("ghost", "K", None).unwrap();
    }

    #[test]
    fn sub_param_groups_are_created_implicitly() {
        let system = MemorySystem::new();
        installed(&system, "svcA");
        let params = system.params();
        params
            .set("svcA", "AppExit", Some("2"), ParamValue::Text("Restart".into()))
            .expect("set sub-param");
        assert_eq!(
            params.get("svcA", "AppExit", Some("2")).unwrap(),
            Some(ParamValue::Text("Restart".into()))
        );
        // The flat key of the same name is untouched.
        assert_eq!(params.get("svcA", "AppExit", None).unwrap(), None);
    }

    #[test]
    fn stop_latency_scripts_pending_queries() {
        let system = MemorySystem::new();
        installed(&system, "svcA");
        let control = system.control();
        control.start("svcA").expect("start");
        system.set_stop_latency(2);
        control.stop("svcA").expect("stop accepted");

        assert_eq!(control.query_status("svcA").unwrap(), STATE_STOP_PENDING);
        assert_eq!(control.query_status("svcA").unwrap(), STATE_STOP_PENDING);
        assert_eq!(control.query_status("svcA").unwrap(), STATE_STOPPED);
    }

    #[test]
    fn delete_keeps_namespace() {
        let system = MemorySystem::new();
        installed(&system, "svcA");
        let params = system.params();
        params
            .set("svcA", "WorkingDirectory", None, ParamValue::Text("C:\\w".into()))
            .unwrap();
        system.control().delete("svcA").expect("delete");
        assert!(matches!(
            system.control().query_status("svcA"),
            Err(ControlError::NotFound { .. })
        ));
        assert_eq!(
            params.get("svcA", "WorkingDirectory", None).unwrap(),
            Some(ParamValue::Text("C:\\w".into()))
        );
    }
}
