//! Production Windows backends: the service control manager through the
//! `windows-service` crate and the parameter store under
//! `HKLM\SYSTEM\CurrentControlSet\Services\<name>` through `winreg`.
//!
//! Manager and service handles are scoped to each call and close on drop,
//! so they are released on every exit path.

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

use winreg::enums::{
    HKEY_LOCAL_MACHINE, KEY_READ, KEY_SET_VALUE, REG_DWORD, REG_EXPAND_SZ, REG_MULTI_SZ,
    REG_QWORD, REG_SZ,
};
use winreg::{RegKey, RegValue};

use windows_service::service::{
    Service, ServiceAccess, ServiceDependency, ServiceErrorControl, ServiceInfo, ServiceStartType,
    ServiceState as ScmState, ServiceType,
};
use windows_service::service_manager::{ServiceManager, ServiceManagerAccess};

use svckit_core::{cmdline, deps};

use crate::control::{ControlError, NativeConfig, NativeServiceControl};
use crate::params::{ParamError, ParamValue, ParameterStore};

const SERVICES_KEY: &str = r"SYSTEM\CurrentControlSet\Services";

// Win32 error codes the mapping below branches on.
const ERROR_SERVICE_DOES_NOT_EXIST: i32 = 1060;
const ERROR_SERVICE_NOT_ACTIVE: i32 = 1062;
const ERROR_SERVICE_EXISTS: i32 = 1073;

/// Service-control gateway over the live SCM.
#[derive(Debug, Default)]
pub struct ScmServiceControl;

impl ScmServiceControl {
    pub fn new() -> Self {
        Self
    }

    fn manager(access: ServiceManagerAccess) -> Result<ServiceManager, ControlError> {
        ServiceManager::local_computer(None::<&str>, access)
            .map_err(|err| ControlError::ManagerUnavailable(err.to_string()))
    }

    fn open(
        manager: &ServiceManager,
        name: &str,
        access: ServiceAccess,
    ) -> Result<Service, ControlError> {
        manager.open_service(name, access).map_err(|err| {
            if raw_code(&err) == Some(ERROR_SERVICE_DOES_NOT_EXIST) {
                ControlError::NotFound {
                    name: name.to_string(),
                }
            } else {
                ControlError::QueryFailed {
                    name: name.to_string(),
                    reason: err.to_string(),
                }
            }
        })
    }
}

impl NativeServiceControl for ScmServiceControl {
    fn install(&self, config: &NativeConfig, password: Option<&str>) -> Result<(), ControlError> {
        let manager = Self::manager(
            ServiceManagerAccess::CONNECT | ServiceManagerAccess::CREATE_SERVICE,
        )?;
        let info = service_info(config, password);
        let service = manager
            .create_service(&info, ServiceAccess::CHANGE_CONFIG)
            .map_err(|err| {
                if raw_code(&err) == Some(ERROR_SERVICE_EXISTS) {
                    ControlError::AlreadyExists {
                        name: config.name.clone(),
                    }
                } else {
                    ControlError::CreateFailed {
                        name: config.name.clone(),
                        reason: err.to_string(),
                    }
                }
            })?;
        if !config.description.is_empty() {
            service
                .set_description(OsString::from(&config.description))
                .map_err(|err| ControlError::CreateFailed {
                    name: config.name.clone(),
                    reason: format!("service created but set_description failed: {err}"),
                })?;
        }
        Ok(())
    }

    fn change_config(
        &self,
        config: &NativeConfig,
        password: Option<&str>,
    ) -> Result<(), ControlError> {
        let manager = Self::manager(ServiceManagerAccess::CONNECT)?;
        let service = Self::open(
            &manager,
            &config.name,
            ServiceAccess::QUERY_CONFIG | ServiceAccess::CHANGE_CONFIG,
        )?;

        // Empty change-call fields keep the existing values.
        let mut effective = config.clone();
        if effective.binary_path.is_empty() || effective.display_name.is_empty() {
            let current = service
                .query_config()
                .map_err(|err| ControlError::QueryFailed {
                    name: config.name.clone(),
                    reason: err.to_string(),
                })?;
            if effective.binary_path.is_empty() {
                effective.binary_path = current.executable_path.to_string_lossy().into_owned();
            }
            if effective.display_name.is_empty() {
                effective.display_name = current.display_name.to_string_lossy().into_owned();
            }
        }

        let info = service_info(&effective, password);
        service
            .change_config(&info)
            .map_err(|err| ControlError::ChangeFailed {
                name: config.name.clone(),
                reason: err.to_string(),
            })?;
        if !config.description.is_empty() {
            service
                .set_description(OsString::from(&config.description))
                .map_err(|err| ControlError::ChangeFailed {
                    name: config.name.clone(),
                    reason: format!("set_description failed: {err}"),
                })?;
        }
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<(), ControlError> {
        let manager = Self::manager(ServiceManagerAccess::CONNECT)?;
        let service = Self::open(&manager, name, ServiceAccess::DELETE)?;
        // Native semantics: marked for deletion, gone once handles release.
        service.delete().map_err(|err| ControlError::DeleteFailed {
            name: name.to_string(),
            reason: err.to_string(),
        })
    }

    fn start(&self, name: &str) -> Result<(), ControlError> {
        let manager = Self::manager(ServiceManagerAccess::CONNECT)?;
        let service = Self::open(&manager, name, ServiceAccess::START)?;
        let no_args: [&OsStr; 0] = [];
        service
            .start(&no_args)
            .map_err(|err| ControlError::StartFailed {
                name: name.to_string(),
                reason: err.to_string(),
            })
    }

    fn stop(&self, name: &str) -> Result<(), ControlError> {
        let manager = Self::manager(ServiceManagerAccess::CONNECT)?;
        let service = Self::open(&manager, name, ServiceAccess::STOP)?;
        service.stop().map(|_| ()).map_err(|err| {
            if raw_code(&err) == Some(ERROR_SERVICE_NOT_ACTIVE) {
                ControlError::NotRunning {
                    name: name.to_string(),
                }
            } else {
                ControlError::StopFailed {
                    name: name.to_string(),
                    reason: err.to_string(),
                }
            }
        })
    }

    fn query_status(&self, name: &str) -> Result<u32, ControlError> {
        let manager = Self::manager(ServiceManagerAccess::CONNECT)?;
        let service = Self::open(&manager, name, ServiceAccess::QUERY_STATUS)?;
        let status = service
            .query_status()
            .map_err(|err| ControlError::QueryFailed {
                name: name.to_string(),
                reason: err.to_string(),
            })?;
        Ok(state_code(status.current_state))
    }

    fn query_config(&self, name: &str) -> Result<NativeConfig, ControlError> {
        let manager = Self::manager(ServiceManagerAccess::CONNECT)?;
        let service = Self::open(&manager, name, ServiceAccess::QUERY_CONFIG)?;
        let config = service
            .query_config()
            .map_err(|err| ControlError::QueryFailed {
                name: name.to_string(),
                reason: err.to_string(),
            })?;

        let dependency_names: Vec<String> = config
            .dependencies
            .iter()
            .filter_map(|dep| match dep {
                ServiceDependency::Service(os) => Some(os.to_string_lossy().into_owned()),
                ServiceDependency::Group(_) => None,
            })
            .collect();

        Ok(NativeConfig {
            name: name.to_string(),
            display_name: config.display_name.to_string_lossy().into_owned(),
            description: String::new(),
            binary_path: config.executable_path.to_string_lossy().into_owned(),
            start_type: start_type_code(config.start_type),
            dependencies: deps::encode(&dependency_names),
            username: config
                .account_name
                .map(|account| account.to_string_lossy().into_owned())
                .unwrap_or_default(),
        })
    }

    fn list_all(&self) -> Result<Vec<String>, ControlError> {
        let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
        let services = hklm
            .open_subkey(SERVICES_KEY)
            .map_err(|err| ControlError::ManagerUnavailable(err.to_string()))?;
        let mut names = Vec::new();
        for key_name in services.enum_keys().flatten() {
            let Ok(sub) = services.open_subkey(&key_name) else {
                continue;
            };
            // Keep win32 services (own/shared process); skip drivers.
            if let Ok(service_type) = sub.get_value::<u32, _>("Type") {
                if service_type & 0x30 != 0 {
                    names.push(key_name);
                }
            }
        }
        Ok(names)
    }
}

fn service_info(config: &NativeConfig, password: Option<&str>) -> ServiceInfo {
    let (executable, arguments) = cmdline::decompose(&config.binary_path);
    ServiceInfo {
        name: OsString::from(&config.name),
        display_name: OsString::from(&config.display_name),
        service_type: ServiceType::OWN_PROCESS,
        start_type: start_type_from_code(config.start_type),
        error_control: ServiceErrorControl::Normal,
        executable_path: PathBuf::from(executable),
        launch_arguments: arguments.split_whitespace().map(OsString::from).collect(),
        dependencies: deps::decode(&config.dependencies)
            .into_iter()
            .map(|name| ServiceDependency::Service(OsString::from(name)))
            .collect(),
        account_name: if config.username.is_empty() {
            None
        } else {
            Some(OsString::from(&config.username))
        },
        account_password: password.map(OsString::from),
    }
}

fn start_type_from_code(code: u32) -> ServiceStartType {
    match code {
        0 => ServiceStartType::BootStart,
        1 => ServiceStartType::SystemStart,
        2 => ServiceStartType::AutoStart,
        4 => ServiceStartType::Disabled,
        _ => ServiceStartType::OnDemand,
    }
}

fn start_type_code(start_type: ServiceStartType) -> u32 {
    match start_type {
        ServiceStartType::BootStart => 0,
        ServiceStartType::SystemStart => 1,
        ServiceStartType::AutoStart => 2,
        ServiceStartType::OnDemand => 3,
        ServiceStartType::Disabled => 4,
    }
}

fn state_code(state: ScmState) -> u32 {
    match state {
        ScmState::Stopped => 1,
        ScmState::StartPending => 2,
        ScmState::StopPending => 3,
        ScmState::Running => 4,
        ScmState::ContinuePending => 5,
        ScmState::PausePending => 6,
        ScmState::Paused => 7,
    }
}

fn raw_code(err: &windows_service::Error) -> Option<i32> {
    match err {
        windows_service::Error::Winapi(io) => io.raw_os_error(),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Registry parameter store
// ---------------------------------------------------------------------------

/// Parameter store over the per-service registry key.
#[derive(Debug, Default)]
pub struct RegistryParameterStore;

impl RegistryParameterStore {
    pub fn new() -> Self {
        Self
    }

    fn open_namespace(service: &str, writable: bool) -> Result<Option<RegKey>, ParamError> {
        let flags = if writable { KEY_READ | KEY_SET_VALUE } else { KEY_READ };
        let path = format!("{SERVICES_KEY}\\{service}");
        match RegKey::predef(HKEY_LOCAL_MACHINE).open_subkey_with_flags(path, flags) {
            Ok(key) => Ok(Some(key)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(ParamError::StoreFailure {
                service: service.to_string(),
                reason: err.to_string(),
            }),
        }
    }
}

impl ParameterStore for RegistryParameterStore {
    fn get(
        &self,
        service: &str,
        param: &str,
        sub_param: Option<&str>,
    ) -> Result<Option<ParamValue>, ParamError> {
        let Some(key) = Self::open_namespace(service, false)? else {
            return Ok(None);
        };
        let (key, value_name) = match sub_param {
            None => (key, param),
            Some(sub) => match key.open_subkey(param) {
                Ok(group) => (group, sub),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
                Err(err) => {
                    return Err(ParamError::StoreFailure {
                        service: service.to_string(),
                        reason: err.to_string(),
                    })
                }
            },
        };
        match key.get_raw_value(value_name) {
            Ok(raw) => Ok(decode_value(&raw)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(ParamError::StoreFailure {
                service: service.to_string(),
                reason: err.to_string(),
            }),
        }
    }

    fn set(
        &self,
        service: &str,
        param: &str,
        sub_param: Option<&str>,
        value: ParamValue,
    ) -> Result<(), ParamError> {
        let Some(key) = Self::open_namespace(service, true)? else {
            return Err(ParamError::NamespaceUnavailable {
                service: service.to_string(),
            });
        };
        let store_failure = |err: std::io::Error| ParamError::StoreFailure {
            service: service.to_string(),
            reason: err.to_string(),
        };
        let (key, value_name) = match sub_param {
            None => (key, param),
            Some(sub) => {
                let (group, _) = key.create_subkey(param).map_err(store_failure)?;
                (group, sub)
            }
        };
        key.set_raw_value(value_name, &encode_value(&value))
            .map_err(store_failure)
    }

    fn delete(
        &self,
        service: &str,
        param: &str,
        sub_param: Option<&str>,
    ) -> Result<(), ParamError> {
        let Some(key) = Self::open_namespace(service, true)? else {
            return Ok(());
        };
        let (key, value_name) = match sub_param {
            None => (key, param),
            Some(sub) => match key.open_subkey_with_flags(param, KEY_READ | KEY_SET_VALUE) {
                Ok(group) => (group, sub),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
                Err(err) => {
                    return Err(ParamError::StoreFailure {
                        service: service.to_string(),
                        reason: err.to_string(),
                    })
                }
            },
        };
        match key.delete_value(value_name) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(ParamError::StoreFailure {
                service: service.to_string(),
                reason: err.to_string(),
            }),
        }
    }
}

fn decode_value(raw: &RegValue) -> Option<ParamValue> {
    match raw.vtype {
        REG_SZ | REG_EXPAND_SZ => Some(ParamValue::Text(utf16_string(&raw.bytes))),
        REG_MULTI_SZ => Some(ParamValue::MultiText(utf16_string(&raw.bytes))),
        REG_DWORD => {
            let bytes: [u8; 4] = raw.bytes.get(..4)?.try_into().ok()?;
            Some(ParamValue::Number(i64::from(u32::from_le_bytes(bytes))))
        }
        REG_QWORD => {
            let bytes: [u8; 8] = raw.bytes.get(..8)?.try_into().ok()?;
            Some(ParamValue::Number(u64::from_le_bytes(bytes) as i64))
        }
        _ => None,
    }
}

fn encode_value(value: &ParamValue) -> RegValue {
    match value {
        ParamValue::Text(s) => RegValue {
            bytes: utf16_bytes(s, 1),
            vtype: REG_SZ,
        },
        // A multi-string with the whole text as its single entry.
        ParamValue::MultiText(s) => RegValue {
            bytes: utf16_bytes(s, 2),
            vtype: REG_MULTI_SZ,
        },
        ParamValue::Number(n) => {
            if let Ok(dword) = u32::try_from(*n) {
                RegValue {
                    bytes: dword.to_le_bytes().to_vec(),
                    vtype: REG_DWORD,
                }
            } else {
                RegValue {
                    bytes: (*n as u64).to_le_bytes().to_vec(),
                    vtype: REG_QWORD,
                }
            }
        }
    }
}

fn utf16_bytes(s: &str, trailing_nuls: usize) -> Vec<u8> {
    let mut units: Vec<u16> = s.encode_utf16().collect();
    units.extend(std::iter::repeat(0).take(trailing_nuls));
    units.iter().flat_map(|unit| unit.to_le_bytes()).collect()
}

fn utf16_string(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    let end = units
        .iter()
        .rposition(|&unit| unit != 0)
        .map_or(0, |pos| pos + 1);
    String::from_utf16_lossy(&units[..end])
}
