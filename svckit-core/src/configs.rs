//! Per-service descriptor files.
//!
//! # Storage layout
//!
//! ```text
//! ~/.svckit/
//!   configs/
//!     <service_name>.json   (one file per service — mode 0600)
//! ```
//!
//! # API pattern
//!
//! Every function has two forms:
//! - `fn_at(home: &Path, …)` — explicit home; used in tests with `TempDir`
//! - `fn(…)` — derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! Tests must NEVER call the no-arg wrappers; always use `_at`.

use std::path::{Path, PathBuf};

use crate::error::{io_err, ConfigStoreError};
use crate::types::{ServiceDescriptor, ServiceName};

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.svckit/configs/` — creates the directory (mode `0700`) if absent.
pub fn config_dir_at(home: &Path) -> Result<PathBuf, ConfigStoreError> {
    let dir = home.join(".svckit").join("configs");
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;
        set_dir_permissions(&dir)?;
    }
    Ok(dir)
}

/// `<home>/.svckit/configs/<name>.json` — pure, no I/O.
pub fn descriptor_path_at(home: &Path, name: &ServiceName) -> PathBuf {
    home.join(".svckit")
        .join("configs")
        .join(format!("{}.json", name.0))
}

// ---------------------------------------------------------------------------
// Load / save / delete
// ---------------------------------------------------------------------------

/// Load the saved descriptor for `name`.
///
/// Returns `ConfigStoreError::DescriptorNotFound` if absent,
/// `ConfigStoreError::Parse` (with path context) if malformed JSON.
pub fn load_at(home: &Path, name: &ServiceName) -> Result<ServiceDescriptor, ConfigStoreError> {
    let path = descriptor_path_at(home, name);
    if !path.exists() {
        return Err(ConfigStoreError::DescriptorNotFound {
            name: name.0.clone(),
        });
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    serde_json::from_str(&contents).map_err(|e| ConfigStoreError::Parse { path, source: e })
}

/// `load_at` convenience wrapper.
pub fn load(name: &ServiceName) -> Result<ServiceDescriptor, ConfigStoreError> {
    load_at(&home()?, name)
}

/// Atomically save a descriptor to `<home>/.svckit/configs/<name>.json`.
///
/// Write flow: serialize → `.json.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_at(home: &Path, descriptor: &ServiceDescriptor) -> Result<(), ConfigStoreError> {
    config_dir_at(home)?;
    let path = descriptor_path_at(home, &descriptor.name);
    let tmp = path.with_file_name(format!("{}.json.tmp", descriptor.name.0));

    let json = serde_json::to_string_pretty(descriptor)?;
    std::fs::write(&tmp, json).map_err(|e| io_err(&tmp, e))?;
    set_file_permissions(&tmp)?;
    std::fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
    Ok(())
}

/// `save_at` convenience wrapper.
pub fn save(descriptor: &ServiceDescriptor) -> Result<(), ConfigStoreError> {
    save_at(&home()?, descriptor)
}

/// Delete the saved descriptor for `name`. No-op if absent.
pub fn delete_at(home: &Path, name: &ServiceName) -> Result<(), ConfigStoreError> {
    let path = descriptor_path_at(home, name);
    if path.exists() {
        std::fs::remove_file(&path).map_err(|e| io_err(&path, e))?;
    }
    Ok(())
}

/// `delete_at` convenience wrapper.
pub fn delete(name: &ServiceName) -> Result<(), ConfigStoreError> {
    delete_at(&home()?, name)
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// Names of all services with a saved descriptor, sorted.
///
/// File name (minus `.json`) is the service name; files with other
/// extensions are skipped.
pub fn list_managed_names_at(home: &Path) -> Result<Vec<ServiceName>, ConfigStoreError> {
    let dir = home.join(".svckit").join("configs");
    if !dir.exists() {
        return Ok(vec![]);
    }
    let entries = std::fs::read_dir(&dir).map_err(|e| io_err(&dir, e))?;
    let mut names: Vec<ServiceName> = entries
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let path = e.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                path.file_stem()
                    .map(|stem| ServiceName::from(stem.to_string_lossy().into_owned()))
            } else {
                None
            }
        })
        .collect();
    names.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(names)
}

/// `list_managed_names_at` convenience wrapper.
pub fn list_managed_names() -> Result<Vec<ServiceName>, ConfigStoreError> {
    list_managed_names_at(&home()?)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, ConfigStoreError> {
    dirs::home_dir().ok_or(ConfigStoreError::HomeNotFound)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), ConfigStoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
        .map_err(|e| io_err(path, e))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), ConfigStoreError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigStoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigStoreError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_home() -> TempDir {
        TempDir::new().expect("tempdir")
    }

    fn svc() -> ServiceName {
        ServiceName::from("svcA")
    }

    #[test]
    fn descriptor_path_is_correct() {
        let home = make_home();
        let path = descriptor_path_at(home.path(), &svc());
        assert!(path.ends_with(".svckit/configs/svcA.json"));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let home = make_home();
        let mut desc = ServiceDescriptor::new("svcA", r"C:\app\a.exe");
        desc.arguments = "--flag".to_string();
        desc.dependencies = vec!["Tcpip".to_string()];

        save_at(home.path(), &desc).expect("save");
        let loaded = load_at(home.path(), &svc()).expect("load");
        assert_eq!(loaded, desc);
    }

    #[test]
    fn atomic_write_cleans_up_tmp() {
        let home = make_home();
        let desc = ServiceDescriptor::new("svcA", r"C:\app\a.exe");
        save_at(home.path(), &desc).expect("save");
        let tmp = descriptor_path_at(home.path(), &svc()).with_file_name("svcA.json.tmp");
        assert!(!tmp.exists(), ".tmp must be gone after successful save");
    }

    #[test]
    fn load_missing_returns_not_found() {
        let home = make_home();
        let err = load_at(home.path(), &svc()).unwrap_err();
        assert!(matches!(err, ConfigStoreError::DescriptorNotFound { .. }));
    }

    #[test]
    fn delete_is_idempotent() {
        let home = make_home();
        delete_at(home.path(), &svc()).expect("delete of absent file is a no-op");

        let desc = ServiceDescriptor::new("svcA", r"C:\app\a.exe");
        save_at(home.path(), &desc).expect("save");
        delete_at(home.path(), &svc()).expect("delete");
        assert!(matches!(
            load_at(home.path(), &svc()),
            Err(ConfigStoreError::DescriptorNotFound { .. })
        ));
    }

    #[test]
    fn list_managed_names_sorted_and_filtered() {
        let home = make_home();
        for name in ["zeta", "alpha"] {
            let desc = ServiceDescriptor::new(name, r"C:\app\a.exe");
            save_at(home.path(), &desc).expect("save");
        }
        // A stray non-JSON file must not show up as a service.
        std::fs::write(
            home.path().join(".svckit").join("configs").join("notes.txt"),
            "scratch",
        )
        .unwrap();

        let names = list_managed_names_at(home.path()).expect("list");
        let names: Vec<&str> = names.iter().map(|n| n.0.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn list_empty_when_dir_missing() {
        let home = make_home();
        assert!(list_managed_names_at(home.path()).expect("list").is_empty());
    }
}
