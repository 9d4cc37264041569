//! CLI behavior for the commands that only touch saved descriptors.
//!
//! Everything here runs against a throwaway HOME so the real
//! `~/.svckit` is never touched, and none of it needs a live service
//! manager.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use svckit_core::{configs, ServiceDescriptor};

fn svckit(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("svckit").expect("binary builds");
    cmd.env("HOME", home.path());
    cmd
}

fn saved_descriptor(home: &TempDir) -> ServiceDescriptor {
    let mut desc = ServiceDescriptor::new("svcA", r"C:\app\a.exe");
    desc.arguments = "--flag".to_string();
    desc.working_directory = r"C:\app".to_string();
    configs::save_at(home.path(), &desc).expect("save descriptor");
    desc
}

#[test]
fn list_with_no_descriptors_says_so() {
    let home = TempDir::new().expect("tempdir");
    svckit(&home)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No managed services."));
}

#[test]
fn list_shows_saved_descriptors_in_a_table() {
    let home = TempDir::new().expect("tempdir");
    saved_descriptor(&home);

    svckit(&home)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("svcA"))
        .stdout(predicate::str::contains(r"C:\app\a.exe"))
        .stdout(predicate::str::contains("manual"));
}

#[test]
fn dump_renders_the_recreation_commands() {
    let home = TempDir::new().expect("tempdir");
    saved_descriptor(&home);

    svckit(&home)
        .args(["dump", "svcA"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"svckit install svcA "C:\app\a.exe" --flag"#,
        ))
        .stdout(predicate::str::contains(
            r#"svckit set svcA WorkingDirectory "C:\app""#,
        ));
}

#[test]
fn dump_with_new_name_clones_the_service() {
    let home = TempDir::new().expect("tempdir");
    saved_descriptor(&home);

    svckit(&home)
        .args(["dump", "svcA", "svcB"])
        .assert()
        .success()
        .stdout(predicate::str::contains("svckit install svcB"))
        .stdout(predicate::str::contains("svcA").not());
}

#[test]
fn dump_of_unknown_service_fails_with_context() {
    let home = TempDir::new().expect("tempdir");
    svckit(&home)
        .args(["dump", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no saved descriptor"));
}

#[test]
fn export_roundtrips_through_json() {
    let home = TempDir::new().expect("tempdir");
    let desc = saved_descriptor(&home);
    let out = home.path().join("svcA.json");

    svckit(&home)
        .args(["export", "svcA"])
        .arg(&out)
        .assert()
        .success();

    let json = std::fs::read_to_string(&out).expect("exported file");
    let back: ServiceDescriptor = serde_json::from_str(&json).expect("valid descriptor JSON");
    assert_eq!(back, desc);
}

#[cfg(not(windows))]
#[test]
fn native_commands_explain_the_platform_requirement() {
    let home = TempDir::new().expect("tempdir");
    for subcommand in ["start", "stop", "restart", "status", "statuscode", "rotate"] {
        svckit(&home)
            .args([subcommand, "svcA"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("requires Windows"));
    }
}
