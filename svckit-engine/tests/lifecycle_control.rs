//! Start/stop/status/restart behavior against the in-memory system.

use std::time::Duration;

use svckit_core::types::{ServiceDescriptor, ServiceState};
use svckit_engine::{
    ControlError, EngineError, MemoryParameterStore, MemoryServiceControl, MemorySystem,
    ServiceEngine,
};

fn installed_engine(
    system: &MemorySystem,
) -> ServiceEngine<MemoryServiceControl, MemoryParameterStore> {
    let engine = ServiceEngine::new(system.control(), system.params());
    engine
        .install(&ServiceDescriptor::new("svcA", r"C:\app\a.exe"))
        .expect("install");
    engine
}

#[test]
fn start_stop_status_flow() {
    let system = MemorySystem::new();
    let engine = installed_engine(&system);

    assert_eq!(
        engine.query_status("svcA").unwrap(),
        (ServiceState::Stopped, 1)
    );
    engine.start("svcA").expect("start");
    assert_eq!(
        engine.query_status("svcA").unwrap(),
        (ServiceState::Running, 4)
    );
    engine.stop("svcA").expect("stop");
    assert_eq!(
        engine.query_status("svcA").unwrap(),
        (ServiceState::Stopped, 1)
    );
}

#[test]
fn stop_returns_before_the_transition_completes() {
    let system = MemorySystem::new();
    let engine = installed_engine(&system);
    engine.start("svcA").expect("start");

    system.set_stop_latency(3);
    engine.stop("svcA").expect("stop accepted");
    // The request was accepted but the service is still stopping.
    assert_eq!(
        engine.query_status("svcA").unwrap(),
        (ServiceState::StopPending, 3)
    );
}

#[test]
fn restart_waits_for_stopped_before_starting() {
    let system = MemorySystem::new();
    let engine = installed_engine(&system);
    engine.start("svcA").expect("start");

    system.set_stop_latency(2);
    engine
        .restart("svcA", Duration::from_secs(1), Duration::ZERO)
        .expect("restart");
    assert_eq!(
        engine.query_status("svcA").unwrap(),
        (ServiceState::Running, 4)
    );
}

#[test]
fn restart_times_out_when_the_service_never_stops() {
    let system = MemorySystem::new();
    let engine = installed_engine(&system);
    engine.start("svcA").expect("start");

    system.set_stop_latency(u32::MAX);
    let err = engine
        .restart("svcA", Duration::from_millis(20), Duration::from_millis(1))
        .unwrap_err();
    assert!(matches!(err, EngineError::StopTimeout { .. }));
}

#[test]
fn restart_of_a_stopped_service_just_starts_it() {
    let system = MemorySystem::new();
    let engine = installed_engine(&system);

    engine
        .restart("svcA", Duration::from_secs(1), Duration::ZERO)
        .expect("restart from stopped");
    assert_eq!(
        engine.query_status("svcA").unwrap(),
        (ServiceState::Running, 4)
    );
}

#[test]
fn stopping_a_stopped_service_reports_not_running() {
    let system = MemorySystem::new();
    let engine = installed_engine(&system);

    let err = engine.stop("svcA").unwrap_err();
    assert!(matches!(
        err,
        EngineError::Control(ControlError::NotRunning { .. })
    ));
}

#[test]
fn restart_propagates_a_rejected_stop_instead_of_timing_out() {
    let system = MemorySystem::new();
    let engine = installed_engine(&system);
    engine.start("svcA").expect("start");

    system.set_stop_rejected(true);
    let err = engine
        .restart("svcA", Duration::from_secs(1), Duration::ZERO)
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Control(ControlError::StopFailed { .. })
    ));
    // The service was left running, untouched.
    system.set_stop_rejected(false);
    assert_eq!(
        engine.query_status("svcA").unwrap(),
        (ServiceState::Running, 4)
    );
}

#[test]
fn list_all_reports_every_native_service() {
    let system = MemorySystem::new();
    let engine = installed_engine(&system);
    engine
        .install(&ServiceDescriptor::new("other", r"C:\other\b.exe"))
        .expect("install second");

    assert_eq!(engine.list_all().unwrap(), vec!["other", "svcA"]);
}
