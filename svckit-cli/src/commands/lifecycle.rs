//! `svckit start / stop / restart / status / statuscode / rotate`.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use svckit_core::ServiceState;

use crate::platform;

/// How long `restart` waits for the stopped state before giving up.
const RESTART_TIMEOUT: Duration = Duration::from_secs(10);
const RESTART_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// A bare service-name argument, shared by the single-service commands.
#[derive(Args, Debug)]
pub struct NameArg {
    /// Service name.
    pub name: String,
}

pub fn start(args: NameArg) -> Result<()> {
    let engine = platform::engine()?;
    engine
        .start(&args.name)
        .with_context(|| format!("failed to start service '{}'", args.name))?;
    println!("✓ Service '{}' started", args.name);
    Ok(())
}

pub fn stop(args: NameArg) -> Result<()> {
    let engine = platform::engine()?;
    engine
        .stop(&args.name)
        .with_context(|| format!("failed to stop service '{}'", args.name))?;
    println!("✓ Stop requested for service '{}'", args.name);
    Ok(())
}

pub fn restart(args: NameArg) -> Result<()> {
    let engine = platform::engine()?;
    engine
        .restart(&args.name, RESTART_TIMEOUT, RESTART_POLL_INTERVAL)
        .with_context(|| format!("failed to restart service '{}'", args.name))?;
    println!("✓ Service '{}' restarted", args.name);
    Ok(())
}

pub fn statuscode(args: NameArg) -> Result<()> {
    let engine = platform::engine()?;
    let (_, code) = engine
        .query_status(&args.name)
        .with_context(|| format!("failed to query service '{}'", args.name))?;
    println!("{code}");
    Ok(())
}

pub fn rotate(args: NameArg) -> Result<()> {
    let engine = platform::engine()?;
    engine
        .trigger_log_rotate(&args.name)
        .with_context(|| format!("failed to request rotation for service '{}'", args.name))?;
    println!("✓ Log rotation requested for service '{}'", args.name);
    Ok(())
}

/// Arguments for `svckit status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Service name.
    pub name: String,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct StatusJson {
    name: String,
    state: String,
    code: u32,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let engine = platform::engine()?;
        let (state, code) = engine
            .query_status(&self.name)
            .with_context(|| format!("failed to query service '{}'", self.name))?;

        if self.json {
            let report = StatusJson {
                name: self.name,
                state: state.to_string(),
                code,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        println!("{}: {}", self.name, colorize_state(state));
        Ok(())
    }
}

fn colorize_state(state: ServiceState) -> String {
    let text = state.to_string();
    match state {
        ServiceState::Running => text.green().to_string(),
        ServiceState::Stopped => text.red().to_string(),
        ServiceState::Unknown(_) => text.bright_red().to_string(),
        // The four transitional states.
        _ => text.yellow().to_string(),
    }
}
