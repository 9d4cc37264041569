//! svckit — descriptor-driven service manager for Windows services.
//!
//! # Usage
//!
//! ```text
//! svckit install <name> <executable> [arguments...]
//! svckit edit <name> [--file <descriptor.json>]
//! svckit remove <name> [--yes]
//! svckit start|stop|restart|status|statuscode|rotate <name>
//! svckit list [--all]
//! svckit dump <name> [new-name]
//! svckit get <name> <param> [sub]
//! svckit set [--sub <s>] [--number] <name> <param> <value...>
//! svckit reset <name> <param>
//! svckit unset <name> <param> [sub]
//! svckit export <name> <path>
//! svckit import <path>
//! ```

mod commands;
mod platform;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{
    dump::DumpArgs,
    lifecycle::{NameArg, StatusArgs},
    list::ListArgs,
    params::{GetArgs, ResetArgs, SetArgs, UnsetArgs},
    service::{EditArgs, ExportArgs, ImportArgs, InstallArgs, RemoveArgs},
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "svckit",
    version,
    about = "Manage Windows services and their extended runtime configuration",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Register a new service from an executable and arguments.
    Install(InstallArgs),

    /// Apply a saved or provided descriptor to an existing service.
    Edit(EditArgs),

    /// Uninstall a service (asks for confirmation unless --yes).
    Remove(RemoveArgs),

    /// Start a service.
    Start(NameArg),

    /// Request a service stop (does not wait for the transition).
    Stop(NameArg),

    /// Stop, wait for the stopped state, then start again.
    Restart(NameArg),

    /// Show the current service state.
    Status(StatusArgs),

    /// Print only the raw numeric state code.
    Statuscode(NameArg),

    /// Request one log rotation from the runtime host.
    Rotate(NameArg),

    /// List managed descriptors, or every OS service with --all.
    List(ListArgs),

    /// Print the management commands that would recreate a service.
    Dump(DumpArgs),

    /// Read an extended parameter.
    Get(GetArgs),

    /// Write an extended parameter.
    Set(SetArgs),

    /// Remove a parameter override (there is no stored default to restore).
    Reset(ResetArgs),

    /// Delete a parameter or sub-parameter.
    Unset(UnsetArgs),

    /// Write a saved descriptor to a JSON file.
    Export(ExportArgs),

    /// Install a service from a descriptor JSON file.
    Import(ImportArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("SVCKIT_LOG"))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Install(args) => args.run(),
        Commands::Edit(args) => args.run(),
        Commands::Remove(args) => args.run(),
        Commands::Start(args) => commands::lifecycle::start(args),
        Commands::Stop(args) => commands::lifecycle::stop(args),
        Commands::Restart(args) => commands::lifecycle::restart(args),
        Commands::Status(args) => args.run(),
        Commands::Statuscode(args) => commands::lifecycle::statuscode(args),
        Commands::Rotate(args) => commands::lifecycle::rotate(args),
        Commands::List(args) => args.run(),
        Commands::Dump(args) => args.run(),
        Commands::Get(args) => args.run(),
        Commands::Set(args) => args.run(),
        Commands::Reset(args) => args.run(),
        Commands::Unset(args) => args.run(),
        Commands::Export(args) => args.run(),
        Commands::Import(args) => args.run(),
    }
}
