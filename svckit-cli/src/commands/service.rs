//! `svckit install / edit / remove / export / import` — service registration.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use svckit_core::{configs, ServiceDescriptor, ServiceName};
use svckit_engine::InstallReport;

use crate::platform;

/// Register a new service.
#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Service name (also the parameter namespace key).
    pub name: String,

    /// Path to the service executable.
    pub executable: String,

    /// Arguments passed to the executable, verbatim.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub arguments: Vec<String>,

    /// Display name shown by the OS (defaults to the service name).
    #[arg(long)]
    pub display_name: Option<String>,

    /// Service description.
    #[arg(long)]
    pub description: Option<String>,
}

impl InstallArgs {
    pub fn run(self) -> Result<()> {
        let descriptor = self.into_descriptor();
        install_descriptor(&descriptor)
    }

    fn into_descriptor(self) -> ServiceDescriptor {
        let mut descriptor = ServiceDescriptor::new(self.name.as_str(), self.executable);
        descriptor.arguments = self.arguments.join(" ");
        if let Some(display_name) = self.display_name {
            descriptor.display_name = display_name;
        }
        if let Some(description) = self.description {
            descriptor.description = description;
        }
        descriptor
    }
}

/// Apply a descriptor to an already-installed service.
#[derive(Args, Debug)]
pub struct EditArgs {
    /// Service name.
    pub name: String,

    /// Read the descriptor from this JSON file instead of the saved one.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

impl EditArgs {
    pub fn run(self) -> Result<()> {
        let engine = platform::engine()?;
        let descriptor = match self.file {
            Some(path) => {
                let descriptor = read_descriptor_file(&path)?;
                if descriptor.name.0 != self.name {
                    bail!(
                        "descriptor in '{}' is for service '{}', not '{}'",
                        path.display(),
                        descriptor.name,
                        self.name
                    );
                }
                descriptor
            }
            // No file: prefer the saved descriptor, fall back to reading
            // the service back from the OS.
            None => match configs::load(&ServiceName::from(self.name.as_str())) {
                Ok(descriptor) => descriptor,
                Err(svckit_core::ConfigStoreError::DescriptorNotFound { .. }) => engine
                    .read(&self.name)
                    .with_context(|| format!("cannot read service '{}' back", self.name))?,
                Err(err) => return Err(err.into()),
            },
        };

        engine
            .edit(&descriptor)
            .with_context(|| format!("failed to edit service '{}'", self.name))?;
        configs::save(&descriptor).context("failed to save descriptor")?;
        println!("✓ Service '{}' updated", self.name);
        Ok(())
    }
}

/// Uninstall a service.
#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Service name.
    pub name: String,

    /// Skip the confirmation prompt.
    #[arg(long)]
    pub yes: bool,
}

impl RemoveArgs {
    pub fn run(self) -> Result<()> {
        if !self.yes && !confirm(&format!("Really uninstall service '{}'?", self.name))? {
            println!("Aborted.");
            return Ok(());
        }

        let engine = platform::engine()?;
        engine
            .uninstall(&self.name)
            .with_context(|| format!("failed to uninstall service '{}'", self.name))?;
        configs::delete(&ServiceName::from(self.name.as_str()))
            .context("failed to remove saved descriptor")?;
        println!("✓ Service '{}' removed", self.name);
        Ok(())
    }
}

/// Write a saved descriptor to a JSON file.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Service name.
    pub name: String,

    /// Destination file.
    pub path: PathBuf,
}

impl ExportArgs {
    pub fn run(self) -> Result<()> {
        let descriptor = configs::load(&ServiceName::from(self.name.as_str()))
            .with_context(|| format!("no saved descriptor for service '{}'", self.name))?;
        let json =
            serde_json::to_string_pretty(&descriptor).context("failed to serialize descriptor")?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write '{}'", self.path.display()))?;
        println!("✓ Exported '{}' to {}", self.name, self.path.display());
        Ok(())
    }
}

/// Install a service from a descriptor JSON file.
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Descriptor JSON file.
    pub path: PathBuf,
}

impl ImportArgs {
    pub fn run(self) -> Result<()> {
        let descriptor = read_descriptor_file(&self.path)?;
        install_descriptor(&descriptor)
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn install_descriptor(descriptor: &ServiceDescriptor) -> Result<()> {
    let engine = platform::engine()?;
    let report = engine
        .install(descriptor)
        .with_context(|| format!("failed to install service '{}'", descriptor.name))?;
    configs::save(descriptor).context("failed to save descriptor")?;

    print_install_report(&descriptor.name.0, &report);
    Ok(())
}

fn print_install_report(name: &str, report: &InstallReport) {
    if report.fully_applied() {
        println!("✓ Service '{name}' installed");
        return;
    }
    println!("✓ Service '{name}' installed, with warnings:");
    for write in &report.failed_writes {
        println!(
            "  {} could not write {}: {}",
            "warning:".yellow(),
            write.param,
            write.error
        );
    }
}

fn read_descriptor_file(path: &PathBuf) -> Result<ServiceDescriptor> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("'{}' is not a valid descriptor", path.display()))
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush().context("failed to flush stdout")?;
    let mut answer = String::new();
    io::stdin()
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_args_build_a_descriptor() {
        let args = InstallArgs {
            name: "svcA".to_string(),
            executable: r"C:\app\a.exe".to_string(),
            arguments: vec!["--flag".to_string(), "-v".to_string()],
            display_name: Some("Service A".to_string()),
            description: None,
        };

        let descriptor = args.into_descriptor();
        assert_eq!(descriptor.name.0, "svcA");
        assert_eq!(descriptor.executable_path, r"C:\app\a.exe");
        assert_eq!(descriptor.arguments, "--flag -v");
        assert_eq!(descriptor.display_name, "Service A");
        assert_eq!(descriptor.description, "");
    }
}
