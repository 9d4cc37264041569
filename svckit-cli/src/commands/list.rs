//! `svckit list` — managed descriptors, or every OS service with --all.

use anyhow::{Context, Result};
use clap::Args;
use tabled::{settings::Style, Table, Tabled};

use svckit_core::configs;

use crate::platform;

/// Arguments for `svckit list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// List every service the OS knows about, not just managed ones.
    #[arg(long)]
    pub all: bool,
}

#[derive(Tabled)]
struct ManagedRow {
    #[tabled(rename = "SERVICE")]
    name: String,
    #[tabled(rename = "STARTUP")]
    startup: String,
    #[tabled(rename = "EXECUTABLE")]
    executable: String,
}

impl ListArgs {
    pub fn run(self) -> Result<()> {
        if self.all {
            let engine = platform::engine()?;
            for name in engine.list_all().context("failed to enumerate services")? {
                println!("{name}");
            }
            return Ok(());
        }

        let names = configs::list_managed_names().context("failed to list saved descriptors")?;
        if names.is_empty() {
            println!("No managed services.");
            return Ok(());
        }

        let mut rows = Vec::with_capacity(names.len());
        for name in &names {
            let descriptor = configs::load(name)
                .with_context(|| format!("failed to load descriptor for '{name}'"))?;
            rows.push(ManagedRow {
                name: descriptor.name.0,
                startup: descriptor.startup_type.to_string(),
                executable: descriptor.executable_path,
            });
        }

        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}
