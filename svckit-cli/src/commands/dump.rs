//! `svckit dump <name> [new-name]` — recreate a service as commands.

use anyhow::{Context, Result};
use clap::Args;

use svckit_core::{configs, ServiceName};
use svckit_engine::dump;

/// Arguments for `svckit dump`.
#[derive(Args, Debug)]
pub struct DumpArgs {
    /// Service name.
    pub name: String,

    /// Emit the commands under this name instead (clone a service).
    pub new_name: Option<String>,
}

impl DumpArgs {
    pub fn run(self) -> Result<()> {
        let descriptor = configs::load(&ServiceName::from(self.name.as_str()))
            .with_context(|| format!("no saved descriptor for service '{}'", self.name))?;
        print!("{}", dump::dump(&descriptor, self.new_name.as_deref()));
        Ok(())
    }
}
