//! `svckit get / set / reset / unset` — extended parameter access.

use anyhow::{Context, Result};
use clap::Args;

use svckit_engine::ParamValue;

use crate::platform;

/// Read an extended parameter.
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Service name.
    pub name: String,

    /// Parameter name (e.g. AppDirectory, AppPriority).
    pub param: String,

    /// Sub-parameter, e.g. an exit code under AppExit.
    pub sub: Option<String>,
}

impl GetArgs {
    pub fn run(self) -> Result<()> {
        let engine = platform::engine()?;
        let value = engine
            .get_parameter(&self.name, &self.param, self.sub.as_deref())
            .with_context(|| format!("failed to read {} for '{}'", self.param, self.name))?;
        match value {
            Some(value) => println!("{value}"),
            None => println!("(not set)"),
        }
        Ok(())
    }
}

/// Write an extended parameter.
#[derive(Args, Debug)]
pub struct SetArgs {
    /// Service name.
    pub name: String,

    /// Parameter name.
    pub param: String,

    /// Value; multiple words are joined with spaces.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
    pub value: Vec<String>,

    /// Sub-parameter, e.g. an exit code under AppExit.
    #[arg(long)]
    pub sub: Option<String>,

    /// Store the value as a number instead of text.
    #[arg(long)]
    pub number: bool,
}

impl SetArgs {
    pub fn run(self) -> Result<()> {
        let text = self.value.join(" ");
        let value = if self.number {
            let number: i64 = text
                .parse()
                .with_context(|| format!("'{text}' is not a number"))?;
            ParamValue::Number(number)
        } else {
            ParamValue::Text(text)
        };

        let engine = platform::engine()?;
        engine
            .set_parameter(&self.name, &self.param, self.sub.as_deref(), value)
            .with_context(|| format!("failed to write {} for '{}'", self.param, self.name))?;
        println!("✓ {} set for service '{}'", self.param, self.name);
        Ok(())
    }
}

/// Remove a parameter override. The runtime host falls back to its
/// built-in default; there is no stored default value to restore.
#[derive(Args, Debug)]
pub struct ResetArgs {
    /// Service name.
    pub name: String,

    /// Parameter name.
    pub param: String,
}

impl ResetArgs {
    pub fn run(self) -> Result<()> {
        let engine = platform::engine()?;
        engine
            .remove_override(&self.name, &self.param)
            .with_context(|| format!("failed to reset {} for '{}'", self.param, self.name))?;
        println!("✓ {} reset for service '{}'", self.param, self.name);
        Ok(())
    }
}

/// Delete a parameter or sub-parameter.
#[derive(Args, Debug)]
pub struct UnsetArgs {
    /// Service name.
    pub name: String,

    /// Parameter name.
    pub param: String,

    /// Sub-parameter, e.g. an exit code under AppExit.
    pub sub: Option<String>,
}

impl UnsetArgs {
    pub fn run(self) -> Result<()> {
        let engine = platform::engine()?;
        engine
            .delete_parameter(&self.name, &self.param, self.sub.as_deref())
            .with_context(|| format!("failed to unset {} for '{}'", self.param, self.name))?;
        println!("✓ {} unset for service '{}'", self.param, self.name);
        Ok(())
    }
}
