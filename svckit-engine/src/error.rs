//! Error surface for the translation & control engine.

use thiserror::Error;

use crate::control::ControlError;
use crate::params::ParamError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Control(#[from] ControlError),

    #[error(transparent)]
    Params(#[from] ParamError),

    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),

    /// Restart gave up waiting for the stop transition to complete.
    #[error("service '{name}' did not reach the stopped state within {timeout_ms} ms")]
    StopTimeout { name: String, timeout_ms: u64 },
}
