/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 *
 * Task failures never show up here: they travel through the task's own
 * failure channel. These types cover misuse of the scheduler API and
 * infrastructure problems (configuration, cross-thread marshaling).
 */

use super::types::Pid;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Process-related errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ProcessError {
    #[error("Process {0} has terminated")]
    #[diagnostic(
        code(process::terminated),
        help("The process completed, failed or was killed. Messages can no longer be delivered.")
    )]
    Terminated(Pid),
}

/// Configuration errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    #[diagnostic(
        code(config::parse_failed),
        help("Configuration must be a JSON object with snake_case keys.")
    )]
    Parse(String),

    #[error("Invalid value {value:?} for {key}")]
    #[diagnostic(
        code(config::invalid_value),
        help("Check the accepted values for this setting.")
    )]
    InvalidValue { key: String, value: String },
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

/// Cross-thread completion bridge errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum BridgeError {
    #[error("Bridge disconnected")]
    #[diagnostic(
        code(bridge::disconnected),
        help("The scheduler-side bridge was dropped before the completion arrived.")
    )]
    Disconnected,

    #[error("Timed out after {0}ms waiting for a completion")]
    #[diagnostic(
        code(bridge::timeout),
        help("No worker thread reported back in time. Check that workers call complete().")
    )]
    Timeout(u64),
}

/// Unified kernel error type with miette diagnostics
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum KernelError {
    #[error("Process error: {0}")]
    #[diagnostic(transparent)]
    Process(#[from] ProcessError),

    #[error("Configuration error: {0}")]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("Bridge error: {0}")]
    #[diagnostic(transparent)]
    Bridge(#[from] BridgeError),
}
