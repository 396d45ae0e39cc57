/*!
 * Log Effect
 * Emits a structured tracing event from inside a task
 */

use crate::scheduler::Resume;
use crate::task::{Cancel, Task};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, trace, warn};

/// Severity for [`log`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Emit `message` tagged with the running process's pid, then succeed with `V::default()`
pub fn log<V>(level: LogLevel, message: impl Into<String>) -> Task<V>
where
    V: Default + 'static,
{
    let message = message.into();
    Task::binding(move |resume: Resume<V>| {
        let pid = resume.pid();
        match level {
            LogLevel::Trace => trace!(target: "coop_kernel::task", pid, "{}", message),
            LogLevel::Debug => debug!(target: "coop_kernel::task", pid, "{}", message),
            LogLevel::Info => info!(target: "coop_kernel::task", pid, "{}", message),
            LogLevel::Warn => warn!(target: "coop_kernel::task", pid, "{}", message),
            LogLevel::Error => error!(target: "coop_kernel::task", pid, "{}", message),
        }
        resume.succeed(V::default());
        Cancel::noop()
    })
}
