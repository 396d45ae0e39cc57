/*!
 * Coop Kernel Library
 * Cooperative task scheduler with a composable task algebra
 *
 * A `Task` describes work: pure values, sequencing, error recovery,
 * external effects, mailbox receives and parallel joins. A `Scheduler`
 * turns tasks into processes and reduces them one step at a time on the
 * calling thread.
 */

pub mod core;
pub mod effects;
pub mod monitoring;
pub mod process;
pub mod scheduler;
pub mod task;

// Re-exports
pub use crate::core::errors::{BridgeError, ConfigError, KernelError, ProcessError};
pub use crate::core::types::{KernelResult, Outcome, Pid, Value};
pub use effects::{Bridge, Completer, Effect, LogLevel, Timers};
pub use monitoring::{init_tracing, try_init_tracing};
pub use process::{Mailbox, ProcessHandle, ProcessInfo, ProcessState, WaitReason};
pub use scheduler::{
    MailboxSharing, Resume, Scheduler, SchedulerBuilder, SchedulerConfig, SchedulerStats,
};
pub use task::{batch, fork, map2, sequence, Cancel, Task};
