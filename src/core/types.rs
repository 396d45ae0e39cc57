/*!
 * Core Types
 * Common types used across the scheduler
 */

/// Process ID type
pub type Pid = u32;

/// Default value carried by tasks, failures and messages
pub use serde_json::Value;

/// Terminal result of a process: `Ok` for `Succeed`, `Err` for `Fail`
pub type Outcome<V = Value> = Result<V, V>;

/// Common result type for scheduler API operations
pub type KernelResult<T> = Result<T, super::errors::KernelError>;
