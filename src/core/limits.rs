/*!
 * Scheduler Limits and Constants
 *
 * Centralized location for defaults and thresholds used by the runtime.
 */

use super::types::Pid;

// =============================================================================
// PROCESS IDS
// =============================================================================

/// First pid handed out by a fresh scheduler
pub const DEFAULT_FIRST_PID: Pid = 1;

// =============================================================================
// RUN QUEUE & JOINS
// =============================================================================

/// Initial run queue capacity
/// [PERF] Sized for a handful of concurrently runnable processes
pub const RUN_QUEUE_INITIAL_CAPACITY: usize = 64;

/// Join member count above which spawning is logged at debug level
pub const LARGE_JOIN_THRESHOLD: usize = 10_000;

/// Smallest mailbox waiter list that triggers a sweep of dropped readers
pub const WAITER_PRUNE_MIN: usize = 32;

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// Mailbox sharing policy for join members (`shared` | `isolated`)
pub const ENV_JOIN_MAILBOX: &str = "COOP_JOIN_MAILBOX";

/// Per-reduction tracing toggle (`1` | `true`)
pub const ENV_TRACE_REDUCTIONS: &str = "COOP_TRACE_REDUCTIONS";

/// Override for the first pid
pub const ENV_FIRST_PID: &str = "COOP_FIRST_PID";

/// JSON log output toggle (`1` | `true`)
pub const ENV_TRACE_JSON: &str = "COOP_TRACE_JSON";
