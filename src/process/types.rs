/*!
 * Process Types
 * Common types for process state and inspection
 */

use crate::core::types::Pid;
use serde::{Deserialize, Serialize};

/// Why a suspended process is not runnable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitReason {
    /// Pending `Binding` awaiting its completion callback
    Effect,
    /// `Receive` against an empty mailbox
    Message,
    /// `Batch` awaiting its members
    Join,
}

/// Process state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// Root task is ready for reduction
    Ready,
    /// Being stepped right now
    Running,
    /// Suspended at one of the three suspension points
    Waiting(WaitReason),
    /// Finished with `Succeed`
    Completed,
    /// Finished with `Fail` and no handler left on the stack
    Failed,
    /// Cancelled before finishing
    Killed,
}

impl ProcessState {
    /// Check if the process can never run again
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProcessState::Completed | ProcessState::Failed | ProcessState::Killed
        )
    }

    /// Check if a step may make progress from this state
    pub(crate) fn is_steppable(&self) -> bool {
        matches!(
            self,
            ProcessState::Ready | ProcessState::Waiting(WaitReason::Message)
        )
    }
}

/// Point-in-time snapshot of a process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProcessInfo {
    pub pid: Pid,
    pub state: ProcessState,
    pub mailbox_len: usize,
    pub stack_depth: usize,
}
