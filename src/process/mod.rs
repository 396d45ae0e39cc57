/*!
 * Process Module
 * The unit of scheduling: pid, root task, continuation stack and mailbox
 */

mod handle;
mod mailbox;
mod stack;
pub mod types;

pub use handle::ProcessHandle;
pub use mailbox::Mailbox;
pub use types::{ProcessInfo, ProcessState, WaitReason};

pub(crate) use stack::{Expect, Stack};

use crate::core::types::{Outcome, Pid};
use crate::task::{Cancel, Task};
use std::cell::RefCell;
use std::rc::Rc;

/// Shared reference to a process; only the scheduler mutates through it
pub(crate) type ProcessRef<V> = Rc<RefCell<Process<V>>>;

/// Receives a process's outcome in place of storing it
pub(crate) type ExitHook<V> = Box<dyn FnOnce(Outcome<V>)>;

pub(crate) struct Process<V> {
    pub pid: Pid,
    pub root: Option<Task<V>>,
    pub stack: Stack<V>,
    pub mailbox: Mailbox<V>,
    pub state: ProcessState,
    /// Bumped on every resumption so stale completion callbacks are ignored
    pub epoch: u64,
    /// Cancellation for the current suspension (binding or join)
    pub pending: Option<Cancel>,
    pub on_exit: Option<ExitHook<V>>,
    pub outcome: Option<Outcome<V>>,
    /// Already sitting in the run queue
    pub queued: bool,
    /// Registered as a reader on the mailbox's waiter list
    pub awaiting_mail: bool,
}

impl<V> Process<V> {
    pub fn new(pid: Pid, root: Task<V>, mailbox: Mailbox<V>) -> Self {
        Self {
            pid,
            root: Some(root),
            stack: Stack::new(),
            mailbox,
            state: ProcessState::Ready,
            epoch: 0,
            pending: None,
            on_exit: None,
            outcome: None,
            queued: false,
            awaiting_mail: false,
        }
    }

    pub fn info(&self) -> ProcessInfo {
        ProcessInfo {
            pid: self.pid,
            state: self.state,
            mailbox_len: self.mailbox.len(),
            stack_depth: self.stack.depth(),
        }
    }
}
