/*!
 * Process Handle
 * Public handle for inspecting, messaging and cancelling a process
 */

use super::{Mailbox, ProcessInfo, ProcessRef, ProcessState};
use crate::core::errors::ProcessError;
use crate::core::types::{Outcome, Pid, Value};
use crate::scheduler::Core;
use std::fmt;
use std::rc::Rc;

/// Handle to a process created by [`crate::Scheduler::spawn`]
pub struct ProcessHandle<V = Value> {
    core: Rc<Core<V>>,
    process: ProcessRef<V>,
}

impl<V: 'static> ProcessHandle<V> {
    pub(crate) fn new(core: Rc<Core<V>>, process: ProcessRef<V>) -> Self {
        Self { core, process }
    }

    pub fn pid(&self) -> Pid {
        self.process.borrow().pid
    }

    pub fn state(&self) -> ProcessState {
        self.process.borrow().state
    }

    pub fn is_terminated(&self) -> bool {
        self.state().is_terminal()
    }

    pub fn info(&self) -> ProcessInfo {
        self.process.borrow().info()
    }

    /// The process's message queue
    pub fn mailbox(&self) -> Mailbox<V> {
        self.process.borrow().mailbox.clone()
    }

    /// Append a message without stepping anything
    pub fn deliver(&self, message: V) -> Result<(), ProcessError> {
        let p = self.process.borrow();
        if p.state.is_terminal() {
            return Err(ProcessError::Terminated(p.pid));
        }
        p.mailbox.push(message);
        Ok(())
    }

    /// Re-run the process (and join members sharing its mailbox) if blocked on `Receive`
    pub fn wake(&self) {
        self.core.wake(&self.process);
    }

    /// Deliver a message and wake its readers
    pub fn post(&self, message: V) -> Result<(), ProcessError> {
        self.deliver(message)?;
        self.wake();
        Ok(())
    }

    /// Cancel the process and anything it is suspended on
    ///
    /// Returns `false` if it had already terminated.
    pub fn kill(&self) -> bool {
        self.core.kill(&self.process)
    }

    /// Take the terminal result of a completed or failed process
    pub fn take_outcome(&self) -> Option<Outcome<V>> {
        self.process.borrow_mut().outcome.take()
    }
}

impl<V: Clone + 'static> ProcessHandle<V> {
    /// Terminal result of a completed or failed process
    pub fn outcome(&self) -> Option<Outcome<V>> {
        self.process.borrow().outcome.clone()
    }
}

impl<V> Clone for ProcessHandle<V> {
    fn clone(&self) -> Self {
        Self {
            core: Rc::clone(&self.core),
            process: Rc::clone(&self.process),
        }
    }
}

impl<V> fmt::Debug for ProcessHandle<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.process.try_borrow() {
            Ok(p) => f
                .debug_struct("ProcessHandle")
                .field("pid", &p.pid)
                .field("state", &p.state)
                .finish(),
            Err(_) => f.write_str("ProcessHandle { <running> }"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::errors::ProcessError;
    use crate::process::{ProcessState, WaitReason};
    use crate::scheduler::Scheduler;
    use crate::task::Task;
    use serde_json::json;

    #[test]
    fn test_deliver_does_not_step() {
        let scheduler: Scheduler = Scheduler::new();
        let handle = scheduler.spawn(Task::receive(Task::succeed));

        handle.deliver(json!("hi")).unwrap();
        assert_eq!(handle.state(), ProcessState::Waiting(WaitReason::Message));
        assert_eq!(handle.info().mailbox_len, 1);

        handle.wake();
        assert_eq!(handle.outcome(), Some(Ok(json!("hi"))));
    }

    #[test]
    fn test_deliver_to_terminated_process() {
        let scheduler: Scheduler = Scheduler::new();
        let handle = scheduler.spawn(Task::succeed(json!(1)));
        assert_eq!(
            handle.deliver(json!(2)),
            Err(ProcessError::Terminated(handle.pid()))
        );
    }

    #[test]
    fn test_kill_is_idempotent() {
        let scheduler: Scheduler = Scheduler::new();
        let handle = scheduler.spawn(Task::receive(Task::succeed));
        assert!(handle.kill());
        assert!(!handle.kill());
        assert!(handle.is_terminated());
    }

    #[test]
    fn test_take_outcome_moves_result() {
        let scheduler: Scheduler = Scheduler::new();
        let handle = scheduler.spawn(Task::fail(json!("bad")));
        assert_eq!(handle.take_outcome(), Some(Err(json!("bad"))));
        assert_eq!(handle.take_outcome(), None);
    }
}
