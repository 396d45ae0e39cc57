/*!
 * Resume Token
 * Completion callback handed to effect starters and join coordinators
 */

use super::Core;
use crate::core::types::Pid;
use crate::process::{ProcessRef, ProcessState, WaitReason};
use crate::task::Task;
use std::fmt;
use std::rc::Rc;
use tracing::trace;

/// One-shot completion callback for a suspended process
///
/// Consuming `self` means a token resumes at most once. A token whose
/// suspension is already over (the process was killed, or resumed by
/// someone else) is ignored.
pub struct Resume<V> {
    core: Rc<Core<V>>,
    process: ProcessRef<V>,
    epoch: u64,
}

impl<V: 'static> Resume<V> {
    pub(crate) fn new(core: Rc<Core<V>>, process: ProcessRef<V>, epoch: u64) -> Self {
        Self {
            core,
            process,
            epoch,
        }
    }

    /// Pid of the suspended process
    pub fn pid(&self) -> Pid {
        self.process.borrow().pid
    }

    /// Check if resuming would still have an effect
    pub fn is_live(&self) -> bool {
        let p = self.process.borrow();
        p.epoch == self.epoch
            && matches!(
                p.state,
                ProcessState::Waiting(WaitReason::Effect) | ProcessState::Waiting(WaitReason::Join)
            )
    }

    /// Replace the suspended process's root with `task` and run it
    pub fn resume(self, task: Task<V>) {
        if !self.is_live() {
            let pid = self.pid();
            self.core.stats.inc_stale_resumes();
            trace!(pid, epoch = self.epoch, "stale resume ignored");
            return;
        }

        let pending = {
            let mut p = self.process.borrow_mut();
            p.epoch += 1;
            p.state = ProcessState::Ready;
            p.root = Some(task);
            p.pending.take()
        };
        drop(pending);

        self.core.enqueue(&self.process);
        self.core.run();
    }

    pub fn succeed(self, value: V) {
        self.resume(Task::Succeed(value));
    }

    pub fn fail(self, error: V) {
        self.resume(Task::Fail(error));
    }
}

impl<V: 'static> fmt::Debug for Resume<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resume")
            .field("pid", &self.pid())
            .field("epoch", &self.epoch)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::Scheduler;
    use crate::task::Cancel;
    use serde_json::{json, Value};
    use std::cell::RefCell;

    fn parked() -> (Scheduler, crate::process::ProcessHandle, Rc<RefCell<Vec<Resume<Value>>>>) {
        let scheduler: Scheduler = Scheduler::new();
        let tokens = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&tokens);
        let handle = scheduler.spawn(Task::binding(move |resume: Resume<Value>| {
            sink.borrow_mut().push(resume);
            Cancel::noop()
        }));
        (scheduler, handle, tokens)
    }

    #[test]
    fn test_resume_completes_process() {
        let (_scheduler, handle, tokens) = parked();
        let token = tokens.borrow_mut().pop().unwrap();
        assert!(token.is_live());
        assert_eq!(token.pid(), handle.pid());

        token.succeed(json!(5));
        assert_eq!(handle.outcome(), Some(Ok(json!(5))));
    }

    #[test]
    fn test_resume_after_kill_is_stale() {
        let (scheduler, handle, tokens) = parked();
        let token = tokens.borrow_mut().pop().unwrap();
        assert!(handle.kill());
        assert!(!token.is_live());

        token.succeed(json!(5));
        assert_eq!(handle.state(), ProcessState::Killed);
        assert_eq!(handle.take_outcome(), None);
        assert_eq!(scheduler.stats().stale_resumes, 1);
    }
}
