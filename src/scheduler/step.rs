/*!
 * Step Engine
 * Iterative reduction loop that drives one process to completion or suspension
 *
 * No `RefCell` borrow of the process is held while user code runs
 * (continuations, effect starters, combiners), so that code may kill,
 * wake or resume any process, including the one being stepped.
 */

use super::{Core, Resume};
use crate::core::types::Pid;
use crate::monitoring::process_span;
use crate::process::{Expect, ProcessRef, ProcessState, WaitReason};
use crate::task::{Continuation, Start, Task};
use std::rc::Rc;
use tracing::trace;

impl<V: 'static> Core<V> {
    /// Reduce the process's root until it finishes or suspends
    pub(crate) fn step(self: &Rc<Self>, process: &ProcessRef<V>) {
        let pid = {
            let mut p = process.borrow_mut();
            if !p.state.is_steppable() {
                return;
            }
            p.state = ProcessState::Running;
            p.pid
        };
        let _span = process_span(pid).entered();

        loop {
            let task = {
                let mut p = process.borrow_mut();
                if p.state != ProcessState::Running {
                    return;
                }
                match p.root.take() {
                    Some(task) => task,
                    None => return,
                }
            };

            self.stats.inc_reductions();
            if self.config.trace_reductions {
                trace!(pid, kind = task.kind(), "reduce");
            }

            let next = match task {
                Task::Succeed(value) => {
                    let continuation = process.borrow_mut().stack.unwind(Expect::Success);
                    match continuation {
                        Some(k) => k(value),
                        None => {
                            self.finish(process, Ok(value));
                            return;
                        }
                    }
                }
                Task::Fail(error) => {
                    let continuation = process.borrow_mut().stack.unwind(Expect::Failure);
                    match continuation {
                        Some(k) => k(error),
                        None => {
                            self.finish(process, Err(error));
                            return;
                        }
                    }
                }
                Task::AndThen(inner, k) => {
                    process.borrow_mut().stack.push(Expect::Success, k);
                    inner.into_inner()
                }
                Task::OnError(inner, k) => {
                    process.borrow_mut().stack.push(Expect::Failure, k);
                    inner.into_inner()
                }
                Task::Receive(k) => {
                    let message = process.borrow().mailbox.pop();
                    match message {
                        Some(message) => k(message),
                        None => {
                            self.block_on_mailbox(process, pid, k);
                            return;
                        }
                    }
                }
                Task::Binding(start) => {
                    self.suspend_on_effect(process, pid, start);
                    return;
                }
                Task::Batch(tasks, combine) => {
                    if tasks.is_empty() {
                        Task::Succeed(combine(Vec::new()))
                    } else {
                        self.spawn_join(process, tasks, combine);
                        return;
                    }
                }
            };

            let mut p = process.borrow_mut();
            if p.state != ProcessState::Running {
                // Killed from inside the continuation
                return;
            }
            p.root = Some(next);
        }
    }

    fn block_on_mailbox(&self, process: &ProcessRef<V>, pid: Pid, k: Continuation<V>) {
        let mailbox = {
            let mut p = process.borrow_mut();
            p.root = Some(Task::Receive(k));
            p.state = ProcessState::Waiting(WaitReason::Message);
            p.mailbox.clone()
        };
        mailbox.add_waiter(process);
        self.stats.inc_suspensions();
        trace!(pid, "waiting for message");
    }

    fn suspend_on_effect(self: &Rc<Self>, process: &ProcessRef<V>, pid: Pid, start: Start<V>) {
        let epoch = {
            let mut p = process.borrow_mut();
            p.state = ProcessState::Waiting(WaitReason::Effect);
            p.epoch
        };
        self.stats.inc_suspensions();
        trace!(pid, epoch, "waiting for effect");

        let cancel = start(Resume::new(Rc::clone(self), Rc::clone(process), epoch));

        let mut p = process.borrow_mut();
        if p.epoch == epoch && p.state == ProcessState::Waiting(WaitReason::Effect) {
            p.pending = Some(cancel);
        }
        // Otherwise the effect already completed (or the process was killed)
        // inside `start`; the handle is dropped without being invoked.
    }
}
