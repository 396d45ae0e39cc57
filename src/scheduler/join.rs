/*!
 * Join Coordinator
 * Spawns one process per member and resumes the parent exactly once
 *
 * The coordinator is a one-shot latch: the first failure, or the last
 * success, settles it. Anything reported afterwards is discarded. On
 * failure every other member is killed before the parent resumes, which
 * recursively cancels nested joins and pending effects.
 *
 * Ownership: members hold the coordinator through their exit hooks and
 * the coordinator holds the members and the parent's resume token. Settling
 * or aborting releases both, breaking the cycle.
 */

use super::config::MailboxSharing;
use super::{Core, Resume};
use crate::core::limits::LARGE_JOIN_THRESHOLD;
use crate::core::types::Outcome;
use crate::process::{Mailbox, ProcessRef, ProcessState, WaitReason};
use crate::task::{Cancel, Combine, Task};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, trace};

struct JoinState<V> {
    slots: Vec<Option<V>>,
    remaining: usize,
    settled: bool,
    combine: Option<Combine<V>>,
    parent: Option<Resume<V>>,
    members: Vec<ProcessRef<V>>,
}

type JoinRef<V> = Rc<RefCell<JoinState<V>>>;

enum Settlement<V> {
    Success {
        parent: Option<Resume<V>>,
        combine: Option<Combine<V>>,
        values: Vec<V>,
        members: Vec<ProcessRef<V>>,
    },
    Failure {
        parent: Option<Resume<V>>,
        error: V,
        members: Vec<ProcessRef<V>>,
    },
}

impl<V: 'static> Core<V> {
    /// Suspend `parent` on a join of `tasks` and queue one process per member
    pub(super) fn spawn_join(
        self: &Rc<Self>,
        parent: &ProcessRef<V>,
        tasks: Vec<Task<V>>,
        combine: Combine<V>,
    ) {
        let count = tasks.len();
        let (pid, epoch, parent_mailbox) = {
            let mut p = parent.borrow_mut();
            p.state = ProcessState::Waiting(WaitReason::Join);
            (p.pid, p.epoch, p.mailbox.clone())
        };
        self.stats.inc_suspensions();
        self.stats.inc_joins();

        if count >= LARGE_JOIN_THRESHOLD {
            debug!(pid, members = count, "spawning large join");
        } else {
            trace!(pid, members = count, "spawning join");
        }

        let join: JoinRef<V> = Rc::new(RefCell::new(JoinState {
            slots: (0..count).map(|_| None).collect(),
            remaining: count,
            settled: false,
            combine: Some(combine),
            parent: Some(Resume::new(Rc::clone(self), Rc::clone(parent), epoch)),
            members: Vec::with_capacity(count),
        }));

        for (index, task) in tasks.into_iter().enumerate() {
            let mailbox = match self.config.join_mailbox {
                MailboxSharing::Shared => parent_mailbox.clone(),
                MailboxSharing::Isolated => Mailbox::new(),
            };
            let member = self.create(task, mailbox);

            let coordinator = Rc::clone(&join);
            let core = Rc::clone(self);
            member.borrow_mut().on_exit = Some(Box::new(move |outcome| {
                core.report(&coordinator, index, outcome)
            }));

            join.borrow_mut().members.push(Rc::clone(&member));
            self.enqueue(&member);
        }

        let coordinator = Rc::downgrade(&join);
        let core = Rc::clone(self);
        parent.borrow_mut().pending = Some(Cancel::new(move || {
            if let Some(join) = coordinator.upgrade() {
                core.abort_join(&join);
            }
        }));
    }

    fn report(&self, join: &JoinRef<V>, index: usize, outcome: Outcome<V>) {
        let settlement = {
            let mut state = join.borrow_mut();
            if state.settled {
                trace!(index, "join already settled; report discarded");
                return;
            }

            match outcome {
                Ok(value) => {
                    state.slots[index] = Some(value);
                    state.remaining -= 1;
                    if state.remaining > 0 {
                        return;
                    }
                    state.settled = true;
                    Settlement::Success {
                        parent: state.parent.take(),
                        combine: state.combine.take(),
                        values: state.slots.drain(..).flatten().collect(),
                        members: std::mem::take(&mut state.members),
                    }
                }
                Err(error) => {
                    state.settled = true;
                    Settlement::Failure {
                        parent: state.parent.take(),
                        error,
                        members: std::mem::take(&mut state.members),
                    }
                }
            }
        };

        match settlement {
            Settlement::Success {
                parent,
                combine,
                values,
                members,
            } => {
                drop(members);
                if let (Some(parent), Some(combine)) = (parent, combine) {
                    trace!(pid = parent.pid(), "join succeeded");
                    parent.resume(Task::Succeed(combine(values)));
                }
            }
            Settlement::Failure {
                parent,
                error,
                members,
            } => {
                let cancelled = members.iter().filter(|m| self.kill(m)).count();
                drop(members);
                if let Some(parent) = parent {
                    debug!(pid = parent.pid(), cancelled, "join failed");
                    parent.resume(Task::Fail(error));
                }
            }
        }
    }

    /// Parent killed: settle without resuming and kill every member
    fn abort_join(&self, join: &JoinRef<V>) {
        let (parent, members) = {
            let mut state = join.borrow_mut();
            if state.settled {
                return;
            }
            state.settled = true;
            (state.parent.take(), std::mem::take(&mut state.members))
        };
        drop(parent);

        for member in &members {
            self.kill(member);
        }
    }
}
