/*!
 * Scheduler Module
 * Run queue, process creation, and the single entry point for tasks
 *
 * The scheduler is cooperative and single-threaded. Spawning, resuming and
 * waking only place a process on the run queue; whichever call finds the
 * queue idle drains it, stepping one process at a time. Nested triggers
 * therefore never nest steps.
 */

mod builder;
mod config;
mod join;
mod resume;
mod stats;
mod step;

pub use builder::SchedulerBuilder;
pub use config::{MailboxSharing, SchedulerConfig};
pub use resume::Resume;
pub use stats::SchedulerStats;

use crate::core::limits::RUN_QUEUE_INITIAL_CAPACITY;
use crate::core::types::{KernelResult, Outcome, Pid, Value};
use crate::process::{Mailbox, Process, ProcessHandle, ProcessRef, ProcessState, WaitReason};
use crate::task::Task;
use stats::StatCounters;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use tracing::{debug, info};

/// Scheduler state shared by handles, resume tokens and join coordinators
pub(crate) struct Core<V> {
    config: SchedulerConfig,
    next_pid: Cell<Pid>,
    run_queue: RefCell<VecDeque<ProcessRef<V>>>,
    working: Cell<bool>,
    stats: StatCounters,
}

/// Clears the working latch even if a continuation panics
struct RunGuard<'a>(&'a Cell<bool>);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl<V: 'static> Core<V> {
    fn new(config: SchedulerConfig) -> Self {
        Self {
            next_pid: Cell::new(config.first_pid),
            config,
            run_queue: RefCell::new(VecDeque::with_capacity(RUN_QUEUE_INITIAL_CAPACITY)),
            working: Cell::new(false),
            stats: StatCounters::default(),
        }
    }

    fn allocate_pid(&self) -> Pid {
        let pid = self.next_pid.get();
        self.next_pid.set(pid.wrapping_add(1));
        pid
    }

    pub(crate) fn create(&self, task: Task<V>, mailbox: Mailbox<V>) -> ProcessRef<V> {
        let pid = self.allocate_pid();
        self.stats.inc_spawned();
        tracing::trace!(pid, root = task.kind(), "process created");
        Rc::new(RefCell::new(Process::new(pid, task, mailbox)))
    }

    pub(crate) fn enqueue(&self, process: &ProcessRef<V>) {
        {
            let mut p = process.borrow_mut();
            if p.queued {
                return;
            }
            p.queued = true;
        }
        self.run_queue.borrow_mut().push_back(Rc::clone(process));
    }

    /// Drain the run queue unless a drain is already in progress
    pub(crate) fn run(self: &Rc<Self>) {
        if self.working.replace(true) {
            return;
        }
        let _guard = RunGuard(&self.working);

        loop {
            let next = self.run_queue.borrow_mut().pop_front();
            let Some(process) = next else { break };
            process.borrow_mut().queued = false;
            self.step(&process);
        }
    }

    /// Re-schedule every reader blocked on this process's mailbox
    pub(crate) fn wake(self: &Rc<Self>, process: &ProcessRef<V>) {
        let (mailbox, receiving) = {
            let p = process.borrow();
            (
                p.mailbox.clone(),
                p.state == ProcessState::Waiting(WaitReason::Message),
            )
        };

        for waiter in mailbox.take_waiters() {
            self.enqueue(&waiter);
        }
        if receiving {
            self.enqueue(process);
        }
        self.run();
    }

    /// Cancel a process and whatever it is suspended on
    ///
    /// Returns `false` if the process had already terminated.
    pub(crate) fn kill(&self, process: &ProcessRef<V>) -> bool {
        let (pid, pending, stack, root, hook) = {
            let mut p = process.borrow_mut();
            if p.state.is_terminal() {
                return false;
            }
            p.state = ProcessState::Killed;
            p.epoch += 1;
            (
                p.pid,
                p.pending.take(),
                std::mem::take(&mut p.stack),
                p.root.take(),
                p.on_exit.take(),
            )
        };

        self.stats.inc_killed();
        debug!(pid, "process killed");

        if let Some(cancel) = pending {
            cancel.cancel();
        }
        drop((stack, root, hook));
        true
    }

    /// Record a terminal result, handing it to the exit hook when present
    pub(crate) fn finish(&self, process: &ProcessRef<V>, outcome: Outcome<V>) {
        let (pid, hook) = {
            let mut p = process.borrow_mut();
            p.state = if outcome.is_ok() {
                ProcessState::Completed
            } else {
                ProcessState::Failed
            };
            (p.pid, p.on_exit.take())
        };

        if outcome.is_ok() {
            self.stats.inc_completed();
            debug!(pid, "process completed");
        } else {
            self.stats.inc_failed();
            debug!(pid, "process failed with no handler");
        }

        match hook {
            Some(hook) => hook(outcome),
            None => process.borrow_mut().outcome = Some(outcome),
        }
    }
}

/// Cooperative task scheduler
///
/// Cloning yields another handle to the same scheduler.
pub struct Scheduler<V = Value> {
    core: Rc<Core<V>>,
}

impl<V: 'static> Scheduler<V> {
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    pub fn with_config(config: SchedulerConfig) -> Self {
        info!(
            join_mailbox = ?config.join_mailbox,
            first_pid = config.first_pid,
            "Scheduler initialized"
        );
        Self {
            core: Rc::new(Core::new(config)),
        }
    }

    /// Scheduler configured from `COOP_*` environment variables
    pub fn from_env() -> KernelResult<Self> {
        Ok(Self::with_config(SchedulerConfig::from_env()?))
    }

    pub fn builder() -> SchedulerBuilder<V> {
        SchedulerBuilder::new()
    }

    /// Create a process for `task` and drive it until it finishes or suspends
    ///
    /// Called from inside a running continuation or effect starter, this
    /// only enqueues the process; it runs once the current step yields.
    pub fn spawn(&self, task: Task<V>) -> ProcessHandle<V> {
        let process = self.core.create(task, Mailbox::new());
        self.core.enqueue(&process);
        self.core.run();
        ProcessHandle::new(Rc::clone(&self.core), process)
    }

    /// Fire-and-forget form of [`Scheduler::spawn`]
    pub fn start(&self, task: Task<V>) {
        let _ = self.spawn(task);
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.core.config
    }

    pub fn stats(&self) -> SchedulerStats {
        self.core.stats.snapshot()
    }
}

impl<V: 'static> Default for Scheduler<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for Scheduler<V> {
    fn clone(&self) -> Self {
        Self {
            core: Rc::clone(&self.core),
        }
    }
}
