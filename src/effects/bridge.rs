/*!
 * Thread Bridge
 * Marshals effect completions from worker threads onto the scheduler thread
 *
 * The scheduler is single-threaded, so a worker never touches a process.
 * It receives a `Completer` (which is `Send`), pushes the outcome through a
 * flume channel, and the scheduler thread applies it in `pump`.
 */

use crate::core::errors::BridgeError;
use crate::core::types::Outcome;
use crate::scheduler::Resume;
use crate::task::{Cancel, Task};
use ahash::AHashMap;
use flume::{Receiver, RecvTimeoutError, Sender};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tracing::{trace, warn};

struct Completion<V> {
    token: u64,
    outcome: Outcome<V>,
}

/// Sending half handed to a worker thread
pub struct Completer<V> {
    token: u64,
    tx: Sender<Completion<V>>,
}

impl<V> Completer<V> {
    pub fn complete(self, outcome: Outcome<V>) -> Result<(), BridgeError> {
        let token = self.token;
        self.tx
            .send(Completion { token, outcome })
            .map_err(|_| {
                warn!(token, "bridge dropped before completion was delivered");
                BridgeError::Disconnected
            })
    }

    pub fn succeed(self, value: V) -> Result<(), BridgeError> {
        self.complete(Ok(value))
    }

    pub fn fail(self, error: V) -> Result<(), BridgeError> {
        self.complete(Err(error))
    }
}

struct Registry<V> {
    next_token: u64,
    waiting: AHashMap<u64, Resume<V>>,
}

/// Scheduler-side end of the bridge
///
/// Clones share the same channel and registrations.
pub struct Bridge<V> {
    tx: Sender<Completion<V>>,
    rx: Receiver<Completion<V>>,
    registry: Rc<RefCell<Registry<V>>>,
}

impl<V: 'static> Bridge<V> {
    pub fn new() -> Self {
        let (tx, rx) = flume::unbounded();
        Self {
            tx,
            rx,
            registry: Rc::new(RefCell::new(Registry {
                next_token: 0,
                waiting: AHashMap::new(),
            })),
        }
    }

    /// Effect whose completion arrives from another thread
    ///
    /// `start` runs on the scheduler thread; it typically moves the
    /// `Completer` into a worker. Its `Cancel` runs if the process is killed,
    /// after the registration has been forgotten.
    pub fn binding<F>(&self, start: F) -> Task<V>
    where
        F: FnOnce(Completer<V>) -> Cancel + 'static,
    {
        let registry = Rc::downgrade(&self.registry);
        let tx = self.tx.clone();

        Task::binding(move |resume: Resume<V>| {
            let Some(live) = registry.upgrade() else {
                warn!(pid = resume.pid(), "bridge dropped; effect can never complete");
                return Cancel::noop();
            };

            let token = {
                let mut r = live.borrow_mut();
                let token = r.next_token;
                r.next_token += 1;
                r.waiting.insert(token, resume);
                token
            };

            let inner = start(Completer { token, tx });
            Cancel::new(move || {
                if let Some(live) = registry.upgrade() {
                    let forgotten = live.borrow_mut().waiting.remove(&token);
                    drop(forgotten);
                }
                inner.cancel();
            })
        })
    }

    /// Effects still waiting for a completion
    pub fn pending(&self) -> usize {
        self.registry.borrow().waiting.len()
    }

    /// Apply every completion that has already arrived
    ///
    /// Returns the number of processes resumed.
    pub fn pump(&self) -> usize {
        let mut resumed = 0;
        while let Ok(completion) = self.rx.try_recv() {
            if self.apply(completion) {
                resumed += 1;
            }
        }
        resumed
    }

    /// Block for the first completion, then apply everything queued
    pub fn pump_timeout(&self, timeout: Duration) -> Result<usize, BridgeError> {
        let first = self.rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => BridgeError::Timeout(timeout_millis(timeout)),
            RecvTimeoutError::Disconnected => BridgeError::Disconnected,
        })?;

        let resumed = usize::from(self.apply(first));
        Ok(resumed + self.pump())
    }

    fn apply(&self, completion: Completion<V>) -> bool {
        let Completion { token, outcome } = completion;
        let resume = self.registry.borrow_mut().waiting.remove(&token);

        match resume {
            Some(resume) => {
                resume.resume(match outcome {
                    Ok(value) => Task::Succeed(value),
                    Err(error) => Task::Fail(error),
                });
                true
            }
            None => {
                trace!(token, "completion for cancelled effect discarded");
                false
            }
        }
    }
}

/// Whole milliseconds, saturating at `u64::MAX`
fn timeout_millis(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
}

impl<V: 'static> Default for Bridge<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for Bridge<V> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            rx: self.rx.clone(),
            registry: Rc::clone(&self.registry),
        }
    }
}
