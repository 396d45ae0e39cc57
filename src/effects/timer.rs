/*!
 * Virtual Timers
 * Deterministic timer driver for `sleep`-style effects
 *
 * Time only moves when the owner calls `advance` or `run_until_idle`, which
 * makes delay-dependent programs reproducible. Timers due at the same
 * instant fire in registration order.
 */

use crate::scheduler::Resume;
use crate::task::{Cancel, Task};
use ahash::AHashMap;
use std::cell::RefCell;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::rc::{Rc, Weak};
use std::time::Duration;
use tracing::trace;

struct Armed<V> {
    resume: Resume<V>,
    outcome: Task<V>,
}

struct TimerQueue<V> {
    now: Duration,
    next_id: u64,
    deadlines: BinaryHeap<Reverse<(Duration, u64)>>,
    armed: AHashMap<u64, Armed<V>>,
}

impl<V> TimerQueue<V> {
    /// Next armed timer due at or before `limit`
    fn pop_due(&mut self, limit: Duration) -> Option<(Duration, Armed<V>)> {
        while let Some(Reverse((deadline, id))) = self.deadlines.peek().copied() {
            if deadline > limit {
                return None;
            }
            self.deadlines.pop();
            // Cancelled timers leave their deadline behind; skip those
            if let Some(armed) = self.armed.remove(&id) {
                return Some((deadline, armed));
            }
        }
        None
    }
}

/// Virtual-time timer driver
///
/// Clones share the same clock.
pub struct Timers<V> {
    inner: Rc<RefCell<TimerQueue<V>>>,
}

impl<V: 'static> Timers<V> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(TimerQueue {
                now: Duration::ZERO,
                next_id: 0,
                deadlines: BinaryHeap::new(),
                armed: AHashMap::new(),
            })),
        }
    }

    /// Resume with `outcome` once `delay` has elapsed
    pub fn after(&self, delay: Duration, outcome: Task<V>) -> Task<V> {
        let queue = Rc::downgrade(&self.inner);
        Task::binding(move |resume: Resume<V>| arm(&queue, delay, resume, outcome))
    }

    /// Succeed with `V::default()` once `delay` has elapsed
    pub fn sleep(&self, delay: Duration) -> Task<V>
    where
        V: Default,
    {
        self.after(delay, Task::Succeed(V::default()))
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Number of armed timers
    pub fn pending(&self) -> usize {
        self.inner.borrow().armed.len()
    }

    /// Move the clock forward by `by`, firing every timer that comes due
    ///
    /// Returns the number of timers fired.
    pub fn advance(&self, by: Duration) -> usize {
        let limit = self.now().saturating_add(by);
        let fired = self.fire_until(limit);
        self.inner.borrow_mut().now = limit;
        fired
    }

    /// Fire timers until none are armed, including ones armed while firing
    pub fn run_until_idle(&self) -> usize {
        self.fire_until(Duration::MAX)
    }

    fn fire_until(&self, limit: Duration) -> usize {
        let mut fired = 0;
        loop {
            let due = self.inner.borrow_mut().pop_due(limit);
            let Some((deadline, armed)) = due else { break };

            self.inner.borrow_mut().now = deadline;
            trace!(pid = armed.resume.pid(), ?deadline, "timer fired");
            armed.resume.resume(armed.outcome);
            fired += 1;
        }
        fired
    }
}

fn arm<V: 'static>(
    queue: &Weak<RefCell<TimerQueue<V>>>,
    delay: Duration,
    resume: Resume<V>,
    outcome: Task<V>,
) -> Cancel {
    let Some(inner) = queue.upgrade() else {
        // Driver dropped: the timer can never fire
        return Cancel::noop();
    };

    let id = {
        let mut q = inner.borrow_mut();
        let id = q.next_id;
        q.next_id += 1;
        let deadline = q.now.saturating_add(delay);
        q.deadlines.push(Reverse((deadline, id)));
        q.armed.insert(id, Armed { resume, outcome });
        id
    };

    let queue = Weak::clone(queue);
    Cancel::new(move || {
        if let Some(inner) = queue.upgrade() {
            let disarmed = inner.borrow_mut().armed.remove(&id);
            drop(disarmed);
        }
    })
}

impl<V: 'static> Default for Timers<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for Timers<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}
