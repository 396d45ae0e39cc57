/*!
 * Mailbox
 * Unbounded FIFO message queue attached to a process
 *
 * A mailbox may be shared by several processes (join members inherit their
 * parent's mailbox under the shared policy). Processes blocked on `Receive`
 * register as waiters so a wake-up reaches every reader of the queue.
 */

use super::ProcessRef;
use crate::core::limits::WAITER_PRUNE_MIN;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

struct Queue<V> {
    messages: VecDeque<V>,
    waiters: Vec<Weak<RefCell<super::Process<V>>>>,
    /// Waiter count at which dead entries are swept next
    prune_at: usize,
}

/// Handle to a message queue; clones refer to the same queue
pub struct Mailbox<V> {
    inner: Rc<RefCell<Queue<V>>>,
}

impl<V> Mailbox<V> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Queue {
                messages: VecDeque::new(),
                waiters: Vec::new(),
                prune_at: WAITER_PRUNE_MIN,
            })),
        }
    }

    /// Append to the tail
    pub fn push(&self, message: V) {
        self.inner.borrow_mut().messages.push_back(message);
    }

    /// Remove from the head
    pub fn pop(&self) -> Option<V> {
        self.inner.borrow_mut().messages.pop_front()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().messages.is_empty()
    }

    /// Check if both handles refer to the same queue
    pub fn same_queue(&self, other: &Mailbox<V>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Register a blocked reader; a process is listed at most once
    pub(crate) fn add_waiter(&self, process: &ProcessRef<V>) {
        {
            let mut p = process.borrow_mut();
            if p.awaiting_mail {
                return;
            }
            p.awaiting_mail = true;
        }

        let mut queue = self.inner.borrow_mut();
        queue.waiters.push(Rc::downgrade(process));
        if queue.waiters.len() >= queue.prune_at {
            queue.waiters.retain(|w| w.strong_count() > 0);
            queue.prune_at = (queue.waiters.len() * 2).max(WAITER_PRUNE_MIN);
        }
    }

    /// Drain registered readers that are still alive
    pub(crate) fn take_waiters(&self) -> Vec<ProcessRef<V>> {
        let waiters = {
            let mut queue = self.inner.borrow_mut();
            queue.prune_at = WAITER_PRUNE_MIN;
            std::mem::take(&mut queue.waiters)
        };
        let live: Vec<ProcessRef<V>> = waiters.iter().filter_map(Weak::upgrade).collect();
        for process in &live {
            process.borrow_mut().awaiting_mail = false;
        }
        live
    }

    #[cfg(test)]
    fn waiter_count(&self) -> usize {
        self.inner.borrow().waiters.len()
    }
}

impl<V> Clone for Mailbox<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<V> Default for Mailbox<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::super::Process;
    use super::*;
    use crate::task::Task;

    #[test]
    fn test_fifo_order() {
        let mailbox = Mailbox::new();
        mailbox.push(1);
        mailbox.push(2);
        mailbox.push(3);

        assert_eq!(mailbox.len(), 3);
        assert_eq!(mailbox.pop(), Some(1));
        assert_eq!(mailbox.pop(), Some(2));
        assert_eq!(mailbox.pop(), Some(3));
        assert_eq!(mailbox.pop(), None);
        assert!(mailbox.is_empty());
    }

    #[test]
    fn test_clones_share_queue() {
        let a = Mailbox::new();
        let b = a.clone();
        a.push("hello");

        assert!(a.same_queue(&b));
        assert_eq!(b.pop(), Some("hello"));
        assert!(a.is_empty());
        assert!(!a.same_queue(&Mailbox::new()));
    }

    fn reader(pid: u32, mailbox: &Mailbox<i32>) -> ProcessRef<i32> {
        Rc::new(RefCell::new(Process::new(pid, Task::Succeed(0), mailbox.clone())))
    }

    #[test]
    fn test_waiter_registered_once_until_taken() {
        let mailbox = Mailbox::new();
        let process = reader(1, &mailbox);

        mailbox.add_waiter(&process);
        mailbox.add_waiter(&process);
        assert_eq!(mailbox.waiter_count(), 1);

        assert_eq!(mailbox.take_waiters().len(), 1);
        assert!(!process.borrow().awaiting_mail);

        mailbox.add_waiter(&process);
        assert_eq!(mailbox.waiter_count(), 1);
    }

    #[test]
    fn test_dead_waiters_are_pruned() {
        let mailbox = Mailbox::new();
        for pid in 0..(WAITER_PRUNE_MIN as u32 * 4) {
            let process = reader(pid, &mailbox);
            mailbox.add_waiter(&process);
        }
        let survivor = reader(9_999, &mailbox);
        mailbox.add_waiter(&survivor);

        assert!(mailbox.waiter_count() < WAITER_PRUNE_MIN * 2);
        let live = mailbox.take_waiters();
        assert_eq!(live.len(), 1);
        assert!(Rc::ptr_eq(&live[0], &survivor));
    }
}
