/*!
 * Continuation Stack
 * Singly-linked chain of pending continuations owned by one process
 *
 * Frames are never modified after being pushed: reductions only move the
 * top pointer. Popping hands the frame's continuation back by value.
 */

use crate::task::Continuation;

/// Terminal kind a frame waits for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    Success,
    Failure,
}

struct Frame<V> {
    expects: Expect,
    continuation: Continuation<V>,
    rest: Option<Box<Frame<V>>>,
}

pub(crate) struct Stack<V> {
    top: Option<Box<Frame<V>>>,
    depth: usize,
}

impl<V> Stack<V> {
    pub fn new() -> Self {
        Self {
            top: None,
            depth: 0,
        }
    }

    pub fn push(&mut self, expects: Expect, continuation: Continuation<V>) {
        let rest = self.top.take();
        self.top = Some(Box::new(Frame {
            expects,
            continuation,
            rest,
        }));
        self.depth += 1;
    }

    /// Pop frames until one expecting `kind` is found
    ///
    /// Frames expecting the other kind can never fire once skipped and are
    /// dropped along the way. Returns `None` when the stack runs out.
    pub fn unwind(&mut self, kind: Expect) -> Option<Continuation<V>> {
        while let Some(frame) = self.top.take() {
            let Frame {
                expects,
                continuation,
                rest,
            } = *frame;
            self.top = rest;
            self.depth -= 1;
            if expects == kind {
                return Some(continuation);
            }
        }
        None
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.top.is_none()
    }
}

impl<V> Default for Stack<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Drop for Stack<V> {
    // Unlink iteratively; a recursive drop of a deep chain would overflow
    fn drop(&mut self) {
        let mut next = self.top.take();
        while let Some(mut frame) = next {
            next = frame.rest.take();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Task;

    fn tag(label: i64) -> Continuation<i64> {
        Box::new(move |v| Task::Succeed(v * 100 + label))
    }

    fn apply(k: Continuation<i64>, v: i64) -> i64 {
        match k(v) {
            Task::Succeed(out) => out,
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_lifo_order() {
        let mut stack = Stack::new();
        stack.push(Expect::Success, tag(1));
        stack.push(Expect::Success, tag(2));
        assert_eq!(stack.depth(), 2);

        assert_eq!(apply(stack.unwind(Expect::Success).unwrap(), 0), 2);
        assert_eq!(apply(stack.unwind(Expect::Success).unwrap(), 0), 1);
        assert!(stack.unwind(Expect::Success).is_none());
        assert!(stack.is_empty());
    }

    #[test]
    fn test_unwind_skips_mismatched_frames() {
        let mut stack = Stack::new();
        stack.push(Expect::Failure, tag(1));
        stack.push(Expect::Success, tag(2));
        stack.push(Expect::Success, tag(3));

        let k = stack.unwind(Expect::Failure).unwrap();
        assert_eq!(apply(k, 0), 1);
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_unwind_exhausts_without_match() {
        let mut stack = Stack::new();
        stack.push(Expect::Success, tag(1));
        assert!(stack.unwind(Expect::Failure).is_none());
        assert!(stack.is_empty());
    }

    #[test]
    fn test_deep_stack_drops_without_overflow() {
        let mut stack = Stack::new();
        for i in 0..200_000 {
            stack.push(Expect::Success, tag(i));
        }
        drop(stack);
    }
}
