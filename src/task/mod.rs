/*!
 * Task Algebra
 * The closed set of composable task variants and their constructors
 *
 * A `Task` is an inert description of work. Building one never runs
 * anything; the scheduler consumes it one reduction at a time.
 */

mod cancel;
mod combinators;

pub use cancel::Cancel;
pub use combinators::{batch, fork, map2, sequence};

use crate::core::types::Value;
use crate::effects::Effect;
use crate::scheduler::Resume;
use std::fmt;

/// Continuation applied to a success value, a failure value or a message
pub type Continuation<V> = Box<dyn FnOnce(V) -> Task<V>>;

/// Effect starter invoked by the scheduler when a `Binding` is reached
pub type Start<V> = Box<dyn FnOnce(Resume<V>) -> Cancel>;

/// Folds the ordered member results of a join into one value
pub type Combine<V> = Box<dyn FnOnce(Vec<V>) -> V>;

/// Unit of effectful work
pub enum Task<V = Value> {
    /// Terminal success
    Succeed(V),
    /// Terminal failure
    Fail(V),
    /// Run the inner task, then feed its success value to the continuation
    AndThen(Nested<V>, Continuation<V>),
    /// Run the inner task, then feed its failure value to the continuation
    OnError(Nested<V>, Continuation<V>),
    /// Suspend on an external effect
    Binding(Start<V>),
    /// Suspend until the mailbox holds a message, then consume the oldest
    Receive(Continuation<V>),
    /// Run every member concurrently and combine their results in order
    Batch(Vec<Task<V>>, Combine<V>),
}

impl<V: 'static> Task<V> {
    pub fn succeed(value: V) -> Self {
        Task::Succeed(value)
    }

    pub fn fail(error: V) -> Self {
        Task::Fail(error)
    }

    /// Sequence `continuation` after this task's success
    pub fn and_then<F>(self, continuation: F) -> Self
    where
        F: FnOnce(V) -> Task<V> + 'static,
    {
        Task::AndThen(Nested::new(self), Box::new(continuation))
    }

    /// Recover from this task's failure with `continuation`
    pub fn on_error<F>(self, continuation: F) -> Self
    where
        F: FnOnce(V) -> Task<V> + 'static,
    {
        Task::OnError(Nested::new(self), Box::new(continuation))
    }

    /// Suspend on an effect adapter
    pub fn binding<E>(effect: E) -> Self
    where
        E: Effect<V> + 'static,
    {
        Task::Binding(Box::new(move |resume| effect.start(resume)))
    }

    /// Wait for the next mailbox message
    pub fn receive<F>(continuation: F) -> Self
    where
        F: FnOnce(V) -> Task<V> + 'static,
    {
        Task::Receive(Box::new(continuation))
    }

    /// Join `tasks` with a custom combiner over the ordered results
    pub fn join<F>(tasks: Vec<Task<V>>, combine: F) -> Self
    where
        F: FnOnce(Vec<V>) -> V + 'static,
    {
        Task::Batch(tasks, Box::new(combine))
    }

    /// Transform the success value
    pub fn map<F>(self, f: F) -> Self
    where
        F: FnOnce(V) -> V + 'static,
    {
        self.and_then(move |value| Task::Succeed(f(value)))
    }

    /// Transform the failure value
    pub fn map_err<F>(self, f: F) -> Self
    where
        F: FnOnce(V) -> V + 'static,
    {
        self.on_error(move |error| Task::Fail(f(error)))
    }

    /// Terminal tasks need no further reduction
    pub fn is_terminal(&self) -> bool {
        matches!(self, Task::Succeed(_) | Task::Fail(_))
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Task::Succeed(_) => "succeed",
            Task::Fail(_) => "fail",
            Task::AndThen(..) => "and_then",
            Task::OnError(..) => "on_error",
            Task::Binding(_) => "binding",
            Task::Receive(_) => "receive",
            Task::Batch(..) => "batch",
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Task<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Task::Succeed(value) => f.debug_tuple("Succeed").field(value).finish(),
            Task::Fail(error) => f.debug_tuple("Fail").field(error).finish(),
            Task::AndThen(inner, _) => f.debug_tuple("AndThen").field(inner).finish(),
            Task::OnError(inner, _) => f.debug_tuple("OnError").field(inner).finish(),
            Task::Binding(_) => f.write_str("Binding"),
            Task::Receive(_) => f.write_str("Receive"),
            Task::Batch(tasks, _) => f.debug_tuple("Batch").field(&tasks.len()).finish(),
        }
    }
}

/// Boxed inner task of a sequencing variant
///
/// Dropping an unrun chain unlinks it with an explicit worklist; the
/// compiler-generated drop would recurse once per level.
pub struct Nested<V>(Option<Box<Task<V>>>);

impl<V> Nested<V> {
    pub fn new(task: Task<V>) -> Self {
        Nested(Some(Box::new(task)))
    }

    pub fn into_inner(mut self) -> Task<V> {
        match self.0.take() {
            Some(task) => *task,
            None => unreachable!("nested task is only emptied by drop"),
        }
    }
}

impl<V> Drop for Nested<V> {
    fn drop(&mut self) {
        let mut pending: Vec<Task<V>> = match self.0.take() {
            Some(task) => vec![*task],
            None => return,
        };
        while let Some(task) = pending.pop() {
            match task {
                Task::AndThen(mut inner, _) | Task::OnError(mut inner, _) => {
                    if let Some(next) = inner.0.take() {
                        pending.push(*next);
                    }
                }
                Task::Batch(members, _) => pending.extend(members),
                _ => {}
            }
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Nested<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(task) => task.fmt(f),
            None => f.write_str("<taken>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_constructors_do_not_run_anything() {
        use std::cell::Cell;
        use std::rc::Rc;

        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);
        let task: Task = Task::succeed(json!(1)).and_then(move |v| {
            flag.set(true);
            Task::succeed(v)
        });

        assert!(!ran.get());
        assert!(matches!(task, Task::AndThen(..)));
    }

    #[test]
    fn test_terminal_detection() {
        assert!(Task::<Value>::succeed(json!(1)).is_terminal());
        assert!(Task::<Value>::fail(json!("x")).is_terminal());
        assert!(!Task::<Value>::receive(Task::succeed).is_terminal());
    }

    #[test]
    fn test_debug_names_variants() {
        let task: Task = Task::succeed(json!(5)).map(|v| v);
        assert_eq!(format!("{:?}", task), "AndThen(Succeed(Number(5)))");
        assert_eq!(task.kind(), "and_then");
    }

    fn deep(levels: usize) -> Task {
        let mut task = Task::succeed(json!(0));
        for _ in 0..levels {
            task = task.and_then(Task::succeed).on_error(Task::fail);
        }
        task
    }

    #[test]
    fn test_dropping_unrun_deep_chain_does_not_overflow() {
        drop(deep(100_000));
    }

    #[test]
    fn test_dropping_batch_of_deep_chains_does_not_overflow() {
        let task: Task = Task::join(vec![deep(50_000), deep(50_000)], |values| Value::from(values));
        drop(task);
    }

    #[test]
    fn test_into_inner_returns_wrapped_task() {
        let nested: Nested<Value> = Nested::new(Task::succeed(json!(3)));
        assert!(matches!(nested.into_inner(), Task::Succeed(v) if v == json!(3)));
    }
}
