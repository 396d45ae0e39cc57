/*!
 * Task Algebra Tests
 * Sequencing, recovery and stack unwinding as seen through a process
 */

use coop_kernel::{Cancel, ProcessState, Scheduler, Task, Value};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::cell::Cell;
use std::rc::Rc;

fn counted<F>(calls: &Rc<Cell<u32>>, f: F) -> impl FnOnce(Value) -> Task + 'static
where
    F: FnOnce(Value) -> Task + 'static,
{
    let calls = Rc::clone(calls);
    move |v| {
        calls.set(calls.get() + 1);
        f(v)
    }
}

#[test]
fn test_and_then_on_success_invokes_continuation_once() {
    let scheduler: Scheduler = Scheduler::new();
    let calls = Rc::new(Cell::new(0));

    let handle = scheduler.spawn(
        Task::succeed(json!(20)).and_then(counted(&calls, |v| Task::succeed(json!(v.as_i64().unwrap() + 1)))),
    );

    assert_eq!(handle.outcome(), Some(Ok(json!(21))));
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_and_then_on_failure_skips_continuation() {
    let scheduler: Scheduler = Scheduler::new();
    let calls = Rc::new(Cell::new(0));

    let handle = scheduler.spawn(Task::fail(json!("e")).and_then(counted(&calls, Task::succeed)));

    assert_eq!(handle.outcome(), Some(Err(json!("e"))));
    assert_eq!(handle.state(), ProcessState::Failed);
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_on_error_on_failure_invokes_handler_once() {
    let scheduler: Scheduler = Scheduler::new();
    let calls = Rc::new(Cell::new(0));

    let handle = scheduler.spawn(
        Task::fail(json!("e")).on_error(counted(&calls, |e| Task::succeed(json!({ "recovered": e })))),
    );

    assert_eq!(handle.outcome(), Some(Ok(json!({ "recovered": "e" }))));
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_on_error_on_success_skips_handler() {
    let scheduler: Scheduler = Scheduler::new();
    let calls = Rc::new(Cell::new(0));

    let handle = scheduler.spawn(Task::succeed(json!(3)).on_error(counted(&calls, Task::fail)));

    assert_eq!(handle.outcome(), Some(Ok(json!(3))));
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_unwinding_skips_non_matching_frames() {
    let scheduler: Scheduler = Scheduler::new();
    let k1 = Rc::new(Cell::new(0));
    let k2 = Rc::new(Cell::new(0));

    let handle = scheduler.spawn(
        Task::fail(json!("e"))
            .and_then(counted(&k1, Task::succeed))
            .on_error(counted(&k2, |e| Task::succeed(json!(["handled", e])))),
    );

    assert_eq!(handle.outcome(), Some(Ok(json!(["handled", "e"]))));
    assert_eq!(k1.get(), 0);
    assert_eq!(k2.get(), 1);
}

#[test]
fn test_handler_failure_propagates_to_outer_handler() {
    let scheduler: Scheduler = Scheduler::new();

    let handle = scheduler.spawn(
        Task::fail(json!(1))
            .on_error(|_| Task::fail(json!(2)))
            .and_then(|_| Task::succeed(json!("unreachable")))
            .on_error(|e| Task::succeed(json!({ "outer": e }))),
    );

    assert_eq!(handle.outcome(), Some(Ok(json!({ "outer": 2 }))));
}

#[test]
fn test_binding_failure_skips_success_continuation() {
    let scheduler: Scheduler = Scheduler::new();
    let calls = Rc::new(Cell::new(0));

    let failing = Task::binding(|resume: coop_kernel::Resume<Value>| {
        resume.fail(json!("x"));
        Cancel::noop()
    });
    let handle = scheduler.spawn(failing.and_then(counted(&calls, Task::succeed)));

    assert_eq!(handle.outcome(), Some(Err(json!("x"))));
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_map_and_map_err() {
    let scheduler: Scheduler = Scheduler::new();

    let ok = scheduler.spawn(Task::succeed(json!(2)).map(|v| json!(v.as_i64().unwrap() * 10)));
    let err = scheduler.spawn(Task::fail(json!("low")).map_err(|e| json!({ "wrapped": e })));

    assert_eq!(ok.outcome(), Some(Ok(json!(20))));
    assert_eq!(err.outcome(), Some(Err(json!({ "wrapped": "low" }))));
}

#[test]
fn test_deep_continuation_chain_does_not_overflow() {
    let scheduler: Scheduler = Scheduler::new();

    let mut task = Task::succeed(json!(0));
    for _ in 0..100_000 {
        task = task.and_then(|v| Task::succeed(json!(v.as_i64().unwrap() + 1)));
    }

    let handle = scheduler.spawn(task);
    assert_eq!(handle.outcome(), Some(Ok(json!(100_000))));
}

#[test]
fn test_kill_runs_pending_cancel_once() {
    let scheduler: Scheduler = Scheduler::new();
    let cancels = Rc::new(Cell::new(0));
    let counter = Rc::clone(&cancels);

    let handle = scheduler.spawn(Task::binding(move |_resume: coop_kernel::Resume<Value>| {
        Cancel::new(move || counter.set(counter.get() + 1))
    }));

    assert!(handle.kill());
    assert!(!handle.kill());
    assert_eq!(cancels.get(), 1);
    assert_eq!(handle.state(), ProcessState::Killed);
    assert_eq!(handle.outcome(), None);
}
