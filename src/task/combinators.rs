/*!
 * Join Constructors
 * N-ary batch and pairwise fork built on the `Batch` variant
 */

use super::Task;

/// Run `tasks` concurrently; succeed with their results in input order
pub fn batch<V>(tasks: Vec<Task<V>>) -> Task<V>
where
    V: From<Vec<V>> + 'static,
{
    Task::Batch(tasks, Box::new(V::from))
}

/// Alias of [`batch`]
pub fn sequence<V>(tasks: Vec<Task<V>>) -> Task<V>
where
    V: From<Vec<V>> + 'static,
{
    batch(tasks)
}

/// Run two tasks concurrently and combine both results
pub fn fork<V, F>(left: Task<V>, right: Task<V>, combine: F) -> Task<V>
where
    V: 'static,
    F: FnOnce(V, V) -> V + 'static,
{
    Task::join(vec![left, right], move |values| {
        let mut values = values.into_iter();
        match (values.next(), values.next()) {
            (Some(a), Some(b)) => combine(a, b),
            _ => unreachable!("two-member join completed without two values"),
        }
    })
}

/// `fork` with the combiner first
pub fn map2<V, F>(combine: F, left: Task<V>, right: Task<V>) -> Task<V>
where
    V: 'static,
    F: FnOnce(V, V) -> V + 'static,
{
    fork(left, right, combine)
}
