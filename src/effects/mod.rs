/*!
 * Effect Adapters
 * Contract for external effects and the adapters bundled with the runtime
 *
 * An adapter plugs into `Task::binding`. Its obligations:
 * - call the completion token at most once (enforced by `Resume` being consumed)
 * - return a `Cancel` synchronously, even if the effect itself is asynchronous
 * - treat cancellation as best-effort; the scheduler only guarantees that it
 *   stops tracking the effect
 * - report failures through `Resume::fail`, never by panicking
 * - complete on the scheduler thread; use [`Bridge`] to hop back from others
 */

mod bridge;
mod logging;
mod timer;

pub use bridge::{Bridge, Completer};
pub use logging::{log, LogLevel};
pub use timer::Timers;

use crate::scheduler::Resume;
use crate::task::Cancel;

/// Starter for an external effect
pub trait Effect<V> {
    /// Begin the effect; complete it later through `resume`
    fn start(self, resume: Resume<V>) -> Cancel;
}

impl<V, F> Effect<V> for F
where
    F: FnOnce(Resume<V>) -> Cancel,
{
    fn start(self, resume: Resume<V>) -> Cancel {
        self(resume)
    }
}
