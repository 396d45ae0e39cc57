/*!
 * Monitoring
 * Tracing subscriber setup for hosts embedding the scheduler
 */

mod tracer;

pub use tracer::{init_tracing, process_span, try_init_tracing};
