/*!
 * Monitoring
 * Semantic event stream and structured tracing
 */

mod events;
mod tracer;

pub use events::{Event, EventMonitor};
pub use tracer::{generate_run_id, init_tracing, span_controller, span_tick};
