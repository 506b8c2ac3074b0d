/*!
 * I/O Module
 * Blocking I/O registration and completion arrivals
 */

mod queue;

pub use queue::IoQueue;
