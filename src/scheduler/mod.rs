/*!
 * Scheduler Module
 * Event-sourced bridge between the engine and a pluggable controller
 */

pub mod bridge;
pub mod shadow;
pub mod strategies;
pub mod subprocess;
pub mod traits;
pub mod types;

pub use bridge::SchedulerBridge;
pub use shadow::{PageView, ProcessView, ShadowState};
pub use strategies::GreedyController;
pub use subprocess::SubprocessController;
pub use traits::Controller;
pub use types::{Action, StartupInfo};
