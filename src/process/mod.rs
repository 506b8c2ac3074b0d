/*!
 * Process Module
 * Process life-cycle, aging and population management
 */

pub mod budget;
pub mod context;
pub mod lifecycle;
pub mod manager;
pub mod types;

pub use budget::TerminationBudget;
pub use context::SystemContext;
pub use lifecycle::Process;
pub use manager::ProcessManager;
pub use types::{EndKind, Liveness, ProcessKind, ProcessState, ProcessStats, Release};
