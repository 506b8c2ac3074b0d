/*!
 * CPU Module
 * Physical/logical core topology with contention penalties
 */

mod manager;
mod types;

pub use manager::CpuManager;
pub use types::{CoreId, LogicalCore, PhysicalCore};
