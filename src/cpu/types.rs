/*!
 * CPU Types
 * Physical/logical core topology
 */

use crate::core::types::Pid;
use serde::{Deserialize, Serialize};

/// Index of a logical core in the flat, deterministic scan order
pub type CoreId = usize;

/// One hardware thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalCore {
    pub id: CoreId,
    /// Owning physical core
    pub physical: usize,
    pub base_happiness_ms: u64,
    pub contention_penalty_ms: u64,
    pub occupant: Option<Pid>,
}

impl LogicalCore {
    #[inline(always)]
    #[must_use]
    pub const fn is_free(&self) -> bool {
        self.occupant.is_none()
    }
}

/// A physical core and the logical cores it exposes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalCore {
    pub id: usize,
    pub label: String,
    pub threads: Vec<CoreId>,
}
