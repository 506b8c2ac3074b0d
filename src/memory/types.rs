/*!
 * Memory Types
 * Pages, slots and swap-request state
 */

use crate::core::types::{PageKey, Timestamp};
use serde::{Deserialize, Serialize};

/// Grid partition a slot belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Partition {
    Ram,
    Disk,
}

/// Address of one slot in the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotId {
    pub partition: Partition,
    pub index: usize,
}

impl SlotId {
    #[inline]
    #[must_use]
    pub const fn ram(index: usize) -> Self {
        Self {
            partition: Partition::Ram,
            index,
        }
    }

    #[inline]
    #[must_use]
    pub const fn disk(index: usize) -> Self {
        Self {
            partition: Partition::Disk,
            index,
        }
    }
}

/// One cell of the grid: current occupant plus an optional inbound reservation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSlot {
    pub page: Option<PageKey>,
    pub incoming: Option<PageKey>,
}

impl PageSlot {
    /// Neither occupied nor reserved
    #[inline(always)]
    #[must_use]
    pub const fn is_free(&self) -> bool {
        self.page.is_none() && self.incoming.is_none()
    }
}

/// Swap-request state of a page
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SwapState {
    None,
    Queued,
    InProgress {
        started_at: Timestamp,
        destination: SlotId,
        progress: f64,
    },
}

impl SwapState {
    #[inline]
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        !matches!(self, SwapState::None)
    }

    #[inline]
    #[must_use]
    pub const fn is_in_progress(&self) -> bool {
        matches!(self, SwapState::InProgress { .. })
    }
}

/// A simulated memory page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub key: PageKey,
    pub on_disk: bool,
    /// True while the owning process holds a core
    pub in_use: bool,
    /// Slot currently occupied; `None` only if the grid was full at creation
    pub slot: Option<SlotId>,
    pub swap: SwapState,
    /// Slot the page rested in when its swap was requested
    pub source: Option<SlotId>,
}

impl Page {
    #[inline]
    #[must_use]
    pub fn progress(&self) -> f64 {
        match self.swap {
            SwapState::InProgress { progress, .. } => progress,
            _ => 0.0,
        }
    }
}

/// Paging statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingStats {
    pub pages: usize,
    pub ram_capacity: usize,
    pub disk_capacity: usize,
    pub ram_used: usize,
    pub disk_used: usize,
    pub swap_ins_queued: usize,
    pub swap_outs_queued: usize,
    pub swaps_in_progress: usize,
    pub swaps_completed: u64,
}
