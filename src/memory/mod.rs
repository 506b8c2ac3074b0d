/*!
 * Memory Module
 * Page slot grid and swap management
 */

mod grid;
mod manager;
mod types;

pub use grid::PageSlotGrid;
pub use manager::PageManager;
pub use types::{Page, PageSlot, PagingStats, Partition, SlotId, SwapState};
