/*!
 * Page Slot Grid
 * Fixed-capacity RAM and disk slot arrays, addressed row-major
 */

use super::types::{PageSlot, Partition, SlotId};
use crate::core::types::PageKey;

#[derive(Debug, Clone)]
pub struct PageSlotGrid {
    ram: Vec<PageSlot>,
    disk: Vec<PageSlot>,
    slots_per_row: usize,
}

impl PageSlotGrid {
    pub fn new(ram_rows: usize, disk_rows: usize, slots_per_row: usize) -> Self {
        Self {
            ram: vec![PageSlot::default(); ram_rows * slots_per_row],
            disk: vec![PageSlot::default(); disk_rows * slots_per_row],
            slots_per_row,
        }
    }

    fn partition(&self, partition: Partition) -> &[PageSlot] {
        match partition {
            Partition::Ram => &self.ram,
            Partition::Disk => &self.disk,
        }
    }

    fn partition_mut(&mut self, partition: Partition) -> &mut [PageSlot] {
        match partition {
            Partition::Ram => &mut self.ram,
            Partition::Disk => &mut self.disk,
        }
    }

    #[must_use]
    pub fn slot(&self, id: SlotId) -> Option<&PageSlot> {
        self.partition(id.partition).get(id.index)
    }

    /// First slot that is neither occupied nor reserved
    #[must_use]
    pub fn first_free(&self, partition: Partition) -> Option<SlotId> {
        self.partition(partition)
            .iter()
            .position(PageSlot::is_free)
            .map(|index| SlotId { partition, index })
    }

    pub fn occupy(&mut self, id: SlotId, key: PageKey) {
        if let Some(slot) = self.partition_mut(id.partition).get_mut(id.index) {
            slot.page = Some(key);
        }
    }

    /// Clear the occupant if it is `key`
    pub fn vacate(&mut self, id: SlotId, key: PageKey) {
        if let Some(slot) = self.partition_mut(id.partition).get_mut(id.index) {
            if slot.page == Some(key) {
                slot.page = None;
            }
        }
    }

    pub fn reserve(&mut self, id: SlotId, key: PageKey) {
        if let Some(slot) = self.partition_mut(id.partition).get_mut(id.index) {
            slot.incoming = Some(key);
        }
    }

    /// Drop the inbound reservation if it is `key`
    pub fn release(&mut self, id: SlotId, key: PageKey) {
        if let Some(slot) = self.partition_mut(id.partition).get_mut(id.index) {
            if slot.incoming == Some(key) {
                slot.incoming = None;
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn row_of(&self, id: SlotId) -> usize {
        id.index / self.slots_per_row
    }

    /// Pages occupying the row that contains `id`, in slot order
    #[must_use]
    pub fn row_occupants(&self, id: SlotId) -> Vec<PageKey> {
        let start = self.row_of(id) * self.slots_per_row;
        let slots = self.partition(id.partition);
        let end = (start + self.slots_per_row).min(slots.len());
        slots
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .filter_map(|s| s.page)
            .collect()
    }

    pub fn capacity(&self, partition: Partition) -> usize {
        self.partition(partition).len()
    }

    pub fn used(&self, partition: Partition) -> usize {
        self.partition(partition)
            .iter()
            .filter(|s| s.page.is_some())
            .count()
    }
}
