/*!
 * Page Manager
 * Page placement plus bounded-parallel swap-in/swap-out queues
 *
 * # Scheduling rule
 *
 * Swap-ins strictly starve swap-outs: an out-swap only starts on a tick where
 * no in-swap is in flight or startable. The two directions are never in
 * flight together. Within a direction requests are served FIFO and
 * destination slots are taken lowest-index first.
 */

use super::grid::PageSlotGrid;
use super::types::{Page, PagingStats, Partition, SlotId, SwapState};
use crate::config::MemoryConfig;
use crate::core::types::{elapsed_ms, PageKey, Pid, Timestamp};
use crate::monitoring::{Event, EventMonitor};
use std::collections::{BTreeMap, VecDeque};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct PageManager {
    grid: PageSlotGrid,
    pages: BTreeMap<PageKey, Page>,
    swap_in_queue: VecDeque<PageKey>,
    swap_out_queue: VecDeque<PageKey>,
    swap_delay_ms: u64,
    parallel_swaps: usize,
    swaps_completed: u64,
}

impl PageManager {
    pub fn new(config: &MemoryConfig) -> Self {
        Self {
            grid: PageSlotGrid::new(config.ram_rows, config.disk_rows, config.slots_per_row),
            pages: BTreeMap::new(),
            swap_in_queue: VecDeque::new(),
            swap_out_queue: VecDeque::new(),
            swap_delay_ms: config.swap_delay_ms,
            parallel_swaps: config.parallel_swaps,
            swaps_completed: 0,
        }
    }

    /// Place a new page in the first free RAM slot, else the first free disk
    /// slot. Capacity is guaranteed by configuration validation; if both
    /// partitions are full the page exists unplaced.
    pub fn create_page(&mut self, key: PageKey, in_use: bool, events: &mut EventMonitor) -> &Page {
        let slot = self
            .grid
            .first_free(Partition::Ram)
            .or_else(|| self.grid.first_free(Partition::Disk));

        if let Some(slot) = slot {
            self.grid.occupy(slot, key);
        } else {
            warn!(page = %key, "page grid full; page left unplaced");
        }

        let page = Page {
            key,
            on_disk: matches!(slot, Some(SlotId { partition: Partition::Disk, .. })),
            in_use,
            slot,
            swap: SwapState::None,
            source: None,
        };

        events.emit(Event::PageNew {
            pid: key.pid,
            idx: key.idx,
            swap: page.on_disk,
            in_use: page.in_use,
        });

        self.pages.entry(key).or_insert(page)
    }

    /// Flip the in-use flag, emitting `PAGE_USE`
    pub fn set_in_use(&mut self, key: PageKey, in_use: bool, events: &mut EventMonitor) {
        if let Some(page) = self.pages.get_mut(&key) {
            page.in_use = in_use;
            events.emit(Event::PageUse {
                pid: key.pid,
                idx: key.idx,
                in_use,
            });
        }
    }

    /// Queue a transfer for `key` toward the opposite partition.
    ///
    /// No-op if a swap is already queued or running. With `whole_row`, every
    /// other page resting in the same source row is requested as well.
    pub fn request_swap(&mut self, key: PageKey, whole_row: bool, events: &mut EventMonitor) {
        let Some(page) = self.pages.get_mut(&key) else {
            return;
        };
        if page.swap.is_pending() {
            return;
        }

        page.swap = SwapState::Queued;
        page.source = page.slot;
        if page.on_disk {
            self.swap_in_queue.push_back(key);
        } else {
            self.swap_out_queue.push_back(key);
        }
        let source = page.source;

        events.emit(Event::PageSwapQueue {
            pid: key.pid,
            idx: key.idx,
            waiting: true,
        });
        debug!(page = %key, "swap queued");

        if whole_row {
            if let Some(source) = source {
                for peer in self.grid.row_occupants(source) {
                    if peer != key {
                        self.request_swap(peer, false, events);
                    }
                }
            }
        }
    }

    /// Revoke a queued or running swap. A running transfer is rolled back:
    /// progress returns to zero and the destination reservation is released,
    /// leaving the page in its original slot.
    pub fn cancel_swap(&mut self, key: PageKey, whole_row: bool, events: &mut EventMonitor) {
        let Some(page) = self.pages.get_mut(&key) else {
            return;
        };

        match page.swap {
            SwapState::None => return,
            SwapState::Queued => {
                self.swap_in_queue.retain(|k| *k != key);
                self.swap_out_queue.retain(|k| *k != key);
            }
            SwapState::InProgress { destination, .. } => {
                self.grid.release(destination, key);
            }
        }

        page.swap = SwapState::None;
        let source = page.source.take();

        events.emit(Event::PageSwapQueue {
            pid: key.pid,
            idx: key.idx,
            waiting: false,
        });
        debug!(page = %key, "swap cancelled");

        if whole_row {
            if let Some(source) = source {
                for peer in self.grid.row_occupants(source) {
                    if peer != key {
                        self.cancel_swap(peer, false, events);
                    }
                }
            }
        }
    }

    /// Controller-facing toggle: cancel a pending swap, otherwise request one
    pub fn toggle_swap(&mut self, key: PageKey, events: &mut EventMonitor) {
        match self.pages.get(&key).map(|p| p.swap.is_pending()) {
            Some(true) => self.cancel_swap(key, false, events),
            Some(false) => self.request_swap(key, false, events),
            None => {}
        }
    }

    /// Remove a page entirely, vacating its slot and any reservation
    pub fn delete_page(&mut self, key: PageKey, events: &mut EventMonitor) {
        let Some(page) = self.pages.remove(&key) else {
            return;
        };

        if let Some(slot) = page.slot {
            self.grid.vacate(slot, key);
        }
        match page.swap {
            SwapState::InProgress { destination, .. } => self.grid.release(destination, key),
            SwapState::Queued => {
                self.swap_in_queue.retain(|k| *k != key);
                self.swap_out_queue.retain(|k| *k != key);
            }
            SwapState::None => {}
        }

        events.emit(Event::PageFree {
            pid: key.pid,
            idx: key.idx,
        });
    }

    /// Advance swap transfers to `now`.
    ///
    /// Running transfers progress (and complete) first, so a slot finalized
    /// on this tick is immediately available to the next queued request.
    /// Directions never overlap: swap-ins wait for running swap-outs to
    /// drain, and a swap-out only starts when no swap-in is running or could
    /// start.
    pub fn advance_swap_queues(&mut self, now: Timestamp, events: &mut EventMonitor) {
        self.progress_transfers(now, events);

        let mut swap_ins = self.in_progress(true);
        let mut swap_outs = self.in_progress(false);

        if swap_outs == 0 {
            while swap_ins < self.parallel_swaps {
                if !self.start_next(true, now, events) {
                    break;
                }
                swap_ins += 1;
            }
        }

        let swap_in_startable =
            !self.swap_in_queue.is_empty() && self.grid.first_free(Partition::Ram).is_some();
        if swap_ins == 0 && !swap_in_startable {
            while swap_outs < self.parallel_swaps {
                if !self.start_next(false, now, events) {
                    break;
                }
                swap_outs += 1;
            }
        }
    }

    fn in_progress(&self, swap_in: bool) -> usize {
        self.pages
            .values()
            .filter(|p| p.swap.is_in_progress() && p.on_disk == swap_in)
            .count()
    }

    /// Start the next queued transfer in one direction. Returns false when no
    /// destination slot is free or the queue holds nothing startable.
    fn start_next(&mut self, swap_in: bool, now: Timestamp, events: &mut EventMonitor) -> bool {
        let target = if swap_in {
            Partition::Ram
        } else {
            Partition::Disk
        };

        loop {
            let Some(destination) = self.grid.first_free(target) else {
                return false;
            };
            let queue = if swap_in {
                &mut self.swap_in_queue
            } else {
                &mut self.swap_out_queue
            };
            let Some(key) = queue.pop_front() else {
                return false;
            };

            let Some(page) = self.pages.get_mut(&key) else {
                continue;
            };
            if page.swap != SwapState::Queued || page.on_disk != swap_in {
                continue;
            }

            page.swap = SwapState::InProgress {
                started_at: now,
                destination,
                progress: 0.0,
            };
            self.grid.reserve(destination, key);

            events.emit(Event::PageSwapStart {
                pid: key.pid,
                idx: key.idx,
            });
            debug!(page = %key, swap_in, "swap started");
            return true;
        }
    }

    fn progress_transfers(&mut self, now: Timestamp, events: &mut EventMonitor) {
        let delay = self.swap_delay_ms;
        let mut completed = Vec::new();

        for page in self.pages.values_mut() {
            if let SwapState::InProgress {
                started_at,
                destination,
                ref mut progress,
            } = page.swap
            {
                *progress = if delay == 0 {
                    1.0
                } else {
                    (elapsed_ms(now, started_at) as f64 / delay as f64).min(1.0)
                };
                if *progress >= 1.0 {
                    completed.push((page.key, destination));
                }
            }
        }

        for (key, destination) in completed {
            self.complete_transfer(key, destination, events);
        }
    }

    fn complete_transfer(&mut self, key: PageKey, destination: SlotId, events: &mut EventMonitor) {
        let Some(page) = self.pages.get_mut(&key) else {
            return;
        };

        if let Some(source) = page.slot {
            self.grid.vacate(source, key);
        }
        self.grid.release(destination, key);
        self.grid.occupy(destination, key);

        page.slot = Some(destination);
        page.on_disk = destination.partition == Partition::Disk;
        page.swap = SwapState::None;
        page.source = None;
        self.swaps_completed += 1;

        events.emit(Event::PageSwap {
            pid: key.pid,
            idx: key.idx,
            swap: page.on_disk,
        });
        debug!(page = %key, on_disk = page.on_disk, "swap completed");
    }

    #[must_use]
    pub fn page(&self, key: PageKey) -> Option<&Page> {
        self.pages.get(&key)
    }

    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.values()
    }

    /// Pages owned by `pid`, in index order
    pub fn pages_of(&self, pid: Pid) -> impl Iterator<Item = &Page> {
        self.pages
            .range(PageKey::new(pid, 0)..=PageKey::new(pid, u8::MAX))
            .map(|(_, page)| page)
    }

    pub fn grid(&self) -> &PageSlotGrid {
        &self.grid
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> PagingStats {
        PagingStats {
            pages: self.pages.len(),
            ram_capacity: self.grid.capacity(Partition::Ram),
            disk_capacity: self.grid.capacity(Partition::Disk),
            ram_used: self.grid.used(Partition::Ram),
            disk_used: self.grid.used(Partition::Disk),
            swap_ins_queued: self.swap_in_queue.len(),
            swap_outs_queued: self.swap_out_queue.len(),
            swaps_in_progress: self.pages.values().filter(|p| p.swap.is_in_progress()).count(),
            swaps_completed: self.swaps_completed,
        }
    }
}
