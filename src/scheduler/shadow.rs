/*!
 * Shadow State
 * Controller-facing mirror of the engine, rebuilt only from events
 *
 * The mirror never aliases engine entities. Events that reference a process
 * or page the mirror no longer holds are ignored: events and removals can
 * race within one tick.
 */

use super::types::StartupInfo;
use crate::core::types::{PageIdx, PageKey, Pid};
use crate::monitoring::Event;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessView {
    pub pid: Pid,
    pub has_cpu: bool,
    pub starvation_level: u8,
    pub waiting_for_io: bool,
    pub waiting_for_page: bool,
    /// Ended gracefully and waiting to release its core
    pub has_ended: bool,
    pub pages: BTreeSet<PageIdx>,
}

impl ProcessView {
    fn new(pid: Pid) -> Self {
        Self {
            pid,
            has_cpu: false,
            starvation_level: crate::core::limits::INITIAL_STARVATION_LEVEL,
            waiting_for_io: false,
            waiting_for_page: false,
            has_ended: false,
            pages: BTreeSet::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.waiting_for_io || self.waiting_for_page
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageView {
    pub key: PageKey,
    pub on_disk: bool,
    pub in_use: bool,
    pub swap_requested: bool,
    pub swap_in_progress: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShadowState {
    processes: BTreeMap<Pid, ProcessView>,
    pages: BTreeMap<PageKey, PageView>,
    io_count: usize,
    logical_cores: usize,
}

impl ShadowState {
    pub fn new(info: &StartupInfo) -> Self {
        Self {
            logical_cores: info.logical_cores,
            ..Self::default()
        }
    }

    /// Fold a batch of events into the mirror, in order
    pub fn apply_all<'a>(&mut self, events: impl IntoIterator<Item = &'a Event>) {
        for event in events {
            self.apply(event);
        }
    }

    pub fn apply(&mut self, event: &Event) {
        match *event {
            Event::IoQueue { io_count } => self.io_count = io_count,
            Event::PageNew {
                pid,
                idx,
                swap,
                in_use,
            } => {
                let Some(process) = self.processes.get_mut(&pid) else {
                    return;
                };
                process.pages.insert(idx);
                let key = PageKey::new(pid, idx);
                self.pages.insert(
                    key,
                    PageView {
                        key,
                        on_disk: swap,
                        in_use,
                        swap_requested: false,
                        swap_in_progress: false,
                    },
                );
            }
            Event::PageUse { pid, idx, in_use } => {
                if let Some(page) = self.pages.get_mut(&PageKey::new(pid, idx)) {
                    page.in_use = in_use;
                }
            }
            Event::PageSwapQueue { pid, idx, waiting } => {
                if let Some(page) = self.pages.get_mut(&PageKey::new(pid, idx)) {
                    page.swap_requested = waiting;
                    if !waiting {
                        page.swap_in_progress = false;
                    }
                }
            }
            Event::PageSwapStart { pid, idx } => {
                if let Some(page) = self.pages.get_mut(&PageKey::new(pid, idx)) {
                    page.swap_in_progress = true;
                }
            }
            Event::PageSwap { pid, idx, swap } => {
                if let Some(page) = self.pages.get_mut(&PageKey::new(pid, idx)) {
                    page.on_disk = swap;
                    page.swap_requested = false;
                    page.swap_in_progress = false;
                }
            }
            Event::PageFree { pid, idx } => {
                self.pages.remove(&PageKey::new(pid, idx));
                if let Some(process) = self.processes.get_mut(&pid) {
                    process.pages.remove(&idx);
                }
            }
            Event::ProcNew { pid } => {
                self.processes.entry(pid).or_insert_with(|| ProcessView::new(pid));
            }
            Event::ProcCpu { pid, cpu } => {
                if let Some(process) = self.processes.get_mut(&pid) {
                    process.has_cpu = cpu;
                }
            }
            Event::ProcStarv {
                pid,
                starvation_level,
            } => {
                if let Some(process) = self.processes.get_mut(&pid) {
                    process.starvation_level = starvation_level;
                }
            }
            Event::ProcWaitIo {
                pid,
                waiting_for_io,
            } => {
                if let Some(process) = self.processes.get_mut(&pid) {
                    process.waiting_for_io = waiting_for_io;
                }
            }
            Event::ProcWaitPage {
                pid,
                waiting_for_page,
            } => {
                if let Some(process) = self.processes.get_mut(&pid) {
                    process.waiting_for_page = waiting_for_page;
                }
            }
            Event::ProcTerm { pid } => {
                if let Some(process) = self.processes.get_mut(&pid) {
                    process.has_ended = true;
                    process.waiting_for_io = false;
                    process.waiting_for_page = false;
                }
            }
            Event::ProcKill { pid } | Event::ProcEnd { pid } => self.remove_process(pid),
        }
    }

    fn remove_process(&mut self, pid: Pid) {
        if let Some(process) = self.processes.remove(&pid) {
            for idx in process.pages {
                self.pages.remove(&PageKey::new(pid, idx));
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn process(&self, pid: Pid) -> Option<&ProcessView> {
        self.processes.get(&pid)
    }

    /// Processes in pid order
    pub fn processes(&self) -> impl Iterator<Item = &ProcessView> {
        self.processes.values()
    }

    #[inline]
    #[must_use]
    pub fn page(&self, key: PageKey) -> Option<&PageView> {
        self.pages.get(&key)
    }

    pub fn pages(&self) -> impl Iterator<Item = &PageView> {
        self.pages.values()
    }

    pub fn pages_of(&self, pid: Pid) -> impl Iterator<Item = &PageView> {
        self.pages
            .range(PageKey::new(pid, PageIdx::MIN)..=PageKey::new(pid, PageIdx::MAX))
            .map(|(_, page)| page)
    }

    #[inline]
    #[must_use]
    pub fn io_count(&self) -> usize {
        self.io_count
    }

    #[inline]
    #[must_use]
    pub fn logical_cores(&self) -> usize {
        self.logical_cores
    }

    /// Cores not held by any mirrored process
    #[must_use]
    pub fn free_cores(&self) -> usize {
        let busy = self.processes.values().filter(|p| p.has_cpu).count();
        self.logical_cores.saturating_sub(busy)
    }
}
