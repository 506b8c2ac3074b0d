/*!
 * Event System
 * Strongly-typed semantic events buffered per tick
 */

use crate::core::types::{PageIdx, Pid};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Semantic record of an observable state change.
///
/// Serializes as `{"type": "PROC_CPU", "pid": 3, "cpu": true}` so external
/// controllers see the same shape regardless of transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    IoQueue {
        io_count: usize,
    },
    PageNew {
        pid: Pid,
        idx: PageIdx,
        swap: bool,
        #[serde(rename = "use")]
        in_use: bool,
    },
    PageUse {
        pid: Pid,
        idx: PageIdx,
        #[serde(rename = "use")]
        in_use: bool,
    },
    PageSwapQueue {
        pid: Pid,
        idx: PageIdx,
        waiting: bool,
    },
    PageSwapStart {
        pid: Pid,
        idx: PageIdx,
    },
    PageSwap {
        pid: Pid,
        idx: PageIdx,
        swap: bool,
    },
    PageFree {
        pid: Pid,
        idx: PageIdx,
    },
    ProcNew {
        pid: Pid,
    },
    ProcCpu {
        pid: Pid,
        cpu: bool,
    },
    ProcStarv {
        pid: Pid,
        starvation_level: u8,
    },
    ProcWaitIo {
        pid: Pid,
        waiting_for_io: bool,
    },
    ProcWaitPage {
        pid: Pid,
        waiting_for_page: bool,
    },
    /// Graceful self-termination
    ProcTerm {
        pid: Pid,
    },
    /// Forced termination (aging ceiling or external kill)
    ProcKill {
        pid: Pid,
    },
    /// Final removal after core release
    ProcEnd {
        pid: Pid,
    },
}

impl Event {
    /// Wire tag, e.g. `"PROC_KILL"`
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Event::IoQueue { .. } => "IO_QUEUE",
            Event::PageNew { .. } => "PAGE_NEW",
            Event::PageUse { .. } => "PAGE_USE",
            Event::PageSwapQueue { .. } => "PAGE_SWAP_QUEUE",
            Event::PageSwapStart { .. } => "PAGE_SWAP_START",
            Event::PageSwap { .. } => "PAGE_SWAP",
            Event::PageFree { .. } => "PAGE_FREE",
            Event::ProcNew { .. } => "PROC_NEW",
            Event::ProcCpu { .. } => "PROC_CPU",
            Event::ProcStarv { .. } => "PROC_STARV",
            Event::ProcWaitIo { .. } => "PROC_WAIT_IO",
            Event::ProcWaitPage { .. } => "PROC_WAIT_PAGE",
            Event::ProcTerm { .. } => "PROC_TERM",
            Event::ProcKill { .. } => "PROC_KILL",
            Event::ProcEnd { .. } => "PROC_END",
        }
    }
}

/// Append-only event buffer owned by the simulation, drained once per tick
#[derive(Debug, Default)]
pub struct EventMonitor {
    buffer: Vec<Event>,
    total_emitted: u64,
}

impl EventMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event
    pub fn emit(&mut self, event: Event) {
        trace!(kind = event.kind(), event = ?event, "event emitted");
        self.total_emitted += 1;
        self.buffer.push(event);
    }

    /// Take every buffered event, leaving the buffer empty
    #[must_use]
    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.buffer)
    }

    /// Events buffered since the last drain
    #[must_use]
    pub fn pending(&self) -> &[Event] {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Events emitted over the monitor's lifetime
    pub fn total_emitted(&self) -> u64 {
        self.total_emitted
    }
}
