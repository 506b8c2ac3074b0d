/*!
 * Scheduler Types
 * Controller commands and start-of-run constants
 */

use crate::core::types::{PageIdx, PageKey, Pid};
use serde::{Deserialize, Serialize};

/// Command returned by a controller.
///
/// Wire shape: `{"type":"process","pid":3}`, `{"type":"page","pid":3,"idx":1}`,
/// `{"type":"io_queue"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Toggle core occupancy for `pid`
    Process { pid: Pid },
    /// Request a swap for the page, or cancel a pending one
    Page { pid: Pid, idx: PageIdx },
    /// Drain available I/O completions
    IoQueue,
}

impl Action {
    #[inline]
    #[must_use]
    pub const fn page(key: PageKey) -> Self {
        Action::Page {
            pid: key.pid,
            idx: key.idx,
        }
    }
}

/// Constants handed to a controller before the first tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartupInfo {
    pub logical_cores: usize,
    pub ram_capacity: usize,
    pub disk_capacity: usize,
    /// One label per logical core, in core-id order
    pub core_labels: Vec<String>,
}
