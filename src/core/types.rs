/*!
 * Core Types
 * Common identifiers and time units used across the simulation
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Process ID type (monotonic, never reused)
pub type Pid = u32;

/// Page index within its owning process
pub type PageIdx = u8;

/// Simulated wall-clock time in milliseconds
pub type Timestamp = u64;

/// Composite page key: owning process plus page index
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PageKey {
    pub pid: Pid,
    pub idx: PageIdx,
}

impl PageKey {
    #[inline]
    #[must_use]
    pub const fn new(pid: Pid, idx: PageIdx) -> Self {
        Self { pid, idx }
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.pid, self.idx)
    }
}

/// Milliseconds elapsed between two instants, saturating at zero
#[inline(always)]
#[must_use]
pub const fn elapsed_ms(now: Timestamp, since: Timestamp) -> u64 {
    now.saturating_sub(since)
}
