/*!
 * Process Types
 * Common types for the process life-cycle
 */

use crate::core::types::Pid;
use serde::{Deserialize, Serialize};

/// Observable process state, derived from core assignment and block flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// Waiting for a core
    Idle,
    /// Holding a core and unblocked
    Running,
    /// Waiting on an I/O completion
    BlockedIo,
    /// Holding a core while one of its pages sits on disk
    BlockedPage,
    /// Exited on its own; removed once it yields its core
    EndedGraceful,
    /// Killed by aging or an external request
    EndedByUser,
}

/// How a process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndKind {
    Gracefully,
    ByUser,
}

/// Process variant; only the starvation step differs between kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessKind {
    Normal,
    Priority,
}

/// Outcome of a per-tick advance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Alive,
    /// Killed this tick; must leave the live set immediately
    Killed,
}

/// Outcome of a core release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// The process held no core
    NotRunning,
    /// Core released; the process goes back to waiting
    Released,
    /// Core released by an ended process; it has been torn down
    Removed,
}

/// Aggregate population statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProcessStats {
    pub live: usize,
    pub created: u64,
    pub graceful_terminations: u32,
    pub user_terminations: u32,
    pub remaining_user_terminations: u32,
    pub last_pid: Option<Pid>,
}
