/*!
 * Simulation Types
 * External input and run statistics
 */

use crate::core::types::{PageIdx, PageKey, Pid, Timestamp};
use crate::scheduler::Action;
use serde::{Deserialize, Serialize};

/// One command from outside the engine, applied at the start of a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum InputCommand {
    /// Same semantics as a controller action
    Apply(Action),
    /// Swap request for a page and every page resting in its row
    SwapRow { pid: Pid, idx: PageIdx },
    Kill { pid: Pid },
}

impl InputCommand {
    #[inline]
    #[must_use]
    pub const fn swap_row(key: PageKey) -> Self {
        InputCommand::SwapRow {
            pid: key.pid,
            idx: key.idx,
        }
    }
}

/// Ordered commands for one tick
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalInput {
    pub commands: Vec<InputCommand>,
}

impl ExternalInput {
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, command: InputCommand) -> Self {
        self.commands.push(command);
        self
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl From<Vec<InputCommand>> for ExternalInput {
    fn from(commands: Vec<InputCommand>) -> Self {
        Self { commands }
    }
}

impl FromIterator<Action> for ExternalInput {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        Self {
            commands: iter.into_iter().map(InputCommand::Apply).collect(),
        }
    }
}

/// Point-in-time summary of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStats {
    pub now: Timestamp,
    pub ticks: u64,
    pub live_processes: usize,
    pub processes_created: u64,
    pub graceful_terminations: u32,
    pub user_terminations: u32,
    pub remaining_user_terminations: u32,
    pub ram_capacity: usize,
    pub disk_capacity: usize,
    pub ram_used: usize,
    pub disk_used: usize,
    pub swaps_completed: u64,
    pub io_waiting: usize,
    pub controller_faults: u64,
    pub game_over: bool,
}
