/*!
 * Termination Budget
 * Admission control for graceful exits and user-attributed kills
 */

use crate::config::ProcessConfig;
use serde::{Deserialize, Serialize};

/// Separate capacities for the two ways a process can end.
///
/// `admit_*` only consumes capacity when it returns true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminationBudget {
    max_user: u32,
    user_used: u32,
    max_graceful: Option<u32>,
    graceful_used: u32,
}

impl TerminationBudget {
    pub fn new(max_user: u32, max_graceful: Option<u32>) -> Self {
        Self {
            max_user,
            user_used: 0,
            max_graceful,
            graceful_used: 0,
        }
    }

    pub fn from_config(config: &ProcessConfig) -> Self {
        Self::new(config.max_terminated_by_user, config.max_graceful_terminations)
    }

    pub fn admit_graceful_termination(&mut self) -> bool {
        match self.max_graceful {
            Some(max) if self.graceful_used >= max => false,
            _ => {
                self.graceful_used += 1;
                true
            }
        }
    }

    pub fn admit_user_termination(&mut self) -> bool {
        if self.user_used >= self.max_user {
            return false;
        }
        self.user_used += 1;
        true
    }

    pub fn graceful_used(&self) -> u32 {
        self.graceful_used
    }

    pub fn user_used(&self) -> u32 {
        self.user_used
    }

    pub fn remaining_user(&self) -> u32 {
        self.max_user.saturating_sub(self.user_used)
    }

    pub fn user_exhausted(&self) -> bool {
        self.user_used >= self.max_user
    }
}
