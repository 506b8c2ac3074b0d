/*!
 * Built-in Strategies
 * Compiled-in controllers selectable without an external process
 */

use super::shadow::{ProcessView, ShadowState};
use super::traits::Controller;
use super::types::Action;
use crate::core::errors::ControllerResult;
use crate::monitoring::Event;
use std::cmp::Reverse;

/// Simple starvation-first policy.
///
/// Each tick it releases cores held by ended or I/O-blocked processes,
/// requests swap-in for in-use pages stuck on disk, fills free cores with
/// the most starved idle processes (lowest pid on ties) and drains the I/O
/// queue whenever completions are available.
#[derive(Debug, Clone, Default)]
pub struct GreedyController;

impl GreedyController {
    pub fn new() -> Self {
        Self
    }
}

fn runnable(process: &ProcessView) -> bool {
    !process.has_cpu && !process.has_ended && !process.waiting_for_io
}

impl Controller for GreedyController {
    fn name(&self) -> &str {
        "greedy"
    }

    fn schedule(&mut self, state: &ShadowState, _events: &[Event]) -> ControllerResult<Vec<Action>> {
        let mut actions = Vec::new();
        let mut free = state.free_cores();

        for process in state.processes().filter(|p| p.has_cpu) {
            if process.has_ended || process.waiting_for_io {
                actions.push(Action::Process { pid: process.pid });
                free += 1;
            }
        }

        for page in state.pages() {
            if page.in_use && page.on_disk && !page.swap_requested {
                actions.push(Action::page(page.key));
            }
        }

        let mut waiting: Vec<&ProcessView> = state.processes().filter(|p| runnable(p)).collect();
        waiting.sort_by_key(|p| (Reverse(p.starvation_level), p.pid));
        actions.extend(
            waiting
                .into_iter()
                .take(free)
                .map(|p| Action::Process { pid: p.pid }),
        );

        if state.io_count() > 0 {
            actions.push(Action::IoQueue);
        }
        Ok(actions)
    }
}
