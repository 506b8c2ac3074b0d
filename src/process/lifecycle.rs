/*!
 * Process
 * Life-cycle and aging state machine for one simulated process
 *
 * # Aging
 *
 * Once per simulated second a process either earns a reset to level 0 (it has
 * held its core unblocked for the core's effective happiness duration) or, if
 * it is not happily running, climbs one starvation level per step. A process
 * already at the highest alive level is killed instead of climbing further.
 */

use super::budget::TerminationBudget;
use super::context::SystemContext;
use super::types::{EndKind, Liveness, ProcessKind, ProcessState, Release};
use crate::core::limits::{
    DEAD_STARVATION_LEVEL, INITIAL_STARVATION_LEVEL, MAX_ALIVE_STARVATION_LEVEL,
    MAX_PAGES_PER_PROCESS, MIN_STARVATION_LEVEL, PROCESS_TICK_MS,
};
use crate::core::types::{elapsed_ms, PageIdx, PageKey, Pid, Timestamp};
use crate::cpu::CoreId;
use crate::monitoring::{Event, EventMonitor};
use rand::Rng;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct Process {
    pid: Pid,
    kind: ProcessKind,
    starvation_step_ms: u64,
    starvation_level: u8,
    core: Option<CoreId>,
    waiting_for_io: bool,
    waiting_for_page: bool,
    ended: Option<EndKind>,
    pages: Vec<PageKey>,
    has_run: bool,
    last_state_change: Timestamp,
    last_starvation_change: Timestamp,
    last_tick: Timestamp,
}

impl Process {
    pub fn new(pid: Pid, kind: ProcessKind, starvation_step_ms: u64, now: Timestamp) -> Self {
        Self {
            pid,
            kind,
            starvation_step_ms,
            starvation_level: INITIAL_STARVATION_LEVEL,
            core: None,
            waiting_for_io: false,
            waiting_for_page: false,
            ended: None,
            pages: Vec::new(),
            has_run: false,
            last_state_change: now,
            last_starvation_change: now,
            last_tick: now,
        }
    }

    /// Take the first free logical core. No-op (returns false) if the process
    /// already runs, has ended, or every core is busy.
    pub fn acquire_core(&mut self, ctx: &mut SystemContext<'_>) -> bool {
        if self.core.is_some() || self.ended.is_some() {
            return false;
        }
        let Some(core) = ctx.cpu.select_free_logical_core() else {
            return false;
        };
        if !ctx.cpu.occupy(core, self.pid) {
            return false;
        }

        self.core = Some(core);
        self.last_state_change = ctx.now;
        ctx.events.emit(Event::ProcCpu {
            pid: self.pid,
            cpu: true,
        });
        debug!(pid = self.pid, core, "core acquired");

        if !self.has_run {
            self.has_run = true;
            let count = initial_page_count(ctx.rng.gen::<f64>());
            for _ in 0..count {
                self.create_page(ctx, false);
            }
        }
        for key in &self.pages {
            ctx.pages.set_in_use(*key, true, ctx.events);
        }
        true
    }

    /// Give the core back. An ended process is torn down here: its pages are
    /// freed and `PROC_END` is emitted.
    pub fn release_core(&mut self, ctx: &mut SystemContext<'_>) -> Release {
        let Some(core) = self.core.take() else {
            return Release::NotRunning;
        };
        ctx.cpu.vacate(core);
        self.last_state_change = ctx.now;
        ctx.events.emit(Event::ProcCpu {
            pid: self.pid,
            cpu: false,
        });
        for key in &self.pages {
            ctx.pages.set_in_use(*key, false, ctx.events);
        }
        debug!(pid = self.pid, core, "core released");

        if self.ended.is_some() {
            self.free_pages(ctx);
            ctx.events.emit(Event::ProcEnd { pid: self.pid });
            debug!(pid = self.pid, "process removed");
            return Release::Removed;
        }
        Release::Released
    }

    /// Per-tick update. Page blocking is refreshed every tick; aging and the
    /// behaviour rolls run once per simulated second.
    pub fn advance(
        &mut self,
        ctx: &mut SystemContext<'_>,
        budget: &mut TerminationBudget,
    ) -> Liveness {
        if self.ended.is_some() {
            return Liveness::Alive;
        }

        self.refresh_waiting_for_page(ctx);

        if elapsed_ms(ctx.now, self.last_tick) < PROCESS_TICK_MS {
            return Liveness::Alive;
        }
        self.last_tick = ctx.now;

        if self.update_aging(ctx, budget) == Liveness::Killed {
            return Liveness::Killed;
        }

        let config = ctx.config;
        if self.is_running_unblocked() && ctx.rng.gen_bool(config.io_probability) {
            self.block_on_io(ctx);
        }
        if self.core.is_some()
            && self.pages.len() < MAX_PAGES_PER_PROCESS
            && ctx.rng.gen_bool(config.new_page_probability)
        {
            self.create_page(ctx, true);
        }
        if self.is_running_unblocked() && ctx.rng.gen_bool(config.graceful_termination_probability) {
            self.terminate_gracefully(ctx, budget);
        }
        Liveness::Alive
    }

    fn update_aging(
        &mut self,
        ctx: &mut SystemContext<'_>,
        budget: &mut TerminationBudget,
    ) -> Liveness {
        if let (Some(core), false) = (self.core, self.is_blocked()) {
            let happiness = ctx.cpu.effective_happiness(core).unwrap_or(u64::MAX);
            if elapsed_ms(ctx.now, self.last_state_change) >= happiness {
                self.last_starvation_change = ctx.now;
                self.set_starvation_level(ctx, MIN_STARVATION_LEVEL);
            }
            return Liveness::Alive;
        }

        if elapsed_ms(ctx.now, self.last_starvation_change) < self.starvation_step_ms {
            return Liveness::Alive;
        }

        if self.starvation_level >= MAX_ALIVE_STARVATION_LEVEL {
            if self.force_kill(ctx, budget, true) {
                return Liveness::Killed;
            }
            return Liveness::Alive;
        }

        self.last_starvation_change = ctx.now;
        self.set_starvation_level(ctx, self.starvation_level + 1);
        Liveness::Alive
    }

    fn set_starvation_level(&mut self, ctx: &mut SystemContext<'_>, level: u8) {
        if self.starvation_level == level {
            return;
        }
        self.starvation_level = level;
        ctx.events.emit(Event::ProcStarv {
            pid: self.pid,
            starvation_level: level,
        });
    }

    fn refresh_waiting_for_page(&mut self, ctx: &mut SystemContext<'_>) {
        let waiting = self.core.is_some()
            && self.pages.iter().any(|key| {
                ctx.pages
                    .page(*key)
                    .is_some_and(|page| page.on_disk && !page.swap.is_pending())
            });
        if waiting == self.waiting_for_page {
            return;
        }
        self.waiting_for_page = waiting;
        self.last_state_change = ctx.now;
        ctx.events.emit(Event::ProcWaitPage {
            pid: self.pid,
            waiting_for_page: waiting,
        });
    }

    fn create_page(&mut self, ctx: &mut SystemContext<'_>, in_use: bool) {
        let key = PageKey::new(self.pid, self.pages.len() as PageIdx);
        ctx.pages.create_page(key, in_use, ctx.events);
        self.pages.push(key);
    }

    fn free_pages(&mut self, ctx: &mut SystemContext<'_>) {
        for key in self.pages.drain(..) {
            ctx.pages.delete_page(key, ctx.events);
        }
    }

    /// Exit on the process's own initiative. Only a running, unblocked
    /// process may end this way, and only if the budget admits it. Pages are
    /// kept until the core is released.
    pub fn terminate_gracefully(
        &mut self,
        ctx: &mut SystemContext<'_>,
        budget: &mut TerminationBudget,
    ) -> bool {
        if self.ended.is_some() || !self.is_running_unblocked() {
            return false;
        }
        if !budget.admit_graceful_termination() {
            return false;
        }

        self.ended = Some(EndKind::Gracefully);
        self.set_starvation_level(ctx, MIN_STARVATION_LEVEL);
        self.waiting_for_io = false;
        self.waiting_for_page = false;
        ctx.events.emit(Event::ProcTerm { pid: self.pid });
        info!(pid = self.pid, "process ended gracefully");
        true
    }

    /// Kill immediately: the core is vacated and every page freed without
    /// waiting for a release. Consumes user-termination capacity.
    pub fn force_kill(
        &mut self,
        ctx: &mut SystemContext<'_>,
        budget: &mut TerminationBudget,
        from_aging: bool,
    ) -> bool {
        if self.ended.is_some() {
            return false;
        }
        if !budget.admit_user_termination() {
            debug!(pid = self.pid, "kill refused; termination capacity exhausted");
            return false;
        }

        if from_aging {
            self.last_starvation_change = ctx.now;
            self.set_starvation_level(ctx, DEAD_STARVATION_LEVEL);
        }
        if let Some(core) = self.core.take() {
            ctx.cpu.vacate(core);
        }
        self.free_pages(ctx);
        self.ended = Some(EndKind::ByUser);
        ctx.events.emit(Event::ProcKill { pid: self.pid });
        info!(pid = self.pid, from_aging, "process killed");
        true
    }

    /// Enter the I/O-blocked state and register with the I/O queue
    pub fn block_on_io(&mut self, ctx: &mut SystemContext<'_>) {
        if self.waiting_for_io || self.ended.is_some() {
            return;
        }
        self.waiting_for_io = true;
        self.last_state_change = ctx.now;
        ctx.io.register_waiter(self.pid, ctx.now);
        ctx.events.emit(Event::ProcWaitIo {
            pid: self.pid,
            waiting_for_io: true,
        });
    }

    /// I/O completion callback; ignored once the process has ended
    pub fn complete_io(&mut self, now: Timestamp, events: &mut EventMonitor) {
        if !self.waiting_for_io || self.ended.is_some() {
            return;
        }
        self.waiting_for_io = false;
        self.last_state_change = now;
        events.emit(Event::ProcWaitIo {
            pid: self.pid,
            waiting_for_io: false,
        });
    }

    #[inline]
    #[must_use]
    pub fn pid(&self) -> Pid {
        self.pid
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> ProcessKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn starvation_level(&self) -> u8 {
        self.starvation_level
    }

    #[inline]
    #[must_use]
    pub fn core(&self) -> Option<CoreId> {
        self.core
    }

    #[inline]
    #[must_use]
    pub fn has_cpu(&self) -> bool {
        self.core.is_some()
    }

    #[inline]
    #[must_use]
    pub fn waiting_for_io(&self) -> bool {
        self.waiting_for_io
    }

    #[inline]
    #[must_use]
    pub fn waiting_for_page(&self) -> bool {
        self.waiting_for_page
    }

    #[inline]
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.waiting_for_io || self.waiting_for_page
    }

    #[inline]
    #[must_use]
    pub fn is_running_unblocked(&self) -> bool {
        self.core.is_some() && !self.is_blocked()
    }

    #[inline]
    #[must_use]
    pub fn ended(&self) -> Option<EndKind> {
        self.ended
    }

    #[inline]
    #[must_use]
    pub fn pages(&self) -> &[PageKey] {
        &self.pages
    }

    #[must_use]
    pub fn state(&self) -> ProcessState {
        match (self.ended, self.core) {
            (Some(EndKind::Gracefully), _) => ProcessState::EndedGraceful,
            (Some(EndKind::ByUser), _) => ProcessState::EndedByUser,
            _ if self.waiting_for_io => ProcessState::BlockedIo,
            (None, Some(_)) if self.waiting_for_page => ProcessState::BlockedPage,
            (None, Some(_)) => ProcessState::Running,
            (None, None) => ProcessState::Idle,
        }
    }
}

/// `1 + floor(4 * sqrt(u))` capped at the per-process limit; skewed toward
/// larger counts for `u` uniform in `[0, 1)`
fn initial_page_count(u: f64) -> usize {
    let count = 1 + (4.0 * u.clamp(0.0, 1.0).sqrt()).floor() as usize;
    count.min(MAX_PAGES_PER_PROCESS)
}
