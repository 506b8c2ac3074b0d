/*!
 * Process Manager
 * Live process table, arrivals and termination admission
 */

use super::budget::TerminationBudget;
use super::context::SystemContext;
use super::lifecycle::Process;
use super::types::{Liveness, ProcessKind, ProcessStats, Release};
use crate::config::ProcessConfig;
use crate::core::limits::{ARRIVAL_CHECK_INTERVAL_MS, STARTUP_SPAWN_INTERVAL_MS};
use crate::core::types::{elapsed_ms, Pid, Timestamp};
use crate::monitoring::{Event, EventMonitor};
use rand::Rng;
use std::collections::BTreeMap;
use tracing::debug;

/// Owns every live process, keyed and iterated by pid (creation order).
///
/// Pids start at 1 and are never reused. A killed process leaves the table on
/// the tick it is killed; a gracefully ended one leaves when it releases its
/// core.
#[derive(Debug, Clone)]
pub struct ProcessManager {
    processes: BTreeMap<Pid, Process>,
    next_pid: Pid,
    budget: TerminationBudget,
    max_processes: usize,
    startup_count: usize,
    created: u64,
    last_spawn: Option<Timestamp>,
    last_arrival_check: Timestamp,
}

impl ProcessManager {
    pub fn new(config: &ProcessConfig) -> Self {
        Self {
            processes: BTreeMap::new(),
            next_pid: 1,
            budget: TerminationBudget::from_config(config),
            max_processes: config.max_processes,
            startup_count: config.startup_count,
            created: 0,
            last_spawn: None,
            last_arrival_check: 0,
        }
    }

    /// Arrival step of a tick.
    ///
    /// The startup burst spawns one process per `STARTUP_SPAWN_INTERVAL_MS`
    /// until `startup_count` have been created. After that an arrival is
    /// rolled every `ARRIVAL_CHECK_INTERVAL_MS`, forced once
    /// `max_interarrival_ms` has passed since the last spawn.
    pub fn maybe_spawn(&mut self, ctx: &mut SystemContext<'_>) -> Option<Pid> {
        if (self.created as usize) < self.startup_count {
            let due = self
                .last_spawn
                .map_or(true, |t| elapsed_ms(ctx.now, t) >= STARTUP_SPAWN_INTERVAL_MS);
            if !due {
                return None;
            }
            self.last_arrival_check = ctx.now;
            return self.spawn(ctx);
        }

        if elapsed_ms(ctx.now, self.last_arrival_check) < ARRIVAL_CHECK_INTERVAL_MS {
            return None;
        }
        self.last_arrival_check = ctx.now;

        let overdue = match (ctx.config.max_interarrival_ms, self.last_spawn) {
            (Some(gap), Some(t)) => elapsed_ms(ctx.now, t) >= gap,
            (Some(gap), None) => ctx.now >= gap,
            (None, _) => false,
        };
        if overdue || ctx.rng.gen_bool(ctx.config.new_process_probability) {
            return self.spawn(ctx);
        }
        None
    }

    /// Create a process unless the live population is at its ceiling
    pub fn spawn(&mut self, ctx: &mut SystemContext<'_>) -> Option<Pid> {
        if self.processes.len() >= self.max_processes {
            debug!(live = self.processes.len(), "arrival skipped; population at ceiling");
            return None;
        }

        let (kind, step) = if ctx.rng.gen_bool(ctx.config.priority_probability) {
            (ProcessKind::Priority, ctx.config.priority_starvation_step_ms)
        } else {
            (ProcessKind::Normal, ctx.config.starvation_step_ms)
        };

        let pid = self.next_pid;
        self.next_pid += 1;
        self.created += 1;
        self.last_spawn = Some(ctx.now);
        self.processes.insert(pid, Process::new(pid, kind, step, ctx.now));

        ctx.events.emit(Event::ProcNew { pid });
        debug!(pid, ?kind, "process spawned");
        Some(pid)
    }

    /// Advance every live process in pid order, dropping those killed by aging
    pub fn advance_all(&mut self, ctx: &mut SystemContext<'_>) {
        let mut killed = Vec::new();
        for (pid, process) in self.processes.iter_mut() {
            if process.advance(ctx, &mut self.budget) == Liveness::Killed {
                killed.push(*pid);
            }
        }
        for pid in &killed {
            self.processes.remove(pid);
        }
    }

    /// Move `pid` onto a free core, or off its current core. Unknown pids and
    /// acquisitions without a free core are no-ops.
    pub fn toggle_core(&mut self, pid: Pid, ctx: &mut SystemContext<'_>) {
        let Some(process) = self.processes.get_mut(&pid) else {
            return;
        };
        if process.has_cpu() {
            if process.release_core(ctx) == Release::Removed {
                self.processes.remove(&pid);
            }
        } else {
            process.acquire_core(ctx);
        }
    }

    /// Externally requested kill; false if the pid is unknown, already ended
    /// or the kill capacity is spent
    pub fn kill(&mut self, pid: Pid, ctx: &mut SystemContext<'_>) -> bool {
        let Some(process) = self.processes.get_mut(&pid) else {
            return false;
        };
        if !process.force_kill(ctx, &mut self.budget, false) {
            return false;
        }
        self.processes.remove(&pid);
        true
    }

    pub fn block_on_io(&mut self, pid: Pid, ctx: &mut SystemContext<'_>) {
        if let Some(process) = self.processes.get_mut(&pid) {
            process.block_on_io(ctx);
        }
    }

    /// I/O completion for `pid`; ignored if the process is gone
    pub fn complete_io(&mut self, pid: Pid, now: Timestamp, events: &mut EventMonitor) {
        if let Some(process) = self.processes.get_mut(&pid) {
            process.complete_io(now, events);
        }
    }

    #[inline]
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.budget.user_exhausted()
    }

    #[inline]
    #[must_use]
    pub fn get(&self, pid: Pid) -> Option<&Process> {
        self.processes.get(&pid)
    }

    pub fn processes(&self) -> impl Iterator<Item = &Process> {
        self.processes.values()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.processes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn budget(&self) -> &TerminationBudget {
        &self.budget
    }

    #[must_use]
    pub fn stats(&self) -> ProcessStats {
        ProcessStats {
            live: self.processes.len(),
            created: self.created,
            graceful_terminations: self.budget.graceful_used(),
            user_terminations: self.budget.user_used(),
            remaining_user_terminations: self.budget.remaining_user(),
            last_pid: self.next_pid.checked_sub(1).filter(|pid| *pid > 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CpuConfig, IoConfig, MemoryConfig};
    use crate::cpu::CpuManager;
    use crate::io::IoQueue;
    use crate::memory::PageManager;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Fixture {
        cpu: CpuManager,
        pages: PageManager,
        io: IoQueue,
        events: EventMonitor,
        rng: StdRng,
        config: ProcessConfig,
    }

    impl Fixture {
        fn new(config: ProcessConfig) -> Self {
            Self {
                cpu: CpuManager::new(&CpuConfig::uniform(2, 1, 5_000, 0)),
                pages: PageManager::new(&MemoryConfig::default()),
                io: IoQueue::new(&IoConfig::default()),
                events: EventMonitor::new(),
                rng: StdRng::seed_from_u64(3),
                config,
            }
        }

        fn ctx(&mut self, now: Timestamp) -> SystemContext<'_> {
            SystemContext {
                now,
                cpu: &mut self.cpu,
                pages: &mut self.pages,
                io: &mut self.io,
                events: &mut self.events,
                rng: &mut self.rng,
                config: &self.config,
            }
        }
    }

    fn quiet() -> ProcessConfig {
        ProcessConfig {
            startup_count: 3,
            new_process_probability: 0.0,
            max_interarrival_ms: None,
            priority_probability: 0.0,
            io_probability: 0.0,
            new_page_probability: 0.0,
            graceful_termination_probability: 0.0,
            ..ProcessConfig::default()
        }
    }

    #[test]
    fn test_startup_burst_is_paced() {
        let mut fx = Fixture::new(quiet());
        let mut pm = ProcessManager::new(&fx.config);

        let mut spawned = Vec::new();
        for now in (0..=1_000).step_by(50) {
            if let Some(pid) = pm.maybe_spawn(&mut fx.ctx(now)) {
                spawned.push((now, pid));
            }
        }
        assert_eq!(spawned, vec![(0, 1), (100, 2), (200, 3)]);
        assert_eq!(pm.len(), 3);
    }

    #[test]
    fn test_interarrival_backstop() {
        let mut fx = Fixture::new(ProcessConfig {
            startup_count: 0,
            max_interarrival_ms: Some(3_000),
            ..quiet()
        });
        let mut pm = ProcessManager::new(&fx.config);

        let mut spawned = Vec::new();
        for now in (0..=7_000).step_by(100) {
            if let Some(pid) = pm.maybe_spawn(&mut fx.ctx(now)) {
                spawned.push((now, pid));
            }
        }
        assert_eq!(spawned, vec![(3_000, 1), (6_000, 2)]);
    }

    #[test]
    fn test_population_ceiling_skips_arrivals() {
        let mut fx = Fixture::new(ProcessConfig {
            max_processes: 2,
            startup_count: 2,
            ..quiet()
        });
        let mut pm = ProcessManager::new(&fx.config);
        assert_eq!(pm.spawn(&mut fx.ctx(0)), Some(1));
        assert_eq!(pm.spawn(&mut fx.ctx(0)), Some(2));
        assert_eq!(pm.spawn(&mut fx.ctx(0)), None);
        assert_eq!(pm.stats().created, 2);
    }

    #[test]
    fn test_pids_are_never_reused() {
        let mut fx = Fixture::new(quiet());
        let mut pm = ProcessManager::new(&fx.config);
        let first = pm.spawn(&mut fx.ctx(0));
        assert!(pm.kill(1, &mut fx.ctx(10)));
        let second = pm.spawn(&mut fx.ctx(20));
        assert_eq!((first, second), (Some(1), Some(2)));
        assert_eq!(pm.stats().last_pid, Some(2));
    }

    #[test]
    fn test_toggle_core_round_trip() {
        let mut fx = Fixture::new(quiet());
        let mut pm = ProcessManager::new(&fx.config);
        pm.spawn(&mut fx.ctx(0));

        pm.toggle_core(1, &mut fx.ctx(0));
        assert!(pm.get(1).is_some_and(Process::has_cpu));
        pm.toggle_core(1, &mut fx.ctx(10));
        assert!(pm.get(1).is_some_and(|p| !p.has_cpu()));
        assert_eq!(fx.cpu.occupied_count(), 0);

        // unknown pid
        fx.events.drain();
        pm.toggle_core(99, &mut fx.ctx(20));
        assert!(fx.events.is_empty());
    }

    #[test]
    fn test_kill_removes_immediately_and_counts() {
        let mut fx = Fixture::new(ProcessConfig {
            max_terminated_by_user: 1,
            ..quiet()
        });
        let mut pm = ProcessManager::new(&fx.config);
        pm.spawn(&mut fx.ctx(0));
        pm.spawn(&mut fx.ctx(0));
        pm.toggle_core(1, &mut fx.ctx(0));

        assert!(pm.kill(1, &mut fx.ctx(10)));
        assert!(pm.get(1).is_none());
        assert!(pm.is_game_over());
        assert!(!pm.kill(2, &mut fx.ctx(20)));
        assert!(pm.get(2).is_some());
        assert_eq!(pm.stats().remaining_user_terminations, 0);
    }

    #[test]
    fn test_aging_kill_leaves_table() {
        let mut fx = Fixture::new(ProcessConfig {
            starvation_step_ms: 1_000,
            ..quiet()
        });
        let mut pm = ProcessManager::new(&fx.config);
        pm.spawn(&mut fx.ctx(0));

        for now in (1_000..=5_000).step_by(1_000) {
            pm.advance_all(&mut fx.ctx(now));
        }
        assert!(pm.is_empty());
        assert_eq!(pm.stats().user_terminations, 1);
    }

    #[test]
    fn test_completion_for_dead_pid_is_ignored() {
        let mut fx = Fixture::new(quiet());
        let mut pm = ProcessManager::new(&fx.config);
        pm.spawn(&mut fx.ctx(0));
        fx.events.drain();
        pm.complete_io(1, 0, &mut fx.events);
        pm.complete_io(42, 0, &mut fx.events);
        assert!(fx.events.is_empty());
    }
}
