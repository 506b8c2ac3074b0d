/*!
 * Simulation Engine
 * Owns every subsystem and drives them in a fixed order each tick
 *
 * # Tick order
 *
 * 1. External input commands, in the order given
 * 2. Process arrivals
 * 3. Each live process advances, in pid order
 * 4. Swap queues advance
 * 5. I/O arrivals are rolled
 * 6. The scheduler bridge drains the event buffer, runs the controller and
 *    its actions are applied to the engine
 *
 * Every subsystem observes the same `now` during one tick.
 */

use super::types::{ExternalInput, InputCommand, SimulationStats};
use crate::config::SimulationConfig;
use crate::core::errors::SimResult;
use crate::core::types::{PageKey, Pid, Timestamp};
use crate::cpu::CpuManager;
use crate::io::IoQueue;
use crate::memory::PageManager;
use crate::monitoring::{generate_run_id, span_tick, Event, EventMonitor};
use crate::process::{ProcessManager, SystemContext};
use crate::scheduler::{Action, Controller, SchedulerBridge, ShadowState, StartupInfo};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug)]
pub struct Simulation {
    run_id: Uuid,
    config: SimulationConfig,
    cpu: CpuManager,
    pages: PageManager,
    io: IoQueue,
    events: EventMonitor,
    rng: StdRng,
    processes: ProcessManager,
    bridge: Option<SchedulerBridge>,
    now: Timestamp,
    ticks: u64,
    game_over_logged: bool,
}

impl Simulation {
    /// Validate `config` and build an engine with no controller attached.
    /// Events accumulate until drained with [`Simulation::drain_events`].
    pub fn new(config: SimulationConfig) -> SimResult<Self> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let run_id = generate_run_id();
        info!(%run_id, seed = ?config.seed, "simulation created");

        Ok(Self {
            run_id,
            cpu: CpuManager::new(&config.cpu),
            pages: PageManager::new(&config.memory),
            io: IoQueue::new(&config.io),
            events: EventMonitor::new(),
            rng,
            processes: ProcessManager::new(&config.process),
            bridge: None,
            now: 0,
            ticks: 0,
            game_over_logged: false,
            config,
        })
    }

    /// Attach a controller, replacing any previous one. The controller
    /// receives the start-of-run constants immediately.
    pub fn attach_controller(&mut self, controller: Box<dyn Controller>) {
        let info = self.startup_info();
        info!(controller = controller.name(), "controller attached");
        self.bridge = Some(SchedulerBridge::new(controller, &info));
    }

    /// Advance the simulation to `now`
    pub fn update(&mut self, now: Timestamp, input: ExternalInput) {
        let span = span_tick(&self.run_id, now);
        let _guard = span.enter();

        self.now = now;
        self.ticks += 1;

        for command in input.commands {
            self.apply_command(command);
        }

        {
            let (processes, mut ctx) = self.parts();
            processes.maybe_spawn(&mut ctx);
            processes.advance_all(&mut ctx);
        }

        self.pages.advance_swap_queues(now, &mut self.events);
        self.io.update(now, &mut self.rng, &mut self.events);

        let actions = match self.bridge.as_mut() {
            Some(bridge) => {
                let events = self.events.drain();
                bridge.dispatch(&events)
            }
            None => Vec::new(),
        };
        for action in actions {
            self.apply_action(action);
        }

        if self.is_game_over() && !self.game_over_logged {
            self.game_over_logged = true;
            info!(
                now,
                kills = self.processes.budget().user_used(),
                "game over: termination capacity exhausted"
            );
        }
    }

    fn parts(&mut self) -> (&mut ProcessManager, SystemContext<'_>) {
        (
            &mut self.processes,
            SystemContext {
                now: self.now,
                cpu: &mut self.cpu,
                pages: &mut self.pages,
                io: &mut self.io,
                events: &mut self.events,
                rng: &mut self.rng,
                config: &self.config.process,
            },
        )
    }

    pub fn apply_command(&mut self, command: InputCommand) {
        match command {
            InputCommand::Apply(action) => self.apply_action(action),
            InputCommand::SwapRow { pid, idx } => self.request_swap(PageKey::new(pid, idx), true),
            InputCommand::Kill { pid } => {
                self.kill(pid);
            }
        }
    }

    /// Execute one action against the engine; stale references are no-ops
    pub fn apply_action(&mut self, action: Action) {
        debug!(?action, "applying action");
        match action {
            Action::Process { pid } => {
                let (processes, mut ctx) = self.parts();
                processes.toggle_core(pid, &mut ctx);
            }
            Action::Page { pid, idx } => {
                self.pages.toggle_swap(PageKey::new(pid, idx), &mut self.events);
            }
            Action::IoQueue => {
                let now = self.now;
                let processes = &mut self.processes;
                self.io.process_events(&mut self.events, |pid, events| {
                    processes.complete_io(pid, now, events);
                });
            }
        }
    }

    /// Request a swap for `key`, optionally for its whole source row
    pub fn request_swap(&mut self, key: PageKey, whole_row: bool) {
        self.pages.request_swap(key, whole_row, &mut self.events);
    }

    /// Kill `pid` immediately; false if unknown, ended or over capacity
    pub fn kill(&mut self, pid: Pid) -> bool {
        let (processes, mut ctx) = self.parts();
        processes.kill(pid, &mut ctx)
    }

    /// Take every buffered event not yet consumed by a controller
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }

    #[must_use]
    pub fn startup_info(&self) -> StartupInfo {
        StartupInfo {
            logical_cores: self.cpu.logical_count(),
            ram_capacity: self.config.ram_capacity(),
            disk_capacity: self.config.disk_capacity(),
            core_labels: self.cpu.core_labels(),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.processes.is_game_over()
    }

    #[must_use]
    pub fn stats(&self) -> SimulationStats {
        let process = self.processes.stats();
        let paging = self.pages.stats();
        SimulationStats {
            now: self.now,
            ticks: self.ticks,
            live_processes: process.live,
            processes_created: process.created,
            graceful_terminations: process.graceful_terminations,
            user_terminations: process.user_terminations,
            remaining_user_terminations: process.remaining_user_terminations,
            ram_capacity: paging.ram_capacity,
            disk_capacity: paging.disk_capacity,
            ram_used: paging.ram_used,
            disk_used: paging.disk_used,
            swaps_completed: paging.swaps_completed,
            io_waiting: self.io.waiting(),
            controller_faults: self.bridge.as_ref().map_or(0, SchedulerBridge::faults),
            game_over: self.is_game_over(),
        }
    }

    #[inline]
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    #[inline]
    #[must_use]
    pub fn now(&self) -> Timestamp {
        self.now
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn processes(&self) -> &ProcessManager {
        &self.processes
    }

    #[inline]
    #[must_use]
    pub fn pages(&self) -> &PageManager {
        &self.pages
    }

    #[inline]
    #[must_use]
    pub fn cpu(&self) -> &CpuManager {
        &self.cpu
    }

    #[inline]
    #[must_use]
    pub fn io(&self) -> &IoQueue {
        &self.io
    }

    #[inline]
    #[must_use]
    pub fn pending_events(&self) -> &[Event] {
        self.events.pending()
    }

    /// Controller-visible mirror, if a controller is attached
    #[inline]
    #[must_use]
    pub fn shadow(&self) -> Option<&ShadowState> {
        self.bridge.as_ref().map(SchedulerBridge::shadow)
    }

    #[inline]
    #[must_use]
    pub fn bridge(&self) -> Option<&SchedulerBridge> {
        self.bridge.as_ref()
    }

    /// Spawn a process outside the arrival model; `None` at the population
    /// ceiling
    pub fn spawn_process(&mut self) -> Option<Pid> {
        let (processes, mut ctx) = self.parts();
        processes.spawn(&mut ctx)
    }

    /// Force `pid` into the I/O-blocked state
    pub fn block_on_io(&mut self, pid: Pid) {
        let (processes, mut ctx) = self.parts();
        processes.block_on_io(pid, &mut ctx);
    }
}
