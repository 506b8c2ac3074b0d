/*!
 * Engine Invariants
 * Property tests over random seeds, topologies and controller behaviour
 */

use os_game_kernel::{
    Action, CpuConfig, Event, ExternalInput, MemoryConfig, PageKey, Partition, ShadowState,
    Simulation, SimulationConfig, SwapState,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Controller issuing a random mix of valid and stale actions
fn chaotic(seed: u64) -> impl FnMut(&ShadowState, &[Event]) -> Vec<Action> + 'static {
    let mut rng = StdRng::seed_from_u64(seed);
    move |state: &ShadowState, _: &[Event]| -> Vec<Action> {
        let pids: Vec<u32> = state.processes().map(|p| p.pid).collect();
        let pages: Vec<PageKey> = state.pages().map(|p| p.key).collect();
        let mut actions = Vec::new();
        for _ in 0..rng.gen_range(0..4) {
            let action = match rng.gen_range(0..10) {
                0..=4 if !pids.is_empty() => Action::Process {
                    pid: pids[rng.gen_range(0..pids.len())],
                },
                5..=7 if !pages.is_empty() => Action::page(pages[rng.gen_range(0..pages.len())]),
                8 => Action::IoQueue,
                _ => Action::Process {
                    pid: rng.gen_range(1..500),
                },
            };
            actions.push(action);
        }
        actions
    }
}

fn check_invariants(sim: &Simulation) -> Result<(), TestCaseError> {
    let cpu = sim.cpu();
    let pages = sim.pages();
    let parallel = sim.config().memory.parallel_swaps;

    for process in sim.processes().processes() {
        prop_assert!(process.starvation_level() <= 5);
        prop_assert!(process.pages().len() <= 4);
        if let Some(core) = process.core() {
            prop_assert_eq!(cpu.occupant(core), Some(process.pid()));
        }
        for key in process.pages() {
            prop_assert!(pages.page(*key).is_some());
        }
    }

    let mut occupied = 0;
    for core in cpu.logical_cores() {
        if let Some(pid) = core.occupant {
            occupied += 1;
            let holder = sim.processes().get(pid).and_then(|p| p.core());
            prop_assert_eq!(holder, Some(core.id));
        }
    }
    let running = sim.processes().processes().filter(|p| p.has_cpu()).count();
    prop_assert_eq!(occupied, running);

    let grid = pages.grid();
    prop_assert_eq!(
        grid.used(Partition::Ram) + grid.used(Partition::Disk),
        pages.len()
    );
    let mut swap_ins = 0;
    let mut swap_outs = 0;
    for page in pages.pages() {
        let slot = page.slot.and_then(|id| grid.slot(id));
        prop_assert_eq!(slot.and_then(|s| s.page), Some(page.key));
        prop_assert!(sim.processes().get(page.key.pid).is_some());
        if let SwapState::InProgress { progress, .. } = page.swap {
            prop_assert!((0.0..1.0).contains(&progress));
            if page.on_disk {
                swap_ins += 1;
            } else {
                swap_outs += 1;
            }
        }
    }
    prop_assert!(swap_ins <= parallel);
    prop_assert!(swap_outs <= parallel);
    prop_assert!(swap_ins == 0 || swap_outs == 0);
    Ok(())
}

fn config(
    seed: u64,
    physical: usize,
    threads: u32,
    parallel: usize,
    swap_delay_ms: u64,
) -> SimulationConfig {
    let mut config = SimulationConfig::default()
        .with_seed(seed)
        .with_cpu(CpuConfig::uniform(physical, threads, 3_000, 1_000))
        .with_memory(MemoryConfig {
            ram_rows: 1,
            disk_rows: 10,
            slots_per_row: 16,
            swap_delay_ms,
            parallel_swaps: parallel,
        });
    config.process.new_process_probability = 0.3;
    config.process.io_probability = 0.05;
    config.process.new_page_probability = 0.05;
    config.process.graceful_termination_probability = 0.02;
    config.process.max_terminated_by_user = 1_000;
    config.io.arrival_probability = 0.5;
    config
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_engine_invariants_hold_every_tick(
        seed in any::<u64>(),
        physical in 1usize..4,
        threads in 1u32..3,
        parallel in 1usize..4,
        swap_delay_ms in 50u64..600,
    ) {
        let mut sim = Simulation::builder()
            .with_config(config(seed, physical, threads, parallel, swap_delay_ms))
            .with_controller(chaotic(seed ^ 0x5eed))
            .build()
            .unwrap();

        for tick in 0..600u64 {
            sim.update(tick * 100, ExternalInput::none());
            check_invariants(&sim)?;
        }
    }

    #[test]
    fn prop_starvation_events_stay_in_range(seed in any::<u64>()) {
        let mut sim = Simulation::new(config(seed, 1, 1, 1, 100)).unwrap();
        for tick in 0..400u64 {
            sim.update(tick * 250, ExternalInput::none());
            for event in sim.drain_events() {
                if let Event::ProcStarv { starvation_level, .. } = event {
                    prop_assert!(starvation_level <= 6);
                }
            }
        }
    }
}
