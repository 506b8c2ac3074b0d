/*!
 * Aging Scenarios
 * Starvation climb, happiness reset and the aging kill
 */

use super::common::{quiet_sim, toggle};
use os_game_kernel::{
    Action, CpuConfig, Event, ExternalInput, InputCommand, Simulation, SimulationConfig,
};
use pretty_assertions::assert_eq;

fn starvation(events: &[Event]) -> Vec<(u32, u8)> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::ProcStarv {
                pid,
                starvation_level,
            } => Some((*pid, *starvation_level)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_continuous_run_resets_starvation_once() {
    let mut sim = quiet_sim(1, 5_000);
    assert_eq!(sim.spawn_process(), Some(1));
    sim.update(0, toggle(1));
    sim.drain_events();

    let mut resets = Vec::new();
    for now in (100..=30_000).step_by(100) {
        sim.update(now, ExternalInput::none());
        for change in starvation(&sim.drain_events()) {
            resets.push((now, change));
        }
    }

    assert_eq!(resets, vec![(5_000, (1, 0))]);
    assert_eq!(sim.processes().get(1).map(|p| p.starvation_level()), Some(0));
}

#[test]
fn test_contention_penalty_delays_happiness() {
    let config = SimulationConfig::quiet().with_cpu(CpuConfig::uniform(1, 2, 2_000, 3_000));
    let mut sim = Simulation::new(config).unwrap();
    sim.spawn_process();
    sim.spawn_process();
    sim.update(0, toggle(1).with(InputCommand::Apply(Action::Process { pid: 2 })));
    sim.drain_events();

    let mut first_reset = None;
    for now in (1_000..=10_000).step_by(1_000) {
        sim.update(now, ExternalInput::none());
        if first_reset.is_none() && starvation(&sim.drain_events()).contains(&(1, 0)) {
            first_reset = Some(now);
        }
    }
    // both hyperthreads busy: 2000ms base plus 3000ms penalty
    assert_eq!(first_reset, Some(5_000));
}

#[test]
fn test_neglected_process_is_killed_at_ceiling() {
    let config = SimulationConfig::quiet();
    let step = config.process.starvation_step_ms;
    let mut sim = Simulation::new(config).unwrap();
    sim.spawn_process();

    let mut levels = Vec::new();
    let mut killed_at = None;
    for now in (1_000..=step * 6).step_by(1_000) {
        sim.update(now, ExternalInput::none());
        let events = sim.drain_events();
        levels.extend(starvation(&events));
        if events.contains(&Event::ProcKill { pid: 1 }) {
            killed_at = Some(now);
            break;
        }
    }

    assert_eq!(levels, vec![(1, 2), (1, 3), (1, 4), (1, 5), (1, 6)]);
    assert_eq!(killed_at, Some(step * 5));
    assert!(sim.processes().get(1).is_none());
    assert_eq!(sim.stats().user_terminations, 1);
}

#[test]
fn test_starvation_stays_in_range() {
    let mut sim = Simulation::new(SimulationConfig::default().with_seed(5)).unwrap();
    for tick in 0..2_000u64 {
        sim.update(tick * 50, ExternalInput::none());
        for process in sim.processes().processes() {
            assert!(process.starvation_level() <= 5);
        }
        for event in sim.drain_events() {
            if let Event::ProcStarv {
                starvation_level, ..
            } = event
            {
                assert!(starvation_level <= 6);
            }
        }
    }
}
