/*!
 * Controller Scenarios
 * Fault containment, stale actions and the built-in greedy policy
 */

use super::common::{quiet_sim, recorder};
use os_game_kernel::{
    Action, ControllerError, ControllerResult, Controller, Event, ExternalInput,
    GreedyController, ShadowState, Simulation, SimulationConfig,
};
use pretty_assertions::assert_eq;

struct Flaky {
    calls: u32,
}

impl Controller for Flaky {
    fn name(&self) -> &str {
        "flaky"
    }

    fn schedule(&mut self, _: &ShadowState, _: &[Event]) -> ControllerResult<Vec<Action>> {
        self.calls += 1;
        match self.calls % 3 {
            0 => Err(ControllerError::Fault("odd tick".into())),
            1 => panic!("controller crashed"),
            _ => Ok(vec![Action::Process { pid: 1 }]),
        }
    }
}

#[test]
fn test_faulting_controller_never_stops_the_tick() {
    let mut sim = Simulation::builder()
        .with_config(SimulationConfig::quiet())
        .with_controller(Flaky { calls: 0 })
        .build()
        .unwrap();
    sim.spawn_process();

    for tick in 0..9u64 {
        sim.update(tick * 100, ExternalInput::none());
    }

    let bridge = sim.bridge().unwrap();
    assert_eq!(bridge.invocations(), 9);
    assert_eq!(bridge.faults(), 6);
    assert_eq!(sim.stats().ticks, 9);
    // the successful calls toggled pid 1 on, off and on again
    assert!(sim.processes().get(1).unwrap().has_cpu());
}

#[test]
fn test_stale_actions_are_noops() {
    let mut sim = quiet_sim(1, 5_000);
    sim.drain_events();
    sim.update(
        0,
        [
            Action::Process { pid: 77 },
            Action::Page { pid: 77, idx: 2 },
            Action::IoQueue,
        ]
        .into_iter()
        .collect(),
    );
    // draining an empty queue still reports the count
    assert_eq!(sim.drain_events(), vec![Event::IoQueue { io_count: 0 }]);
}

#[test]
fn test_toggle_without_free_core_is_noop() {
    let mut sim = quiet_sim(1, 5_000);
    sim.spawn_process();
    sim.spawn_process();
    sim.update(0, [Action::Process { pid: 1 }].into_iter().collect());
    sim.drain_events();

    sim.update(100, [Action::Process { pid: 2 }].into_iter().collect());
    assert!(sim.drain_events().is_empty());
    assert!(!sim.processes().get(2).unwrap().has_cpu());
}

#[test]
fn test_controller_receives_each_event_once() {
    let (controller, seen) = recorder();
    let mut sim = Simulation::builder()
        .with_config(SimulationConfig::default().with_seed(3))
        .with_controller(controller)
        .build()
        .unwrap();

    for tick in 0..200u64 {
        sim.update(tick * 100, ExternalInput::none());
    }

    let batches = seen.borrow();
    assert_eq!(batches.len(), 200);
    let spawned: Vec<u32> = batches
        .iter()
        .flatten()
        .filter_map(|e| match e {
            Event::ProcNew { pid } => Some(*pid),
            _ => None,
        })
        .collect();
    let expected: Vec<u32> = (1..=spawned.len() as u32).collect();
    assert_eq!(spawned, expected);
}

#[test]
fn test_greedy_controller_keeps_cores_busy() {
    let mut sim = Simulation::builder()
        .with_config(SimulationConfig::default().with_seed(21))
        .with_controller(GreedyController::new())
        .build()
        .unwrap();

    for tick in 0..1_200u64 {
        sim.update(tick * 50, ExternalInput::none());
        let cpu = sim.cpu();
        for core in cpu.logical_cores() {
            if let Some(pid) = core.occupant {
                assert_eq!(sim.processes().get(pid).and_then(|p| p.core()), Some(core.id));
            }
        }
    }

    let stats = sim.stats();
    assert!(stats.processes_created > 0);
    assert_eq!(stats.controller_faults, 0);
}
