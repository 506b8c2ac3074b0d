/*!
 * I/O Scenarios
 * Controller-driven drain of the I/O queue
 */

use os_game_kernel::{
    Action, Event, ExternalInput, IoConfig, ShadowState, Simulation, SimulationConfig,
};
use pretty_assertions::assert_eq;

fn io_sim() -> Simulation {
    let config = SimulationConfig::quiet().with_io(IoConfig {
        check_interval_ms: 1_000,
        arrival_probability: 0.0,
        max_wait_ms: 1_000,
    });
    let mut sim = Simulation::builder()
        .with_config(config)
        .with_controller(|_: &ShadowState, events: &[Event]| -> Vec<Action> {
            let ready = events
                .iter()
                .any(|e| matches!(e, Event::IoQueue { io_count } if *io_count > 0));
            if ready {
                vec![Action::IoQueue]
            } else {
                Vec::new()
            }
        })
        .build()
        .unwrap();
    for _ in 0..3 {
        sim.spawn_process();
    }
    sim
}

#[test]
fn test_io_queue_action_wakes_every_available_waiter() {
    let mut sim = io_sim();
    for pid in 1..=3 {
        sim.block_on_io(pid);
    }
    sim.update(0, ExternalInput::none());
    assert_eq!(sim.io().waiting(), 3);

    // max wait reached: all three become available and the controller drains them
    sim.update(1_000, ExternalInput::none());
    assert_eq!(
        sim.pending_events(),
        &[
            Event::ProcWaitIo {
                pid: 1,
                waiting_for_io: false
            },
            Event::ProcWaitIo {
                pid: 2,
                waiting_for_io: false
            },
            Event::ProcWaitIo {
                pid: 3,
                waiting_for_io: false
            },
            Event::IoQueue { io_count: 0 },
        ]
    );
    assert_eq!(sim.io().waiting(), 0);
    assert!(sim.processes().processes().all(|p| !p.waiting_for_io()));

    sim.update(1_100, ExternalInput::none());
    let shadow = sim.shadow().unwrap();
    assert_eq!(shadow.io_count(), 0);
    assert!(shadow.processes().all(|p| !p.waiting_for_io));
}

#[test]
fn test_shadow_sees_available_completions() {
    let mut sim = Simulation::builder()
        .with_config(SimulationConfig::quiet().with_io(IoConfig {
            check_interval_ms: 1_000,
            arrival_probability: 1.0,
            max_wait_ms: 60_000,
        }))
        .with_controller(|_: &ShadowState, _: &[Event]| -> Vec<Action> { Vec::new() })
        .build()
        .unwrap();
    sim.spawn_process();
    sim.spawn_process();
    sim.block_on_io(1);
    sim.block_on_io(2);

    sim.update(1_000, ExternalInput::none());
    assert_eq!(sim.shadow().unwrap().io_count(), 1);
    sim.update(2_000, ExternalInput::none());
    assert_eq!(sim.shadow().unwrap().io_count(), 2);
    assert_eq!(sim.io().waiting(), 2);
}
