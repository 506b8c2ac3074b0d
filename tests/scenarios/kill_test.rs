/*!
 * Kill Scenarios
 * Immediate teardown versus the two-phase graceful end
 */

use super::common::recorder;
use os_game_kernel::{
    Action, CpuConfig, Event, ExternalInput, InputCommand, PageKey, Simulation, SimulationConfig,
};
use pretty_assertions::assert_eq;

/// Run every spawned process onto its own core and return the first pid
/// that ended up owning exactly `pages` pages
fn process_with_pages(sim: &mut Simulation, pages: usize) -> u32 {
    let capacity = sim.config().process.max_processes;
    let input: ExternalInput = (1..=capacity as u32)
        .map(|pid| Action::Process { pid })
        .collect();
    for _ in 0..capacity {
        sim.spawn_process();
    }
    sim.update(0, input);
    sim.processes()
        .processes()
        .find(|p| p.pages().len() == pages)
        .map(|p| p.pid())
        .expect("some process drew the requested page count")
}

fn wide_config() -> SimulationConfig {
    SimulationConfig::quiet().with_cpu(CpuConfig::uniform(42, 1, 5_000, 0))
}

#[test]
fn test_kill_frees_each_page_then_reports_kill() {
    let mut sim = Simulation::new(wide_config()).unwrap();
    let pid = process_with_pages(&mut sim, 2);
    sim.drain_events();

    assert!(sim.kill(pid));
    assert_eq!(
        sim.drain_events(),
        vec![
            Event::PageFree { pid, idx: 0 },
            Event::PageFree { pid, idx: 1 },
            Event::ProcKill { pid },
        ]
    );
    assert!(sim.processes().get(pid).is_none());
    assert!(sim.pages().page(PageKey::new(pid, 0)).is_none());
    assert_eq!(sim.cpu().occupied_count(), sim.processes().len());
}

#[test]
fn test_killed_process_leaves_shadow_on_the_same_tick() {
    let (controller, seen) = recorder();
    let mut sim = Simulation::builder()
        .with_config(wide_config())
        .with_controller(controller)
        .build()
        .unwrap();
    let pid = process_with_pages(&mut sim, 2);
    assert!(sim.shadow().unwrap().process(pid).is_some());

    sim.update(100, ExternalInput::none().with(InputCommand::Kill { pid }));
    assert!(sim.shadow().unwrap().process(pid).is_none());
    assert_eq!(sim.shadow().unwrap().pages_of(pid).count(), 0);

    let last = seen.borrow().last().cloned().unwrap_or_default();
    let frees = last
        .iter()
        .filter(|e| matches!(e, Event::PageFree { pid: p, .. } if *p == pid))
        .count();
    assert_eq!(frees, 2);
    assert_eq!(
        last.iter().filter(|e| matches!(e, Event::ProcKill { .. })).count(),
        1
    );
}

#[test]
fn test_kill_capacity_is_enforced() {
    let mut config = SimulationConfig::quiet();
    config.process.max_terminated_by_user = 1;
    let mut sim = Simulation::new(config).unwrap();
    sim.spawn_process();
    sim.spawn_process();

    assert!(sim.kill(1));
    assert!(sim.is_game_over());
    assert!(!sim.kill(2));
    assert!(sim.processes().get(2).is_some());
    assert!(!sim.kill(99));
}

#[test]
fn test_graceful_end_waits_for_core_release() {
    let mut config = wide_config();
    config.process.graceful_termination_probability = 1.0;
    config.process.max_processes = 1;
    let mut sim = Simulation::new(config).unwrap();
    sim.spawn_process();
    sim.update(0, ExternalInput::none().with(InputCommand::Apply(Action::Process { pid: 1 })));
    sim.drain_events();

    sim.update(1_000, ExternalInput::none());
    assert!(sim.drain_events().contains(&Event::ProcTerm { pid: 1 }));
    // still holding its core and pages
    let process = sim.processes().get(1).unwrap();
    assert!(process.has_cpu());
    assert!(!process.pages().is_empty());

    sim.update(1_100, ExternalInput::none().with(InputCommand::Apply(Action::Process { pid: 1 })));
    let events = sim.drain_events();
    assert_eq!(events.last(), Some(&Event::ProcEnd { pid: 1 }));
    assert!(sim.processes().is_empty());
    assert!(sim.pages().is_empty());
}
