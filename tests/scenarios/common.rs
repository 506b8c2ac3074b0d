/*!
 * Shared scenario helpers
 */

use os_game_kernel::{
    Action, CpuConfig, Event, ExternalInput, InputCommand, Pid, ShadowState, Simulation,
    SimulationConfig,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Quiet configuration on `cores` single-threaded cores
pub fn quiet_sim(cores: usize, happiness_ms: u64) -> Simulation {
    Simulation::new(SimulationConfig::quiet().with_cpu(CpuConfig::uniform(cores, 1, happiness_ms, 0)))
        .unwrap()
}

pub fn toggle(pid: Pid) -> ExternalInput {
    ExternalInput::none().with(InputCommand::Apply(Action::Process { pid }))
}

/// Controller that records every batch it sees and returns nothing
pub fn recorder() -> (
    impl FnMut(&ShadowState, &[Event]) -> Vec<Action> + 'static,
    Rc<RefCell<Vec<Vec<Event>>>>,
) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let controller = move |_: &ShadowState, events: &[Event]| -> Vec<Action> {
        sink.borrow_mut().push(events.to_vec());
        Vec::new()
    };
    (controller, seen)
}
