/*!
 * Controller Traits
 * The pluggable scheduling boundary
 */

use super::shadow::ShadowState;
use super::types::{Action, StartupInfo};
use crate::core::errors::ControllerResult;
use crate::monitoring::Event;

/// An external scheduling policy.
///
/// Invoked once per tick, synchronously, with the events emitted since the
/// previous invocation and the shadow state already updated from them.
/// Errors and panics are contained by the bridge; the tick still completes.
pub trait Controller {
    fn name(&self) -> &str {
        "controller"
    }

    /// Called once before the first tick
    fn on_start(&mut self, _info: &StartupInfo) -> ControllerResult<()> {
        Ok(())
    }

    fn schedule(&mut self, state: &ShadowState, events: &[Event]) -> ControllerResult<Vec<Action>>;
}

// Closures are controllers
impl<F> Controller for F
where
    F: FnMut(&ShadowState, &[Event]) -> Vec<Action>,
{
    fn name(&self) -> &str {
        "closure"
    }

    fn schedule(&mut self, state: &ShadowState, events: &[Event]) -> ControllerResult<Vec<Action>> {
        Ok(self(state, events))
    }
}
