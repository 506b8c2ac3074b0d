/*!
 * Scheduler Bridge
 * Drains the tick's events into the shadow state and invokes the controller
 *
 * Controller faults never escape: both `Err` returns and panics are caught
 * here, at start-up as well as on every tick. A tick fault is logged with the
 * event batch and the tick proceeds with no actions. The controller is
 * invoked again on the next tick.
 */

use super::shadow::ShadowState;
use super::traits::Controller;
use super::types::{Action, StartupInfo};
use crate::core::errors::ControllerError;
use crate::monitoring::{span_controller, Event};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, warn};

pub struct SchedulerBridge {
    controller: Box<dyn Controller>,
    shadow: ShadowState,
    invocations: u64,
    faults: u64,
    last_fault: Option<ControllerError>,
}

impl SchedulerBridge {
    /// Wrap `controller` and hand it the start-of-run constants
    pub fn new(mut controller: Box<dyn Controller>, info: &StartupInfo) -> Self {
        let mut faults = 0;
        let mut last_fault = None;
        let started = catch_unwind(AssertUnwindSafe(|| controller.on_start(info)))
            .unwrap_or_else(|payload| Err(ControllerError::Panicked(panic_message(payload))));
        if let Err(err) = started {
            warn!(controller = controller.name(), error = %err, "controller start failed");
            faults += 1;
            last_fault = Some(err);
        }
        Self {
            controller,
            shadow: ShadowState::new(info),
            invocations: 0,
            faults,
            last_fault,
        }
    }

    /// Fold `events` into the shadow state and ask the controller for this
    /// tick's actions. A faulting controller yields no actions.
    pub fn dispatch(&mut self, events: &[Event]) -> Vec<Action> {
        self.shadow.apply_all(events);
        self.invocations += 1;

        let span = span_controller(self.controller.name(), events.len());
        let _guard = span.enter();

        let controller = &mut self.controller;
        let shadow = &self.shadow;
        let outcome = catch_unwind(AssertUnwindSafe(|| controller.schedule(shadow, events)))
            .unwrap_or_else(|payload| Err(ControllerError::Panicked(panic_message(payload))));

        match outcome {
            Ok(actions) => {
                span.record("actions", actions.len());
                debug!(actions = actions.len(), "controller returned");
                actions
            }
            Err(err) => {
                self.faults += 1;
                warn!(
                    controller = self.controller.name(),
                    error = %err,
                    events = %serde_json::to_string(events).unwrap_or_default(),
                    "controller fault; tick continues without actions"
                );
                self.last_fault = Some(err);
                Vec::new()
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn shadow(&self) -> &ShadowState {
        &self.shadow
    }

    #[inline]
    #[must_use]
    pub fn controller_name(&self) -> &str {
        self.controller.name()
    }

    #[inline]
    #[must_use]
    pub fn invocations(&self) -> u64 {
        self.invocations
    }

    #[inline]
    #[must_use]
    pub fn faults(&self) -> u64 {
        self.faults
    }

    #[inline]
    #[must_use]
    pub fn last_fault(&self) -> Option<&ControllerError> {
        self.last_fault.as_ref()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

impl std::fmt::Debug for SchedulerBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulerBridge")
            .field("controller", &self.controller.name())
            .field("invocations", &self.invocations)
            .field("faults", &self.faults)
            .finish()
    }
}
