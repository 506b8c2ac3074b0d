/*!
 * Simulation Builder
 * Builder pattern for Simulation construction
 */

use super::engine::Simulation;
use crate::config::SimulationConfig;
use crate::core::errors::SimResult;
use crate::scheduler::Controller;

/// Builder for [`Simulation`]
#[derive(Default)]
pub struct SimulationBuilder {
    config: SimulationConfig,
    seed: Option<u64>,
    controller: Option<Box<dyn Controller>>,
}

impl SimulationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: SimulationConfig) -> Self {
        self.config = config;
        self
    }

    /// Overrides any seed in the configuration
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_controller<C: Controller + 'static>(mut self, controller: C) -> Self {
        self.controller = Some(Box::new(controller));
        self
    }

    pub fn with_boxed_controller(mut self, controller: Box<dyn Controller>) -> Self {
        self.controller = Some(controller);
        self
    }

    /// Validate the configuration and build
    pub fn build(self) -> SimResult<Simulation> {
        let mut config = self.config;
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }

        let mut simulation = Simulation::new(config)?;
        if let Some(controller) = self.controller {
            simulation.attach_controller(controller);
        }
        Ok(simulation)
    }
}

impl Simulation {
    pub fn builder() -> SimulationBuilder {
        SimulationBuilder::new()
    }
}
