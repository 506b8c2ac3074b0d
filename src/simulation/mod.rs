/*!
 * Simulation Module
 * Tick entrypoint tying every subsystem together
 */

pub mod builder;
pub mod engine;
pub mod types;

pub use builder::SimulationBuilder;
pub use engine::Simulation;
pub use types::{ExternalInput, InputCommand, SimulationStats};
