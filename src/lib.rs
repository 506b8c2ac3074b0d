/*!
 * OS Game Kernel Library
 * Tick-driven simulation of processes competing for cores, pages and I/O,
 * steered each tick by a pluggable controller
 */

pub mod config;
pub mod core;
pub mod cpu;
pub mod io;
pub mod memory;
pub mod monitoring;
pub mod process;
pub mod scheduler;
pub mod simulation;

// Re-exports
pub use config::{CoreConfig, CpuConfig, IoConfig, MemoryConfig, ProcessConfig, SimulationConfig};
pub use crate::core::errors::{ConfigError, ControllerError, ControllerResult, SimError, SimResult};
pub use crate::core::types::{PageIdx, PageKey, Pid, Timestamp};
pub use cpu::{CoreId, CpuManager};
pub use io::IoQueue;
pub use memory::{Page, PageManager, Partition, SlotId, SwapState};
pub use monitoring::{init_tracing, Event, EventMonitor};
pub use process::{Process, ProcessKind, ProcessManager, ProcessState};
pub use scheduler::{
    Action, Controller, GreedyController, SchedulerBridge, ShadowState, StartupInfo,
    SubprocessController,
};
pub use simulation::{ExternalInput, InputCommand, Simulation, SimulationBuilder, SimulationStats};
