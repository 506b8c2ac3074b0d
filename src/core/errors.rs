/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors. Any of these refuses simulation start-up.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ConfigError {
    #[error("CPU topology has no physical cores")]
    #[diagnostic(
        code(config::no_cores),
        help("Declare at least one entry under `cpu.cores`.")
    )]
    NoCores,

    #[error("Physical core {core} declares zero logical threads")]
    #[diagnostic(
        code(config::no_threads),
        help("Each physical core needs at least one logical thread.")
    )]
    NoThreads { core: usize },

    #[error("Physical core {core} has a non-positive happiness duration")]
    #[diagnostic(
        code(config::happiness_duration),
        help("`happiness_ms` must be greater than zero.")
    )]
    InvalidHappiness { core: usize },

    #[error("Swap parallelism must be positive")]
    #[diagnostic(
        code(config::parallel_swaps),
        help("Set `memory.parallel_swaps` to 1 or more.")
    )]
    InvalidParallelSwaps,

    #[error("Memory grid needs at least one RAM row and one slot per row")]
    #[diagnostic(
        code(config::memory_grid),
        help("Set `memory.ram_rows` and `memory.slots_per_row` to 1 or more.")
    )]
    EmptyRam,

    #[error("Page capacity {capacity} cannot hold {required} pages ({max_processes} processes)")]
    #[diagnostic(
        code(config::page_capacity),
        help("Add RAM or disk rows, or lower `process.max_processes`.")
    )]
    InsufficientPageCapacity {
        capacity: usize,
        required: usize,
        max_processes: usize,
    },

    #[error("Probability `{field}` is outside [0, 1]")]
    #[diagnostic(
        code(config::probability),
        help("Probabilities are per-roll fractions between 0 and 1.")
    )]
    InvalidProbability { field: String },

    #[error("Duration `{field}` must be positive")]
    #[diagnostic(code(config::duration))]
    InvalidDuration { field: String },

    #[error("Process limits are inconsistent: {0}")]
    #[diagnostic(
        code(config::process_limits),
        help("`max_processes` must be positive and at least `startup_count`.")
    )]
    InvalidProcessLimits(String),

    #[error("Failed to parse configuration: {0}")]
    #[diagnostic(code(config::parse))]
    Parse(String),
}

/// Faults raised by an external controller during its per-tick invocation
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ControllerError {
    #[error("Controller fault: {0}")]
    #[diagnostic(code(controller::fault))]
    Fault(String),

    #[error("Controller panicked: {0}")]
    #[diagnostic(code(controller::panicked))]
    Panicked(String),

    #[error("Controller protocol violation: {0}")]
    #[diagnostic(
        code(controller::protocol),
        help("Controllers must answer each tick with one JSON array of actions.")
    )]
    Protocol(String),

    #[error("Controller I/O failed: {0}")]
    #[diagnostic(code(controller::io))]
    Io(String),

    #[error("Controller closed its output stream")]
    #[diagnostic(code(controller::closed))]
    Closed,
}

impl From<std::io::Error> for ControllerError {
    fn from(err: std::io::Error) -> Self {
        ControllerError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ControllerError {
    fn from(err: serde_json::Error) -> Self {
        ControllerError::Protocol(err.to_string())
    }
}

pub type ControllerResult<T> = Result<T, ControllerError>;

/// Unified simulation error type with miette diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum SimError {
    #[error("Configuration error: {0}")]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("Controller error: {0}")]
    #[diagnostic(transparent)]
    Controller(#[from] ControllerError),

    #[error("I/O error: {0}")]
    #[diagnostic(
        code(sim::io_error),
        help("Filesystem operation failed. Check the path and permissions.")
    )]
    Io(String),
}

impl From<std::io::Error> for SimError {
    fn from(err: std::io::Error) -> Self {
        SimError::Io(err.to_string())
    }
}

pub type SimResult<T> = Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_serializes_tagged() {
        let err = ConfigError::InvalidProbability {
            field: "io_probability".into(),
        };
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"error_type\":\"invalid_probability\""));
        assert!(json.contains("io_probability"));
    }

    #[test]
    fn test_sim_error_wraps_config() {
        let err: SimError = ConfigError::NoCores.into();
        assert!(matches!(err, SimError::Config(ConfigError::NoCores)));
        assert!(err.to_string().contains("no physical cores"));
    }
}
