/*!
 * Configuration Types
 * Serializable settings for every simulated subsystem
 */

use crate::core::limits::DEFAULT_SLOTS_PER_ROW;
use serde::{Deserialize, Serialize};

/// Top-level simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SimulationConfig {
    pub cpu: CpuConfig,
    pub memory: MemoryConfig,
    pub io: IoConfig,
    pub process: ProcessConfig,
    /// RNG seed; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            cpu: CpuConfig::default(),
            memory: MemoryConfig::default(),
            io: IoConfig::default(),
            process: ProcessConfig::default(),
            seed: None,
        }
    }
}

impl SimulationConfig {
    #[inline]
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_cpu(mut self, cpu: CpuConfig) -> Self {
        self.cpu = cpu;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_memory(mut self, memory: MemoryConfig) -> Self {
        self.memory = memory;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_io(mut self, io: IoConfig) -> Self {
        self.io = io;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_process(mut self, process: ProcessConfig) -> Self {
        self.process = process;
        self
    }

    /// Fully deterministic configuration: no random arrivals, blocks or exits.
    ///
    /// Useful for driving the engine by hand from tests or tools.
    #[must_use]
    pub fn quiet() -> Self {
        Self {
            io: IoConfig {
                arrival_probability: 0.0,
                ..IoConfig::default()
            },
            process: ProcessConfig {
                startup_count: 0,
                new_process_probability: 0.0,
                max_interarrival_ms: None,
                priority_probability: 0.0,
                io_probability: 0.0,
                new_page_probability: 0.0,
                graceful_termination_probability: 0.0,
                ..ProcessConfig::default()
            },
            seed: Some(0),
            ..Self::default()
        }
    }
}

/// CPU topology: ordered physical cores, each with one or more logical threads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct CpuConfig {
    pub cores: Vec<CoreConfig>,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self::uniform(4, 1, 5_000, 0)
    }
}

impl CpuConfig {
    /// Homogeneous topology of `physical` cores with `threads` logical cores each
    #[must_use]
    pub fn uniform(physical: usize, threads: u32, happiness_ms: u64, penalty_ms: u64) -> Self {
        Self {
            cores: (0..physical)
                .map(|_| CoreConfig {
                    label: "standard".into(),
                    threads,
                    happiness_ms,
                    contention_penalty_ms: penalty_ms,
                })
                .collect(),
        }
    }
}

/// One physical core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CoreConfig {
    /// Type label reported to controllers (e.g. "performance", "efficiency")
    #[serde(default = "default_core_label")]
    pub label: String,
    /// Logical threads exposed by this core
    pub threads: u32,
    /// Uninterrupted run time needed before starvation resets
    pub happiness_ms: u64,
    /// Extra happiness time while two or more sibling threads are busy
    #[serde(default)]
    pub contention_penalty_ms: u64,
}

fn default_core_label() -> String {
    "standard".into()
}

/// Page grid and swap bandwidth
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct MemoryConfig {
    pub ram_rows: usize,
    pub disk_rows: usize,
    pub slots_per_row: usize,
    /// Time for one page transfer to complete
    pub swap_delay_ms: u64,
    /// Maximum simultaneous transfers per direction
    pub parallel_swaps: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            ram_rows: 3,
            disk_rows: 8,
            slots_per_row: DEFAULT_SLOTS_PER_ROW,
            swap_delay_ms: 500,
            parallel_swaps: 1,
        }
    }
}

/// I/O completion arrival model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct IoConfig {
    /// Minimum spacing between arrival rolls
    pub check_interval_ms: u64,
    /// Chance that one more completion becomes available per roll
    pub arrival_probability: f64,
    /// Once the oldest waiter has waited this long, every waiter becomes available
    pub max_wait_ms: u64,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            check_interval_ms: 1_000,
            arrival_probability: 1.0 / 3.0,
            max_wait_ms: 10_000,
        }
    }
}

/// Process population, aging and behaviour probabilities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ProcessConfig {
    /// Processes spawned in the opening burst
    pub startup_count: usize,
    /// Live population ceiling
    pub max_processes: usize,
    /// Kills (aging or external) allowed before the game is over
    pub max_terminated_by_user: u32,
    /// Graceful exits allowed; `None` is unbounded
    pub max_graceful_terminations: Option<u32>,
    /// Chance of an arrival per arrival check
    pub new_process_probability: f64,
    /// Forces an arrival once this long has passed without one
    pub max_interarrival_ms: Option<u64>,
    /// Chance a new process is a priority process
    pub priority_probability: f64,
    /// Time between starvation increments for normal processes
    pub starvation_step_ms: u64,
    /// Time between starvation increments for priority processes
    pub priority_starvation_step_ms: u64,
    /// Per-second chance a running process blocks on I/O
    pub io_probability: f64,
    /// Per-second chance a running process allocates another page
    pub new_page_probability: f64,
    /// Per-second chance a running process exits gracefully
    pub graceful_termination_probability: f64,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            startup_count: 1,
            max_processes: 42,
            max_terminated_by_user: 10,
            max_graceful_terminations: None,
            new_process_probability: 0.05,
            max_interarrival_ms: Some(10_000),
            priority_probability: 0.1,
            starvation_step_ms: 10_000,
            priority_starvation_step_ms: 5_000,
            io_probability: 0.01,
            new_page_probability: 0.01,
            graceful_termination_probability: 0.01,
        }
    }
}
