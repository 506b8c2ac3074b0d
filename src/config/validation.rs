/*!
 * Configuration Validation
 * Rejects out-of-range or inconsistent settings before the first tick
 */

use super::types::SimulationConfig;
use crate::core::errors::ConfigError;
use crate::core::limits::MAX_PAGES_PER_PROCESS;

fn check_probability(field: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProbability {
            field: field.into(),
        })
    }
}

fn check_duration(field: &str, value: u64) -> Result<(), ConfigError> {
    if value > 0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidDuration {
            field: field.into(),
        })
    }
}

impl SimulationConfig {
    /// Total RAM page slots
    #[inline]
    #[must_use]
    pub fn ram_capacity(&self) -> usize {
        self.memory.ram_rows * self.memory.slots_per_row
    }

    /// Total disk page slots
    #[inline]
    #[must_use]
    pub fn disk_capacity(&self) -> usize {
        self.memory.disk_rows * self.memory.slots_per_row
    }

    /// Validate every setting. Page creation relies on the capacity check here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cpu.cores.is_empty() {
            return Err(ConfigError::NoCores);
        }
        for (core, cfg) in self.cpu.cores.iter().enumerate() {
            if cfg.threads == 0 {
                return Err(ConfigError::NoThreads { core });
            }
            if cfg.happiness_ms == 0 {
                return Err(ConfigError::InvalidHappiness { core });
            }
        }

        if self.memory.parallel_swaps == 0 {
            return Err(ConfigError::InvalidParallelSwaps);
        }
        if self.memory.ram_rows == 0 || self.memory.slots_per_row == 0 {
            return Err(ConfigError::EmptyRam);
        }

        let p = &self.process;
        if p.max_processes == 0 {
            return Err(ConfigError::InvalidProcessLimits(
                "max_processes is zero".into(),
            ));
        }
        if p.startup_count > p.max_processes {
            return Err(ConfigError::InvalidProcessLimits(format!(
                "startup_count {} exceeds max_processes {}",
                p.startup_count, p.max_processes
            )));
        }

        let capacity = self.ram_capacity() + self.disk_capacity();
        let required = p.max_processes * MAX_PAGES_PER_PROCESS;
        if capacity < required {
            return Err(ConfigError::InsufficientPageCapacity {
                capacity,
                required,
                max_processes: p.max_processes,
            });
        }

        check_duration("process.starvation_step_ms", p.starvation_step_ms)?;
        check_duration(
            "process.priority_starvation_step_ms",
            p.priority_starvation_step_ms,
        )?;
        if let Some(gap) = p.max_interarrival_ms {
            check_duration("process.max_interarrival_ms", gap)?;
        }
        check_duration("io.check_interval_ms", self.io.check_interval_ms)?;
        check_duration("io.max_wait_ms", self.io.max_wait_ms)?;

        check_probability("process.new_process_probability", p.new_process_probability)?;
        check_probability("process.priority_probability", p.priority_probability)?;
        check_probability("process.io_probability", p.io_probability)?;
        check_probability("process.new_page_probability", p.new_page_probability)?;
        check_probability(
            "process.graceful_termination_probability",
            p.graceful_termination_probability,
        )?;
        check_probability("io.arrival_probability", self.io.arrival_probability)?;

        Ok(())
    }
}
