/*!
 * System Limits and Constants
 *
 * Centralized location for simulation-wide limits and fixed cadences.
 * Tunable values live in `SimulationConfig`; everything here is structural.
 */

// =============================================================================
// PROCESS LIMITS
// =============================================================================

/// Maximum pages a single process may own (page indices are `0..4`)
pub const MAX_PAGES_PER_PROCESS: usize = 4;

/// Starvation level of a freshly reset (happy) process
pub const MIN_STARVATION_LEVEL: u8 = 0;

/// Starvation level assigned to a newly spawned process
pub const INITIAL_STARVATION_LEVEL: u8 = 1;

/// Highest starvation level a live process can hold
pub const MAX_ALIVE_STARVATION_LEVEL: u8 = 5;

/// Starvation level of a process killed by aging
pub const DEAD_STARVATION_LEVEL: u8 = 6;

/// Cadence of per-process aging and probability rolls (one simulated second)
pub const PROCESS_TICK_MS: u64 = 1000;

// =============================================================================
// ARRIVAL CADENCE
// =============================================================================

/// Spacing between spawns of the startup burst
pub const STARTUP_SPAWN_INTERVAL_MS: u64 = 100;

/// Cadence of probabilistic arrival rolls after the startup burst
pub const ARRIVAL_CHECK_INTERVAL_MS: u64 = 1000;

// =============================================================================
// MEMORY GRID
// =============================================================================

/// Default number of page slots per grid row
pub const DEFAULT_SLOTS_PER_ROW: usize = 16;
