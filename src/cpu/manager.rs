/*!
 * CPU Manager
 * Core topology, occupancy bookkeeping and hyperthreading contention
 */

use super::types::{CoreId, LogicalCore, PhysicalCore};
use crate::config::CpuConfig;
use crate::core::types::Pid;
use tracing::debug;

/// Owns the physical/logical core topology.
///
/// Logical cores are numbered physical-core-major, so scanning `logical`
/// front to back is the fixed tie-break order for free-core selection.
#[derive(Debug, Clone)]
pub struct CpuManager {
    physical: Vec<PhysicalCore>,
    logical: Vec<LogicalCore>,
}

impl CpuManager {
    pub fn new(config: &CpuConfig) -> Self {
        let mut physical = Vec::with_capacity(config.cores.len());
        let mut logical = Vec::new();

        for (index, core) in config.cores.iter().enumerate() {
            let mut threads = Vec::with_capacity(core.threads as usize);
            for _ in 0..core.threads {
                let id = logical.len();
                logical.push(LogicalCore {
                    id,
                    physical: index,
                    base_happiness_ms: core.happiness_ms,
                    contention_penalty_ms: core.contention_penalty_ms,
                    occupant: None,
                });
                threads.push(id);
            }
            physical.push(PhysicalCore {
                id: index,
                label: core.label.clone(),
                threads,
            });
        }

        debug!(
            physical = physical.len(),
            logical = logical.len(),
            "CPU topology built"
        );

        Self { physical, logical }
    }

    /// First free logical core by (physical index, thread index)
    #[must_use]
    pub fn select_free_logical_core(&self) -> Option<CoreId> {
        self.logical.iter().find(|c| c.is_free()).map(|c| c.id)
    }

    /// Mark `core` as held by `pid`. Returns false if the core is taken or unknown.
    pub fn occupy(&mut self, core: CoreId, pid: Pid) -> bool {
        match self.logical.get_mut(core) {
            Some(slot) if slot.is_free() => {
                slot.occupant = Some(pid);
                true
            }
            _ => false,
        }
    }

    /// Free `core`, returning the previous occupant
    pub fn vacate(&mut self, core: CoreId) -> Option<Pid> {
        self.logical.get_mut(core).and_then(|c| c.occupant.take())
    }

    /// Base happiness plus the contention penalty when two or more sibling
    /// threads of the same physical core are busy right now
    #[must_use]
    pub fn effective_happiness(&self, core: CoreId) -> Option<u64> {
        let lc = self.logical.get(core)?;
        let busy_siblings = self.physical[lc.physical]
            .threads
            .iter()
            .filter(|&&id| !self.logical[id].is_free())
            .count();

        if busy_siblings >= 2 {
            Some(lc.base_happiness_ms + lc.contention_penalty_ms)
        } else {
            Some(lc.base_happiness_ms)
        }
    }

    #[must_use]
    pub fn occupant(&self, core: CoreId) -> Option<Pid> {
        self.logical.get(core).and_then(|c| c.occupant)
    }

    #[must_use]
    pub fn logical_core(&self, core: CoreId) -> Option<&LogicalCore> {
        self.logical.get(core)
    }

    pub fn logical_cores(&self) -> &[LogicalCore] {
        &self.logical
    }

    pub fn physical_cores(&self) -> &[PhysicalCore] {
        &self.physical
    }

    pub fn logical_count(&self) -> usize {
        self.logical.len()
    }

    pub fn occupied_count(&self) -> usize {
        self.logical.iter().filter(|c| !c.is_free()).count()
    }

    /// Type label of each logical core, in scan order
    #[must_use]
    pub fn core_labels(&self) -> Vec<String> {
        self.logical
            .iter()
            .map(|c| self.physical[c.physical].label.clone())
            .collect()
    }
}
