/*!
 * System Context
 * Per-tick bundle of the subsystems a process acts on
 */

use crate::config::ProcessConfig;
use crate::core::types::Timestamp;
use crate::cpu::CpuManager;
use crate::io::IoQueue;
use crate::memory::PageManager;
use crate::monitoring::EventMonitor;
use rand::rngs::StdRng;

/// Mutable borrows of everything outside the process table, plus the fixed
/// `now` every entity observes during one tick
pub struct SystemContext<'a> {
    pub now: Timestamp,
    pub cpu: &'a mut CpuManager,
    pub pages: &'a mut PageManager,
    pub io: &'a mut IoQueue,
    pub events: &'a mut EventMonitor,
    pub rng: &'a mut StdRng,
    pub config: &'a ProcessConfig,
}
