/*!
 * I/O Queue
 * FIFO of blocked processes plus the completion arrival model
 */

use crate::config::IoConfig;
use crate::core::types::{elapsed_ms, Pid, Timestamp};
use crate::monitoring::{Event, EventMonitor};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

/// A registered waiter. The pid is the unblock token handed back on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoWaiter {
    pub registered_at: Timestamp,
    pub pid: Pid,
}

/// Pending I/O completions.
///
/// Availability grows toward the number of waiters: at most once per
/// `check_interval_ms` a roll may make one more completion available, and
/// once the oldest waiter has waited `max_wait_ms` every waiter becomes
/// available at once.
#[derive(Debug, Clone)]
pub struct IoQueue {
    waiters: VecDeque<IoWaiter>,
    available: usize,
    last_check: Timestamp,
    config: IoConfig,
}

impl IoQueue {
    pub fn new(config: &IoConfig) -> Self {
        Self {
            waiters: VecDeque::new(),
            available: 0,
            last_check: 0,
            config: config.clone(),
        }
    }

    /// Register a blocked process at the back of the queue
    pub fn register_waiter(&mut self, pid: Pid, now: Timestamp) {
        self.waiters.push_back(IoWaiter {
            registered_at: now,
            pid,
        });
    }

    /// Roll arrivals for this tick, emitting `IO_QUEUE` when availability changes
    pub fn update<R: Rng + ?Sized>(&mut self, now: Timestamp, rng: &mut R, events: &mut EventMonitor) {
        if elapsed_ms(now, self.last_check) < self.config.check_interval_ms {
            return;
        }
        self.last_check = now;

        if self.available >= self.waiters.len() {
            return;
        }

        let before = self.available;
        let oldest_wait = self
            .waiters
            .front()
            .map(|w| elapsed_ms(now, w.registered_at))
            .unwrap_or(0);

        if oldest_wait >= self.config.max_wait_ms {
            self.available = self.waiters.len();
        } else if rng.gen_bool(self.config.arrival_probability) {
            self.available += 1;
        }

        if self.available != before {
            debug!(available = self.available, waiters = self.waiters.len(), "I/O completions arrived");
            events.emit(Event::IoQueue {
                io_count: self.available,
            });
        }
    }

    /// Wake every available waiter in FIFO order, reset availability, then
    /// emit the new queue count
    pub fn process_events<F>(&mut self, events: &mut EventMonitor, mut wake: F)
    where
        F: FnMut(Pid, &mut EventMonitor),
    {
        let count = self.available.min(self.waiters.len());
        for waiter in self.waiters.drain(..count) {
            wake(waiter.pid, events);
        }
        self.available = 0;

        events.emit(Event::IoQueue { io_count: 0 });
    }

    /// Completions currently available to drain
    pub fn available(&self) -> usize {
        self.available
    }

    /// Outstanding waiters, available or not
    pub fn waiting(&self) -> usize {
        self.waiters.len()
    }
}
