//! Scheduler for the crawl frontier
//!
//! The frontier is a FIFO queue of [`CrawlTarget`]s, so the crawl proceeds
//! roughly breadth-first. A global semaphore caps the number of expansions in
//! flight: a target only leaves the frontier together with a permit, and the
//! permit is released when the expansion holding it finishes.

use crate::state::CrawlTarget;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// A target released for expansion with its concurrency permit
pub struct ScheduledTarget {
    /// The target to expand
    pub target: CrawlTarget,

    /// Held for the lifetime of the expansion
    pub permit: OwnedSemaphorePermit,
}

/// Scheduler manages the frontier queue and the in-flight bound
pub struct Scheduler {
    /// Global semaphore for limiting concurrent expansions
    global_semaphore: Arc<Semaphore>,

    /// Targets waiting for a permit
    frontier: VecDeque<CrawlTarget>,

    max_in_flight: usize,
}

impl Scheduler {
    /// Creates a scheduler allowing `max_in_flight` concurrent expansions
    ///
    /// A bound of zero is raised to one so the crawl can make progress.
    pub fn new(max_in_flight: usize, initial_frontier: Vec<CrawlTarget>) -> Self {
        let max_in_flight = max_in_flight.max(1);

        Self {
            global_semaphore: Arc::new(Semaphore::new(max_in_flight)),
            frontier: VecDeque::from(initial_frontier),
            max_in_flight,
        }
    }

    /// Releases the next target if a permit is free
    ///
    /// Returns `None` when the frontier is empty or every permit is taken.
    /// Never waits; the caller decides when to try again.
    pub fn try_next(&mut self) -> Option<ScheduledTarget> {
        if self.frontier.is_empty() {
            return None;
        }

        let permit = Arc::clone(&self.global_semaphore)
            .try_acquire_owned()
            .ok()?;
        let target = self.frontier.pop_front()?;

        tracing::trace!("Scheduling {}", target);
        Some(ScheduledTarget { target, permit })
    }

    /// Adds a target to the back of the frontier
    pub fn add_to_frontier(&mut self, target: CrawlTarget) {
        self.frontier.push_back(target);
    }

    /// Returns the number of targets in the frontier
    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    /// Number of expansions currently holding a permit
    pub fn in_flight(&self) -> usize {
        self.max_in_flight - self.global_semaphore.available_permits()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }
}
