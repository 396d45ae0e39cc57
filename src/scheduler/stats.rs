/*!
 * Scheduler Statistics
 * Counters updated on the scheduler thread, read as a snapshot
 */

use serde::{Deserialize, Serialize};
use std::cell::Cell;

/// Snapshot of scheduler counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SchedulerStats {
    pub spawned: u64,
    pub completed: u64,
    pub failed: u64,
    pub killed: u64,
    pub reductions: u64,
    pub suspensions: u64,
    pub joins: u64,
    pub stale_resumes: u64,
}

/// Live counters
///
/// The scheduler is single-threaded, so plain cells suffice.
#[derive(Default)]
pub(crate) struct StatCounters {
    spawned: Cell<u64>,
    completed: Cell<u64>,
    failed: Cell<u64>,
    killed: Cell<u64>,
    reductions: Cell<u64>,
    suspensions: Cell<u64>,
    joins: Cell<u64>,
    stale_resumes: Cell<u64>,
}

#[inline(always)]
fn bump(counter: &Cell<u64>) {
    counter.set(counter.get() + 1);
}

impl StatCounters {
    #[inline]
    pub fn inc_spawned(&self) {
        bump(&self.spawned);
    }

    #[inline]
    pub fn inc_completed(&self) {
        bump(&self.completed);
    }

    #[inline]
    pub fn inc_failed(&self) {
        bump(&self.failed);
    }

    #[inline]
    pub fn inc_killed(&self) {
        bump(&self.killed);
    }

    /// Hot path - called on every reduction
    #[inline(always)]
    pub fn inc_reductions(&self) {
        bump(&self.reductions);
    }

    #[inline]
    pub fn inc_suspensions(&self) {
        bump(&self.suspensions);
    }

    #[inline]
    pub fn inc_joins(&self) {
        bump(&self.joins);
    }

    #[inline]
    pub fn inc_stale_resumes(&self) {
        bump(&self.stale_resumes);
    }

    pub fn snapshot(&self) -> SchedulerStats {
        SchedulerStats {
            spawned: self.spawned.get(),
            completed: self.completed.get(),
            failed: self.failed.get(),
            killed: self.killed.get(),
            reductions: self.reductions.get(),
            suspensions: self.suspensions.get(),
            joins: self.joins.get(),
            stale_resumes: self.stale_resumes.get(),
        }
    }
}
