/*!
 * Scheduler Builder
 * Builder pattern for Scheduler construction
 */

use super::config::{MailboxSharing, SchedulerConfig};
use super::Scheduler;
use crate::core::types::{Pid, Value};
use std::marker::PhantomData;

/// Builder for Scheduler
pub struct SchedulerBuilder<V = Value> {
    config: SchedulerConfig,
    _value: PhantomData<fn() -> V>,
}

impl<V: 'static> SchedulerBuilder<V> {
    /// Create a new Scheduler builder with default configuration
    pub fn new() -> Self {
        Self::from_config(SchedulerConfig::default())
    }

    /// Start from an existing configuration (e.g. `SchedulerConfig::from_env()`)
    pub fn from_config(config: SchedulerConfig) -> Self {
        Self {
            config,
            _value: PhantomData,
        }
    }

    /// Choose how join members see the parent's mailbox
    pub fn with_join_mailbox(mut self, sharing: MailboxSharing) -> Self {
        self.config.join_mailbox = sharing;
        self
    }

    /// Emit a trace event per reduction
    pub fn with_reduction_tracing(mut self) -> Self {
        self.config.trace_reductions = true;
        self
    }

    /// First pid handed out
    pub fn with_first_pid(mut self, pid: Pid) -> Self {
        self.config.first_pid = pid;
        self
    }

    /// Build the Scheduler
    pub fn build(self) -> Scheduler<V> {
        Scheduler::with_config(self.config)
    }
}

impl<V: 'static> Default for SchedulerBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}
