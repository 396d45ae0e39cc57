/*!
 * Scheduler Configuration
 * Runtime options loaded from JSON, the environment, or the builder
 */

use crate::core::errors::ConfigError;
use crate::core::limits::{
    DEFAULT_FIRST_PID, ENV_FIRST_PID, ENV_JOIN_MAILBOX, ENV_TRACE_REDUCTIONS,
};
use crate::core::types::Pid;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How join members see the parent's mailbox
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MailboxSharing {
    /// Members read from the parent's queue; whoever steps first takes the message
    #[default]
    Shared,
    /// Members each start with an empty private queue
    Isolated,
}

impl FromStr for MailboxSharing {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shared" => Ok(MailboxSharing::Shared),
            "isolated" => Ok(MailboxSharing::Isolated),
            _ => Err(ConfigError::InvalidValue {
                key: ENV_JOIN_MAILBOX.into(),
                value: s.into(),
            }),
        }
    }
}

/// Scheduler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SchedulerConfig {
    pub join_mailbox: MailboxSharing,
    /// Emit a trace event for every reduction
    pub trace_reductions: bool,
    pub first_pid: Pid,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            join_mailbox: MailboxSharing::Shared,
            trace_reductions: false,
            first_pid: DEFAULT_FIRST_PID,
        }
    }
}

impl SchedulerConfig {
    /// Parse a JSON object; missing keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read overrides from the process environment
    ///
    /// Environment variables:
    /// - COOP_JOIN_MAILBOX: `shared` or `isolated` (default: shared)
    /// - COOP_TRACE_REDUCTIONS: `1` or `true` (default: false)
    /// - COOP_FIRST_PID: first pid to allocate (default: 1)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_JOIN_MAILBOX) {
            config.join_mailbox = value.parse()?;
        }

        if let Some(value) = lookup(ENV_TRACE_REDUCTIONS) {
            config.trace_reductions = matches!(value.trim(), "1" | "true");
        }

        if let Some(value) = lookup(ENV_FIRST_PID) {
            config.first_pid = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    key: ENV_FIRST_PID.into(),
                    value: value.clone(),
                })?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SchedulerConfig::default();
        assert_eq!(config.join_mailbox, MailboxSharing::Shared);
        assert!(!config.trace_reductions);
        assert_eq!(config.first_pid, 1);
    }

    #[test]
    fn test_from_json_partial() {
        let config = SchedulerConfig::from_json(r#"{"join_mailbox": "isolated"}"#).unwrap();
        assert_eq!(config.join_mailbox, MailboxSharing::Isolated);
        assert_eq!(config.first_pid, 1);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            SchedulerConfig::from_json("{\"join_mailbox\": 3}"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_from_lookup() {
        let config = SchedulerConfig::from_lookup(lookup_from(&[
            (ENV_JOIN_MAILBOX, "Isolated"),
            (ENV_TRACE_REDUCTIONS, "true"),
            (ENV_FIRST_PID, "100"),
        ]))
        .unwrap();

        assert_eq!(config.join_mailbox, MailboxSharing::Isolated);
        assert!(config.trace_reductions);
        assert_eq!(config.first_pid, 100);
    }

    #[test]
    fn test_from_lookup_invalid_pid() {
        let err = SchedulerConfig::from_lookup(lookup_from(&[(ENV_FIRST_PID, "-4")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: ENV_FIRST_PID.into(),
                value: "-4".into()
            }
        );
    }
}
