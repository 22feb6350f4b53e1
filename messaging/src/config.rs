//! Messaging configuration

use crate::ConfigError;
use serde::{Deserialize, Serialize};

/// Configuration for a [`MessageSystem`](crate::MessageSystem)
///
/// Mailbox capacity is not configured here: mailboxes are created by the
/// process subsystem together with their processes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagingConfig {
    /// Record every delivery, rejection, block and wake in the audit log
    pub record_audit: bool,
    /// Maximum number of audit events kept; the oldest are evicted first
    pub audit_capacity: usize,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            record_audit: true,
            audit_capacity: 4096,
        }
    }
}

impl MessagingConfig {
    /// Enables or disables the audit log
    pub fn with_audit(mut self, record_audit: bool) -> Self {
        self.record_audit = record_audit;
        self
    }

    /// Sets the audit log bound
    pub fn with_audit_capacity(mut self, audit_capacity: usize) -> Self {
        self.audit_capacity = audit_capacity;
        self
    }

    /// Checks the configuration for contradictions
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.record_audit && self.audit_capacity == 0 {
            return Err(ConfigError::ZeroAuditCapacity);
        }
        Ok(())
    }

    /// Parses and validates a JSON configuration
    ///
    /// Missing fields take their default values.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
