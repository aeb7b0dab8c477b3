//! Group error and status types.

use serde::Serialize;
use thiserror::Error;

use crate::adapters::AdapterType;

/// Errors raised by a fallback group.
#[derive(Debug, Error)]
pub enum GroupError {
    /// The probe URL does not parse or has no usable host/port.
    #[error("invalid probe url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The group was configured without any upstream.
    #[error("group '{group}': the number of proxies cannot be 0")]
    NoEndpoints { group: String },

    /// The group was built outside a Tokio runtime, so probing cannot start.
    #[error("group '{group}': no Tokio runtime to run health checks on")]
    NoRuntime { group: String },

    /// Every candidate was tried and none produced a connection.
    #[error("group '{group}': there are no valid proxies")]
    NoUsableEndpoint { group: String },
}

impl GroupError {
    /// True for errors raised while constructing a group.
    pub fn is_configuration(&self) -> bool {
        matches!(self, GroupError::InvalidUrl { .. } | GroupError::NoEndpoints { .. })
    }
}

/// Result type for group operations.
pub type GroupResult<T> = Result<T, GroupError>;

/// Snapshot of one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateStatus {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AdapterType,
    pub valid: bool,
}

/// Snapshot of a whole group, as exposed to operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupStatus {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AdapterType,
    pub now: String,
    pub all: Vec<CandidateStatus>,
}
