/*!
 * Error Types
 * Normalized error taxonomy with thiserror, miette, and serde support
 */

use super::id::{HandleId, ResourceId};
use super::types::InlineString;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// Re-export DriverError so callers matching on the taxonomy don't
// need to reach into the driver module
pub use crate::driver::DriverError;

/// Classification attached to a translated resource-access failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessKind {
    /// The physical connection was lost or refused (SQLSTATE class 08)
    ConnectionFailure,
    /// The server ran out of a resource (SQLSTATE class 53)
    InsufficientResources,
    /// The server cancelled or shut down the session (SQLSTATE class 57)
    OperatorIntervention,
    /// Access-class failure with no specific classification
    Generic,
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AccessKind::ConnectionFailure => "connection failure",
            AccessKind::InsufficientResources => "insufficient resources",
            AccessKind::OperatorIntervention => "operator intervention",
            AccessKind::Generic => "resource access failure",
        };
        f.write_str(name)
    }
}

/// One failed low-level release, as collected by the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseFailure {
    pub resource: ResourceId,
    pub resource_type: InlineString,
    pub message: String,
}

impl fmt::Display for ReleaseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} failed to release: {}",
            self.resource_type, self.resource, self.message
        )
    }
}

/// Interception layer errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum HandleError {
    #[error("operation `{operation}` attempted on closed or detached handle {handle}")]
    #[diagnostic(
        code(handle::invalid),
        help("The logical handle was closed or its backing resource detached. Obtain a fresh handle.")
    )]
    InvalidHandle {
        operation: InlineString,
        handle: HandleId,
    },

    #[error("handle {handle} has no physical resource bound")]
    #[diagnostic(
        code(handle::unbound),
        help("The physical resource was released back to the pool. Rebind before use.")
    )]
    Unbound { handle: HandleId },

    #[error("{message}")]
    #[diagnostic(
        code(handle::resource_access),
        help("The underlying driver reported a resource-access failure. Check connectivity and server state.")
    )]
    ResourceAccess {
        kind: AccessKind,
        state: Option<InlineString>,
        operation: InlineString,
        message: String,
    },

    #[error(transparent)]
    #[diagnostic(code(handle::unclassified))]
    Unclassified(DriverError),

    #[error("{} derived resource(s) failed to release", .failures.len())]
    #[diagnostic(
        code(handle::aggregated_release),
        help("Every tracked resource was attempted; inspect the individual failures.")
    )]
    AggregatedRelease { failures: Vec<ReleaseFailure> },
}

impl HandleError {
    /// Original driver message for translated access failures
    pub fn message(&self) -> Option<&str> {
        match self {
            HandleError::ResourceAccess { message, .. } => Some(message),
            _ => None,
        }
    }

    /// True when the error came from the invalidation guard
    #[inline]
    pub fn is_invalid_handle(&self) -> bool {
        matches!(self, HandleError::InvalidHandle { .. })
    }
}
