/*!
 * Failure Translation
 * Converts access-class driver failures into the normalized taxonomy
 */

use crate::core::errors::{AccessKind, HandleError};
use crate::driver::DriverError;

/// Translation facility consulted by dispatch for access-class failures
///
/// Implementations must preserve the original driver message verbatim.
pub trait FailureTranslator {
    fn translate(&self, error: DriverError, operation: &str) -> HandleError;
}

/// Default translator: classifies by SQLSTATE class code
///
/// Only the class (first two characters) is inspected; the full
/// vendor mapping tables live with the embedder.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqlStateTranslator;

impl SqlStateTranslator {
    fn classify(state: Option<&str>) -> AccessKind {
        match state.map(|s| &s[..s.len().min(2)]) {
            Some("08") => AccessKind::ConnectionFailure,
            Some("53") => AccessKind::InsufficientResources,
            Some("57") => AccessKind::OperatorIntervention,
            _ => AccessKind::Generic,
        }
    }
}

impl FailureTranslator for SqlStateTranslator {
    fn translate(&self, error: DriverError, operation: &str) -> HandleError {
        match error {
            DriverError::Access { state, message } => HandleError::ResourceAccess {
                kind: Self::classify(state.as_deref()),
                state,
                operation: operation.into(),
                message,
            },
            // not ours to translate
            other => HandleError::Unclassified(other),
        }
    }
}
