/*!
 * Core Module
 * Shared types, identifiers, errors, and the handle service bundle
 */

pub mod errors;
pub mod id;
pub mod services;
pub mod types;

// Re-export for convenience
pub use errors::{AccessKind, HandleError, ReleaseFailure};
pub use id::{HandleId, HandleIdGenerator, IdGenerator, ResourceId, ResourceIdGenerator};
pub use services::HandleServices;
pub use types::{HandleResult, InlineString, Row, Value};
