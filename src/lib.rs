/*!
 * Tether
 * Use-after-close safety layer for pooled database connection handles
 *
 * A logical handle keeps a stable identity while the physical
 * connection behind it comes and goes; proxies intercept every
 * operation, wrap derived resources, translate driver failures, and
 * make anything touched after close fail safely.
 */

pub mod core;
pub mod diag;
pub mod driver;
pub mod guard;
pub mod handle;
pub mod proxy;
pub mod registry;
pub mod translate;

// Re-exports
pub use crate::core::errors::{AccessKind, HandleError, ReleaseFailure};
pub use crate::core::id::{HandleId, ResourceId};
pub use crate::core::services::HandleServices;
pub use crate::core::types::{HandleResult, Row, Value};
pub use crate::diag::{DiagnosticSink, Event, LogSink, NullSink, Payload, Severity};
pub use crate::driver::{
    DriverError, DriverResult, RawCallableStatement, RawConnection, RawDatabaseMetadata,
    RawPreparedStatement, RawStatement,
};
pub use crate::guard::{GuardRef, InvalidationGuard};
pub use crate::handle::{HandleObserver, LogicalHandle};
pub use crate::proxy::{
    CallableStatement, Connection, DatabaseMetadata, PreparedStatement, ProxyBuilder, Statement,
};
pub use crate::registry::{ResourceRegistry, TrackedResource};
pub use crate::translate::{FailureTranslator, SqlStateTranslator};
