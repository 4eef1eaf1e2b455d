/*!
 * Driver Capability Surface
 * Traits implemented by the underlying physical driver, consumed by the proxies
 *
 * The interception layer never talks to a concrete driver; it forwards
 * through these traits. Which operation closes, which escapes wrapping,
 * and which results wrap into derived proxies is fixed per resource kind
 * by the proxy method set, so the policy stays statically checkable.
 */

use crate::core::types::{InlineString, Row, Value};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for raw driver calls
pub type DriverResult<T> = Result<T, DriverError>;

/// Low-level driver failure, split into the two classes the dispatch
/// protocol cares about
///
/// `Access` failures are translated into the normalized taxonomy;
/// `Misuse` failures (programming errors, type mismatches) propagate
/// unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "class", rename_all = "snake_case")]
pub enum DriverError {
    /// Resource-access failure: connection lost, server gone, io error
    #[error("{message}")]
    Access {
        /// Five-character SQLSTATE, when the driver reports one
        state: Option<InlineString>,
        message: String,
    },

    /// Anything else: bad SQL, wrong parameter count, type mismatch
    #[error("{message}")]
    Misuse { message: String },
}

impl DriverError {
    /// Access-class constructor
    pub fn access(state: impl Into<Option<InlineString>>, message: impl Into<String>) -> Self {
        DriverError::Access {
            state: state.into(),
            message: message.into(),
        }
    }

    /// Misuse-class constructor
    pub fn misuse(message: impl Into<String>) -> Self {
        DriverError::Misuse {
            message: message.into(),
        }
    }

    /// True for failures the translation facility should handle
    #[inline]
    pub fn is_access(&self) -> bool {
        matches!(self, DriverError::Access { .. })
    }
}

/// A live physical connection
pub trait RawConnection: 'static {
    type Statement: RawStatement;
    type Prepared: RawPreparedStatement;
    type Callable: RawCallableStatement;
    type Metadata: RawDatabaseMetadata;

    fn create_statement(&mut self) -> DriverResult<Self::Statement>;
    fn prepare_statement(&mut self, sql: &str) -> DriverResult<Self::Prepared>;
    fn prepare_call(&mut self, sql: &str) -> DriverResult<Self::Callable>;
    fn database_metadata(&mut self) -> DriverResult<Self::Metadata>;

    fn commit(&mut self) -> DriverResult<()>;
    fn rollback(&mut self) -> DriverResult<()>;
    fn set_auto_commit(&mut self, enabled: bool) -> DriverResult<()>;
    fn auto_commit(&self) -> DriverResult<bool>;

    /// Close the physical connection for good
    fn close(&mut self) -> DriverResult<()>;
}

/// A statement derived from a connection
pub trait RawStatement: 'static {
    fn execute(&mut self, sql: &str) -> DriverResult<u64>;
    fn query(&mut self, sql: &str) -> DriverResult<Vec<Row>>;

    /// Ask the server to abort the in-flight operation, if any
    fn cancel(&mut self) -> DriverResult<()>;

    fn close(&mut self) -> DriverResult<()>;
}

/// A statement precompiled against a fixed SQL string
pub trait RawPreparedStatement: RawStatement {
    fn bind(&mut self, index: usize, value: Value) -> DriverResult<()>;
    fn execute_prepared(&mut self) -> DriverResult<u64>;
    fn query_prepared(&mut self) -> DriverResult<Vec<Row>>;
}

/// A prepared statement that can invoke stored procedures
pub trait RawCallableStatement: RawPreparedStatement {
    fn register_out_param(&mut self, index: usize) -> DriverResult<()>;
    fn out_param(&self, index: usize) -> DriverResult<Value>;
}

/// Server and driver identity, derived from a connection
pub trait RawDatabaseMetadata: 'static {
    fn product_name(&self) -> DriverResult<String>;
    fn product_version(&self) -> DriverResult<String>;
    fn driver_name(&self) -> DriverResult<String>;
    fn user_name(&self) -> DriverResult<String>;
}
