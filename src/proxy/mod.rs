/*!
 * Proxy Layer
 * Transparent stand-ins routing every operation through an
 * interception strategy
 *
 * Dispatch order for every intercepted operation: close/cancel first
 * (guard-exempt), then the guard check, then escape hatches, then the
 * forwarded call with result wrapping on success and failure
 * translation at the call boundary.
 */

mod builder;
mod connection;
mod metadata;
mod statement;

pub use builder::ProxyBuilder;
pub use connection::Connection;
pub use metadata::DatabaseMetadata;
pub use statement::{CallableStatement, PreparedStatement, Statement};
