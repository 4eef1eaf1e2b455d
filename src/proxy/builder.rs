/*!
 * Proxy Builder
 * Constructs capability-compatible proxies over raw resources
 *
 * Building is one `Rc` allocation per proxy; it happens on every
 * derived-resource creation. The builder only wraps; whether a
 * result needs wrapping, and whether the wrapped proxy gets
 * registered, is the calling strategy's result-wrapping step.
 */

use super::connection::Connection;
use super::metadata::DatabaseMetadata;
use super::statement::{CallableStatement, PreparedStatement, Statement};
use crate::core::services::HandleServices;
use crate::driver::RawConnection;
use crate::guard::GuardRef;
use crate::handle::LogicalHandle;
use std::rc::Rc;

pub struct ProxyBuilder;

impl ProxyBuilder {
    /// Wrap a logical handle's connection; the proxy's strategy is
    /// registered as a handle observer so teardown reaches it
    pub fn build_connection<C: RawConnection>(handle: &Rc<LogicalHandle<C>>) -> Connection<C> {
        Connection::build(handle)
    }

    /// Wrap a raw statement, parented to `handle`
    pub fn build_statement<C: RawConnection>(
        raw: C::Statement,
        handle: &Rc<LogicalHandle<C>>,
    ) -> Statement<C> {
        Statement::build(raw, handle)
    }

    /// Wrap a raw prepared statement, parented to `handle`
    pub fn build_prepared_statement<C: RawConnection>(
        sql: &str,
        raw: C::Prepared,
        handle: &Rc<LogicalHandle<C>>,
    ) -> PreparedStatement<C> {
        PreparedStatement::build(sql, raw, handle)
    }

    /// Wrap a raw callable statement, parented to `handle`
    pub fn build_callable_statement<C: RawConnection>(
        sql: &str,
        raw: C::Callable,
        handle: &Rc<LogicalHandle<C>>,
    ) -> CallableStatement<C> {
        CallableStatement::build(sql, raw, handle)
    }

    /// Wrap a raw metadata object against an existing proxy family
    pub fn build_database_metadata<C: RawConnection>(
        raw: C::Metadata,
        guard: &GuardRef,
        services: &HandleServices,
    ) -> DatabaseMetadata<C> {
        DatabaseMetadata::build(raw, guard, services)
    }
}
