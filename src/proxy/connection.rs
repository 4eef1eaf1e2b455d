/*!
 * Connection Proxy
 * The application-facing stand-in for a logical handle's connection
 */

use super::builder::ProxyBuilder;
use super::metadata::DatabaseMetadata;
use super::statement::{CallableStatement, PreparedStatement, Statement};
use crate::core::errors::HandleError;
use crate::core::id::HandleId;
use crate::core::services::HandleServices;
use crate::core::types::HandleResult;
use crate::diag::{Event, Payload, Severity};
use crate::driver::{DriverResult, RawConnection};
use crate::guard::GuardRef;
use crate::handle::{HandleObserver, LogicalHandle};
use std::fmt;
use std::rc::{Rc, Weak};

/// Connection-level interception strategy
///
/// Observes the owning handle so that handle teardown invalidates the
/// whole proxy family, and carries the shared context every derived
/// strategy copies.
pub(crate) struct ConnectionStrategy<C: RawConnection> {
    handle: Weak<LogicalHandle<C>>,
    guard: GuardRef,
    handle_id: HandleId,
    services: HandleServices,
}

impl<C: RawConnection> ConnectionStrategy<C> {
    pub(crate) fn new(handle: &Rc<LogicalHandle<C>>) -> Rc<Self> {
        Rc::new(Self {
            handle: Rc::downgrade(handle),
            guard: Rc::clone(handle.guard()),
            handle_id: handle.id(),
            services: handle.services().clone(),
        })
    }

    fn handle(&self, operation: &str) -> HandleResult<Rc<LogicalHandle<C>>> {
        self.handle.upgrade().ok_or_else(|| HandleError::InvalidHandle {
            operation: operation.into(),
            handle: self.handle_id,
        })
    }

    /// Guard check, forward through the handle, translate
    fn dispatch<R>(
        &self,
        operation: &'static str,
        call: impl FnOnce(&mut C) -> DriverResult<R>,
    ) -> HandleResult<R> {
        log::trace!("handling connection operation `{operation}`");
        self.services.emit(Event::new(
            Severity::Trace,
            self.handle_id,
            Payload::Dispatch {
                resource_type: "connection".into(),
                operation: operation.into(),
            },
        ));
        self.guard.error_if_invalid(operation)?;
        self.handle(operation)?.with_connection(operation, call)
    }

    /// Explicit proxy close: invalidate the family's guard once
    ///
    /// Derived resources stay in the handle's registry; the handle's
    /// own close releases them.
    fn explicit_close(&self) {
        if self.guard.is_valid() {
            log::trace!("invalidating connection proxy for handle {}", self.handle_id);
            self.guard.invalidate();
        }
    }
}

impl<C: RawConnection> HandleObserver<C> for ConnectionStrategy<C> {
    fn on_handle_closed(&self) {
        self.guard.invalidate();
    }
}

/// Proxy over the connection bound to a logical handle
///
/// Built by [`ProxyBuilder::build_connection`]. Every operation runs
/// the interception pipeline; operations that produce derived
/// resources return freshly wrapped, registered proxies.
pub struct Connection<C: RawConnection> {
    strategy: Rc<ConnectionStrategy<C>>,
}

impl<C: RawConnection> Connection<C> {
    pub(crate) fn build(handle: &Rc<LogicalHandle<C>>) -> Self {
        let strategy = ConnectionStrategy::new(handle);
        handle.add_observer(strategy.clone());
        Self { strategy }
    }

    /// Identity token of the owning handle
    pub fn handle_id(&self) -> HandleId {
        self.strategy.handle_id
    }

    /// True until this proxy or its handle is closed
    pub fn is_valid(&self) -> bool {
        self.strategy.guard.is_valid()
    }

    /// Create a statement; the returned proxy is tracked by the
    /// handle's registry until released
    pub fn create_statement(&self) -> HandleResult<Statement<C>> {
        let raw = self
            .strategy
            .dispatch("create_statement", |c| c.create_statement())?;
        let handle = self.strategy.handle("create_statement")?;
        let statement = ProxyBuilder::build_statement(raw, &handle);
        handle.register_resource(statement.as_tracked());
        Ok(statement)
    }

    /// Prepare a statement against `sql`; tracked like `create_statement`
    pub fn prepare_statement(&self, sql: &str) -> HandleResult<PreparedStatement<C>> {
        self.strategy.services.emit(Event::new(
            Severity::Debug,
            self.strategy.handle_id,
            Payload::StatementPrepared {
                sql: sql.to_string(),
            },
        ));
        let raw = self
            .strategy
            .dispatch("prepare_statement", |c| c.prepare_statement(sql))?;
        let handle = self.strategy.handle("prepare_statement")?;
        let statement = ProxyBuilder::build_prepared_statement(sql, raw, &handle);
        handle.register_resource(statement.as_tracked());
        Ok(statement)
    }

    /// Prepare a stored-procedure call; tracked like `create_statement`
    pub fn prepare_call(&self, sql: &str) -> HandleResult<CallableStatement<C>> {
        self.strategy.services.emit(Event::new(
            Severity::Debug,
            self.strategy.handle_id,
            Payload::StatementPrepared {
                sql: sql.to_string(),
            },
        ));
        let raw = self
            .strategy
            .dispatch("prepare_call", |c| c.prepare_call(sql))?;
        let handle = self.strategy.handle("prepare_call")?;
        let statement = ProxyBuilder::build_callable_statement(sql, raw, &handle);
        handle.register_resource(statement.as_tracked());
        Ok(statement)
    }

    /// Fetch metadata, wrapped but not registered
    pub fn database_metadata(&self) -> HandleResult<DatabaseMetadata<C>> {
        let raw = self
            .strategy
            .dispatch("database_metadata", |c| c.database_metadata())?;
        Ok(ProxyBuilder::build_database_metadata(
            raw,
            &self.strategy.guard,
            &self.strategy.services,
        ))
    }

    pub fn commit(&self) -> HandleResult<()> {
        self.strategy.dispatch("commit", |c| c.commit())
    }

    pub fn rollback(&self) -> HandleResult<()> {
        self.strategy.dispatch("rollback", |c| c.rollback())
    }

    pub fn set_auto_commit(&self, enabled: bool) -> HandleResult<()> {
        self.strategy
            .dispatch("set_auto_commit", |c| c.set_auto_commit(enabled))
    }

    pub fn auto_commit(&self) -> HandleResult<bool> {
        self.strategy.dispatch("auto_commit", |c| c.auto_commit())
    }

    /// Escape hatch: operate directly on the raw connection
    pub fn with_raw<R>(&self, f: impl FnOnce(&mut C) -> R) -> HandleResult<R> {
        self.strategy.guard.error_if_invalid("with_raw")?;
        self.strategy.handle("with_raw")?.with_raw_connection(f)
    }

    /// Close this proxy; infallible and idempotent
    ///
    /// Invalidates every proxy in the family. The logical handle stays
    /// open; closing the session is the pool layer's call.
    pub fn close(&self) {
        self.strategy.explicit_close();
    }
}

impl<C: RawConnection> fmt::Debug for Connection<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("handle", &self.strategy.handle_id)
            .field("valid", &self.strategy.guard.is_valid())
            .finish()
    }
}
