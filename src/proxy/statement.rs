/*!
 * Statement Proxies
 * Derived-resource stand-ins sharing their parent connection's guard
 */

use crate::core::errors::HandleError;
use crate::core::id::{IdGenerator, ResourceId, ResourceIdGenerator};
use crate::core::services::HandleServices;
use crate::core::types::{HandleResult, Row, Value};
use crate::diag::{Event, Payload, Severity};
use crate::driver::{
    DriverResult, RawCallableStatement, RawConnection, RawPreparedStatement, RawStatement,
};
use crate::guard::GuardRef;
use crate::handle::LogicalHandle;
use crate::registry::TrackedResource;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::OnceLock;

fn statement_ids() -> &'static ResourceIdGenerator {
    static IDS: OnceLock<ResourceIdGenerator> = OnceLock::new();
    IDS.get_or_init(ResourceIdGenerator::default_start)
}

/// Shared core of every statement-level strategy
///
/// Holds the raw statement, the parent's guard (the SAME cell, never a
/// copy), and a weak back-reference to the owning handle for
/// deregistration. The raw slot empties on release; the guard decides
/// whether that reads as "statement closed" or "handle closed" to the
/// caller, and both read as `InvalidHandle`.
pub(crate) struct StatementCore<C: RawConnection, S: RawStatement> {
    handle: Weak<LogicalHandle<C>>,
    guard: GuardRef,
    services: HandleServices,
    id: ResourceId,
    kind: &'static str,
    sql: Option<String>,
    raw: RefCell<Option<S>>,
}

impl<C: RawConnection, S: RawStatement> StatementCore<C, S> {
    pub(crate) fn new(
        raw: S,
        sql: Option<String>,
        kind: &'static str,
        handle: &Rc<LogicalHandle<C>>,
    ) -> Rc<Self> {
        Rc::new(Self {
            handle: Rc::downgrade(handle),
            guard: Rc::clone(handle.guard()),
            services: handle.services().clone(),
            id: statement_ids().next(),
            kind,
            sql,
            raw: RefCell::new(Some(raw)),
        })
    }

    /// Guard check, forward, translate: the interception pipeline for
    /// one statement operation
    fn dispatch<R>(
        &self,
        operation: &'static str,
        call: impl FnOnce(&mut S) -> DriverResult<R>,
    ) -> HandleResult<R> {
        log::trace!("handling {} operation `{}`", self.kind, operation);
        self.services.emit(Event::new(
            Severity::Trace,
            self.guard.handle_id(),
            Payload::Dispatch {
                resource_type: self.kind.into(),
                operation: operation.into(),
            },
        ));
        self.guard.error_if_invalid(operation)?;
        let mut slot = self.raw.borrow_mut();
        let raw = slot.as_mut().ok_or_else(|| self.closed_error(operation))?;
        call(raw).map_err(|e| self.services.translate(e, operation))
    }

    /// Escape hatch: run against the actual raw statement
    fn with_raw<R>(&self, f: impl FnOnce(&mut S) -> R) -> HandleResult<R> {
        self.guard.error_if_invalid("with_raw")?;
        let mut slot = self.raw.borrow_mut();
        let raw = slot.as_mut().ok_or_else(|| self.closed_error("with_raw"))?;
        Ok(f(raw))
    }

    /// Cancel bypasses the guard: it forwards when a raw statement is
    /// still held and is a safe no-op otherwise
    fn cancel(&self) -> HandleResult<()> {
        match self.raw.borrow_mut().as_mut() {
            Some(raw) => raw.cancel().map_err(|e| self.services.translate(e, "cancel")),
            None => Ok(()),
        }
    }

    /// Explicit close: deregister and release; bypasses the guard and
    /// is idempotent
    fn close(&self) -> HandleResult<()> {
        if self.raw.borrow().is_none() {
            return Ok(());
        }
        log::trace!("closing {} {}", self.kind, self.id);
        let translate = |e| self.services.translate(e, "close");
        match self.handle.upgrade() {
            Some(handle) => {
                let released = handle
                    .release_resource(self.id, self.kind)
                    .map_err(translate)?;
                if !released {
                    // never registered; release directly
                    self.force_release().map_err(translate)?;
                }
                Ok(())
            }
            None => self.force_release().map_err(translate),
        }
    }

    fn closed_error(&self, operation: &str) -> HandleError {
        HandleError::InvalidHandle {
            operation: operation.into(),
            handle: self.guard.handle_id(),
        }
    }

    fn is_open(&self) -> bool {
        self.guard.is_valid() && self.raw.borrow().is_some()
    }
}

impl<C: RawConnection, S: RawStatement> TrackedResource for StatementCore<C, S> {
    fn resource_id(&self) -> ResourceId {
        self.id
    }

    fn resource_type(&self) -> &'static str {
        self.kind
    }

    fn force_release(&self) -> DriverResult<()> {
        match self.raw.borrow_mut().take() {
            Some(mut raw) => raw.close(),
            None => Ok(()),
        }
    }
}

// ============================================================================
// Statement
// ============================================================================

/// Proxy over a plain statement
pub struct Statement<C: RawConnection> {
    core: Rc<StatementCore<C, C::Statement>>,
}

impl<C: RawConnection> Statement<C> {
    pub(crate) fn build(raw: C::Statement, handle: &Rc<LogicalHandle<C>>) -> Self {
        Self {
            core: StatementCore::new(raw, None, "statement", handle),
        }
    }

    pub(crate) fn as_tracked(&self) -> Rc<dyn TrackedResource> {
        self.core.clone() as Rc<dyn TrackedResource>
    }

    /// Derived-resource identity token
    pub fn id(&self) -> ResourceId {
        self.core.id
    }

    /// True until this statement or its parent handle is closed
    pub fn is_open(&self) -> bool {
        self.core.is_open()
    }

    pub fn execute(&self, sql: &str) -> HandleResult<u64> {
        self.core.dispatch("execute", |s| s.execute(sql))
    }

    pub fn query(&self, sql: &str) -> HandleResult<Vec<Row>> {
        self.core.dispatch("query", |s| s.query(sql))
    }

    pub fn cancel(&self) -> HandleResult<()> {
        self.core.cancel()
    }

    pub fn close(&self) -> HandleResult<()> {
        self.core.close()
    }

    /// Escape hatch: operate directly on the raw statement
    pub fn with_raw<R>(&self, f: impl FnOnce(&mut C::Statement) -> R) -> HandleResult<R> {
        self.core.with_raw(f)
    }
}

impl<C: RawConnection> fmt::Debug for Statement<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Statement")
            .field("id", &self.core.id)
            .field("open", &self.core.is_open())
            .finish()
    }
}

// ============================================================================
// PreparedStatement
// ============================================================================

/// Proxy over a statement precompiled against a fixed SQL string
pub struct PreparedStatement<C: RawConnection> {
    core: Rc<StatementCore<C, C::Prepared>>,
}

impl<C: RawConnection> PreparedStatement<C> {
    pub(crate) fn build(sql: &str, raw: C::Prepared, handle: &Rc<LogicalHandle<C>>) -> Self {
        Self {
            core: StatementCore::new(raw, Some(sql.to_string()), "prepared_statement", handle),
        }
    }

    pub(crate) fn as_tracked(&self) -> Rc<dyn TrackedResource> {
        self.core.clone() as Rc<dyn TrackedResource>
    }

    pub fn id(&self) -> ResourceId {
        self.core.id
    }

    pub fn is_open(&self) -> bool {
        self.core.is_open()
    }

    /// The SQL this statement was prepared against
    pub fn sql(&self) -> &str {
        self.core.sql.as_deref().unwrap_or_default()
    }

    pub fn bind(&self, index: usize, value: Value) -> HandleResult<()> {
        self.core.dispatch("bind", |s| s.bind(index, value))
    }

    pub fn execute(&self) -> HandleResult<u64> {
        self.core.dispatch("execute", |s| s.execute_prepared())
    }

    pub fn query(&self) -> HandleResult<Vec<Row>> {
        self.core.dispatch("query", |s| s.query_prepared())
    }

    pub fn cancel(&self) -> HandleResult<()> {
        self.core.cancel()
    }

    pub fn close(&self) -> HandleResult<()> {
        self.core.close()
    }

    pub fn with_raw<R>(&self, f: impl FnOnce(&mut C::Prepared) -> R) -> HandleResult<R> {
        self.core.with_raw(f)
    }
}

impl<C: RawConnection> fmt::Debug for PreparedStatement<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedStatement")
            .field("id", &self.core.id)
            .field("sql", &self.sql())
            .field("open", &self.core.is_open())
            .finish()
    }
}

// ============================================================================
// CallableStatement
// ============================================================================

/// Proxy over a prepared statement that invokes stored procedures
pub struct CallableStatement<C: RawConnection> {
    core: Rc<StatementCore<C, C::Callable>>,
}

impl<C: RawConnection> CallableStatement<C> {
    pub(crate) fn build(sql: &str, raw: C::Callable, handle: &Rc<LogicalHandle<C>>) -> Self {
        Self {
            core: StatementCore::new(raw, Some(sql.to_string()), "callable_statement", handle),
        }
    }

    pub(crate) fn as_tracked(&self) -> Rc<dyn TrackedResource> {
        self.core.clone() as Rc<dyn TrackedResource>
    }

    pub fn id(&self) -> ResourceId {
        self.core.id
    }

    pub fn is_open(&self) -> bool {
        self.core.is_open()
    }

    pub fn sql(&self) -> &str {
        self.core.sql.as_deref().unwrap_or_default()
    }

    pub fn bind(&self, index: usize, value: Value) -> HandleResult<()> {
        self.core.dispatch("bind", |s| s.bind(index, value))
    }

    pub fn register_out_param(&self, index: usize) -> HandleResult<()> {
        self.core
            .dispatch("register_out_param", |s| s.register_out_param(index))
    }

    pub fn out_param(&self, index: usize) -> HandleResult<Value> {
        self.core.dispatch("out_param", |s| s.out_param(index))
    }

    pub fn execute(&self) -> HandleResult<u64> {
        self.core.dispatch("execute", |s| s.execute_prepared())
    }

    pub fn query(&self) -> HandleResult<Vec<Row>> {
        self.core.dispatch("query", |s| s.query_prepared())
    }

    pub fn cancel(&self) -> HandleResult<()> {
        self.core.cancel()
    }

    pub fn close(&self) -> HandleResult<()> {
        self.core.close()
    }

    pub fn with_raw<R>(&self, f: impl FnOnce(&mut C::Callable) -> R) -> HandleResult<R> {
        self.core.with_raw(f)
    }
}

impl<C: RawConnection> fmt::Debug for CallableStatement<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallableStatement")
            .field("id", &self.core.id)
            .field("sql", &self.sql())
            .field("open", &self.core.is_open())
            .finish()
    }
}
