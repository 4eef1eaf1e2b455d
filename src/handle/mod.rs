/*!
 * Logical Handle
 * Application-visible identity for a resource session, decoupled from
 * whichever physical connection currently backs it
 *
 * The pool layer constructs handles, rebinds them as physical
 * connections come and go, and closes them when the session ends.
 * Everything the application touches goes through proxies built over
 * the handle; the handle itself owns the physical binding, the
 * derived-resource registry, and the guard the whole proxy family
 * shares.
 */

use crate::core::errors::HandleError;
use crate::core::id::{HandleId, HandleIdGenerator, IdGenerator, ResourceId};
use crate::core::services::HandleServices;
use crate::core::types::HandleResult;
use crate::diag::{Event, Payload, Severity};
use crate::driver::{DriverResult, RawConnection};
use crate::guard::{GuardRef, InvalidationGuard};
use crate::registry::{ResourceRegistry, TrackedResource};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::OnceLock;

fn handle_ids() -> &'static HandleIdGenerator {
    static IDS: OnceLock<HandleIdGenerator> = OnceLock::new();
    IDS.get_or_init(HandleIdGenerator::default_start)
}

/// Observer of handle lifecycle events
///
/// Delivery is synchronous, in registration order. Obtain/release may
/// recur over a handle's life; closed is terminal and must leave every
/// guard the observer holds invalidated (invalidation is idempotent,
/// so an observer that already invalidated is fine).
pub trait HandleObserver<C: RawConnection> {
    /// A physical binding just became available
    fn on_physical_obtained(&self, _connection: &C) {}

    /// The physical binding was detached while the handle stays open
    fn on_physical_released(&self) {}

    /// The handle itself is permanently done
    fn on_handle_closed(&self) {}
}

/// Long-lived logical identity over a pooled physical connection
///
/// The handle's own closed state is distinct from the proxy family's
/// guard: an application may close its connection proxy (invalidating
/// the guard) while the pool still owns an open handle whose tracked
/// resources must be released at handle close.
pub struct LogicalHandle<C: RawConnection> {
    id: HandleId,
    guard: GuardRef,
    services: HandleServices,
    closed: Cell<bool>,
    physical: RefCell<Option<C>>,
    registry: RefCell<ResourceRegistry>,
    observers: RefCell<Vec<Rc<dyn HandleObserver<C>>>>,
}

impl<C: RawConnection> LogicalHandle<C> {
    /// Open a handle already bound to a physical connection
    pub fn open(connection: C, services: HandleServices) -> Rc<Self> {
        let handle = Self::unbound(services);
        *handle.physical.borrow_mut() = Some(connection);
        handle
    }

    /// Open a handle with no physical binding yet
    pub fn unbound(services: HandleServices) -> Rc<Self> {
        let id = handle_ids().next();
        services.emit(Event::new(Severity::Debug, id, Payload::HandleOpened));
        Rc::new(Self {
            id,
            guard: InvalidationGuard::new(id),
            services,
            closed: Cell::new(false),
            physical: RefCell::new(None),
            registry: RefCell::new(ResourceRegistry::new()),
            observers: RefCell::new(Vec::new()),
        })
    }

    /// Identity token; stable across rebinding
    #[inline]
    pub fn id(&self) -> HandleId {
        self.id
    }

    /// The guard shared by every proxy derived from this handle
    #[inline]
    pub fn guard(&self) -> &GuardRef {
        &self.guard
    }

    #[inline]
    pub fn services(&self) -> &HandleServices {
        &self.services
    }

    /// False once the handle has been closed
    #[inline]
    pub fn is_open(&self) -> bool {
        !self.closed.get()
    }

    /// Whether a physical connection is currently bound
    #[inline]
    pub fn is_bound(&self) -> bool {
        self.physical.borrow().is_some()
    }

    /// Register a lifecycle observer
    pub fn add_observer(&self, observer: Rc<dyn HandleObserver<C>>) {
        self.observers.borrow_mut().push(observer);
    }

    fn notify(&self, f: impl Fn(&Rc<dyn HandleObserver<C>>)) {
        // snapshot so observers cannot invalidate the iteration
        let observers: Vec<_> = self.observers.borrow().clone();
        for observer in &observers {
            f(observer);
        }
    }

    /// Bind a physical connection, returning any previous binding
    ///
    /// Fails once the handle is closed.
    pub fn bind_physical(&self, connection: C) -> HandleResult<Option<C>> {
        if self.closed.get() {
            return Err(HandleError::InvalidHandle {
                operation: "bind_physical".into(),
                handle: self.id,
            });
        }
        self.services
            .emit(Event::new(Severity::Debug, self.id, Payload::PhysicalObtained));
        self.notify(|o| o.on_physical_obtained(&connection));
        Ok(self.physical.borrow_mut().replace(connection))
    }

    /// Detach the physical connection, leaving the handle open
    ///
    /// The handle stays valid; operations fail with `Unbound` until
    /// the next `bind_physical`.
    pub fn release_physical(&self) -> Option<C> {
        let connection = self.physical.borrow_mut().take();
        if connection.is_some() {
            log::info!("logical handle {} releasing its physical connection", self.id);
            self.services
                .emit(Event::new(Severity::Info, self.id, Payload::PhysicalReleased));
            self.notify(|o| o.on_physical_released());
        }
        connection
    }

    /// Run a driver call against the bound connection
    ///
    /// This is the forwarding point for connection-level operations:
    /// guard check, unbound check, then the raw call with access-class
    /// failures translated at this boundary.
    pub fn with_connection<R>(
        &self,
        operation: &str,
        f: impl FnOnce(&mut C) -> DriverResult<R>,
    ) -> HandleResult<R> {
        self.guard.error_if_invalid(operation)?;
        let mut slot = self.physical.borrow_mut();
        let connection = slot.as_mut().ok_or(HandleError::Unbound { handle: self.id })?;
        f(connection).map_err(|e| self.services.translate(e, operation))
    }

    /// Escape hatch: run against the actual physical connection, no
    /// wrapping, no translation
    pub fn with_raw_connection<R>(&self, f: impl FnOnce(&mut C) -> R) -> HandleResult<R> {
        self.guard.error_if_invalid("with_raw")?;
        let mut slot = self.physical.borrow_mut();
        let connection = slot.as_mut().ok_or(HandleError::Unbound { handle: self.id })?;
        Ok(f(connection))
    }

    /// Track a derived resource for release at teardown
    pub(crate) fn register_resource(&self, resource: Rc<dyn TrackedResource>) {
        self.services.emit(Event::new(
            Severity::Debug,
            self.id,
            Payload::ResourceRegistered {
                resource: resource.resource_id(),
                resource_type: resource.resource_type().into(),
            },
        ));
        self.registry.borrow_mut().register(resource);
    }

    /// Release one tracked resource (explicit proxy close path)
    pub(crate) fn release_resource(
        &self,
        id: ResourceId,
        resource_type: &'static str,
    ) -> DriverResult<bool> {
        let released = self.registry.borrow_mut().release(id)?;
        if released {
            self.services.emit(Event::new(
                Severity::Debug,
                self.id,
                Payload::ResourceReleased {
                    resource: id,
                    resource_type: resource_type.into(),
                },
            ));
        }
        Ok(released)
    }

    /// Number of derived resources currently tracked
    pub fn resource_count(&self) -> usize {
        self.registry.borrow().len()
    }

    /// Whether a derived resource is currently tracked
    pub fn is_registered(&self, id: ResourceId) -> bool {
        self.registry.borrow().contains(id)
    }

    /// Close the handle for good; idempotent
    ///
    /// Teardown order: release every tracked derived resource, close
    /// any bound physical connection, notify observers, invalidate the
    /// guard. Release failures never abort teardown; they surface only
    /// after everything has been attempted (registry failures as
    /// `AggregatedRelease`, which takes precedence over a physical
    /// close failure).
    pub fn close(&self) -> HandleResult<()> {
        if self.closed.replace(true) {
            return Ok(());
        }
        log::info!("closing logical handle {}", self.id);

        let tracked = self.registry.borrow().len();
        let registry_result = self.registry.borrow_mut().release_all();
        let released = match &registry_result {
            Ok(n) => *n,
            Err(HandleError::AggregatedRelease { failures }) => tracked - failures.len(),
            Err(_) => 0,
        };

        let physical_result = match self.physical.borrow_mut().take() {
            Some(mut connection) => connection
                .close()
                .map_err(|e| self.services.translate(e, "close")),
            None => Ok(()),
        };
        if let Err(e) = &physical_result {
            log::warn!("physical connection close failed for handle {}: {}", self.id, e);
        }

        self.notify(|o| o.on_handle_closed());
        self.guard.invalidate();
        self.services.emit(Event::new(
            Severity::Info,
            self.id,
            Payload::HandleClosed {
                resources_released: released,
            },
        ));

        registry_result.map(|_| ()).and(physical_result)
    }
}
