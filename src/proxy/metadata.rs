/*!
 * Metadata Proxy
 * Read-only stand-in for server and driver identity
 *
 * Metadata objects have no release primitive, so they are wrapped but
 * never registered; use-after-close safety comes entirely from the
 * shared guard.
 */

use crate::core::services::HandleServices;
use crate::core::types::HandleResult;
use crate::diag::{Event, Payload, Severity};
use crate::driver::{DriverResult, RawConnection, RawDatabaseMetadata};
use crate::guard::GuardRef;
use std::fmt;
use std::rc::Rc;

pub(crate) struct MetadataStrategy {
    guard: GuardRef,
    services: HandleServices,
}

impl MetadataStrategy {
    fn dispatch<R>(
        &self,
        operation: &'static str,
        call: impl FnOnce() -> DriverResult<R>,
    ) -> HandleResult<R> {
        log::trace!("handling metadata operation `{operation}`");
        self.services.emit(Event::new(
            Severity::Trace,
            self.guard.handle_id(),
            Payload::Dispatch {
                resource_type: "metadata".into(),
                operation: operation.into(),
            },
        ));
        self.guard.error_if_invalid(operation)?;
        call().map_err(|e| self.services.translate(e, operation))
    }
}

/// Proxy over a raw metadata object
pub struct DatabaseMetadata<C: RawConnection> {
    strategy: MetadataStrategy,
    raw: C::Metadata,
}

impl<C: RawConnection> DatabaseMetadata<C> {
    pub(crate) fn build(raw: C::Metadata, guard: &GuardRef, services: &HandleServices) -> Self {
        Self {
            strategy: MetadataStrategy {
                guard: Rc::clone(guard),
                services: services.clone(),
            },
            raw,
        }
    }

    pub fn product_name(&self) -> HandleResult<String> {
        self.strategy
            .dispatch("product_name", || self.raw.product_name())
    }

    pub fn product_version(&self) -> HandleResult<String> {
        self.strategy
            .dispatch("product_version", || self.raw.product_version())
    }

    pub fn driver_name(&self) -> HandleResult<String> {
        self.strategy
            .dispatch("driver_name", || self.raw.driver_name())
    }

    pub fn user_name(&self) -> HandleResult<String> {
        self.strategy.dispatch("user_name", || self.raw.user_name())
    }

    /// Escape hatch: the actual raw metadata object
    pub fn raw(&self) -> HandleResult<&C::Metadata> {
        self.strategy.guard.error_if_invalid("raw")?;
        Ok(&self.raw)
    }
}

impl<C: RawConnection> fmt::Debug for DatabaseMetadata<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseMetadata")
            .field("handle", &self.strategy.guard.handle_id())
            .field("valid", &self.strategy.guard.is_valid())
            .finish()
    }
}
