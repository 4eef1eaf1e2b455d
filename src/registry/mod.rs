/*!
 * Resource Registry
 * Tracks derived resources open under one logical handle
 *
 * Statements live only as long as their parent connection; the
 * registry is what lets handle teardown release every one of them
 * instead of leaking whatever the application forgot to close.
 */

use crate::core::errors::{HandleError, ReleaseFailure};
use crate::core::id::ResourceId;
use crate::driver::DriverResult;
use ahash::AHashSet;
use std::rc::Rc;

/// A derived resource the registry can release on its own
///
/// Implemented by the shared core of every statement proxy. Metadata
/// proxies have no release primitive and are never registered.
pub trait TrackedResource {
    /// Identity token, unique per derived resource
    fn resource_id(&self) -> ResourceId;

    /// Resource type name for logging
    fn resource_type(&self) -> &'static str;

    /// Invoke the low-level release primitive
    ///
    /// Idempotent: releasing an already-released resource is a no-op.
    fn force_release(&self) -> DriverResult<()>;
}

/// Insertion-ordered set of tracked resources
#[derive(Default)]
pub struct ResourceRegistry {
    entries: Vec<Rc<dyn TrackedResource>>,
    index: AHashSet<ResourceId>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a derived resource; re-registering silently coalesces
    pub fn register(&mut self, resource: Rc<dyn TrackedResource>) {
        if self.index.insert(resource.resource_id()) {
            log::trace!(
                "registering {} {}",
                resource.resource_type(),
                resource.resource_id()
            );
            self.entries.push(resource);
        }
    }

    /// Release one resource and stop tracking it
    ///
    /// Returns `Ok(false)` when the id was not tracked. The entry is
    /// removed even when the low-level release fails; the failure is
    /// handed back for the caller to translate.
    pub fn release(&mut self, id: ResourceId) -> DriverResult<bool> {
        if !self.index.remove(&id) {
            return Ok(false);
        }
        let pos = self
            .entries
            .iter()
            .position(|r| r.resource_id() == id)
            .expect("index and entries out of sync");
        let resource = self.entries.remove(pos);
        resource.force_release()?;
        Ok(true)
    }

    /// Release and clear every tracked resource, in insertion order
    ///
    /// Resilient: a failing resource is logged and the rest are still
    /// attempted; the aggregated failure surfaces only after all of
    /// them. Returns the number released cleanly.
    pub fn release_all(&mut self) -> Result<usize, HandleError> {
        let mut failures = Vec::new();
        let mut released = 0usize;

        for resource in self.entries.drain(..) {
            match resource.force_release() {
                Ok(()) => released += 1,
                Err(e) => {
                    log::warn!(
                        "{} {} failed to release: {}",
                        resource.resource_type(),
                        resource.resource_id(),
                        e
                    );
                    failures.push(ReleaseFailure {
                        resource: resource.resource_id(),
                        resource_type: resource.resource_type().into(),
                        message: e.to_string(),
                    });
                }
            }
        }
        self.index.clear();

        if failures.is_empty() {
            Ok(released)
        } else {
            Err(HandleError::AggregatedRelease { failures })
        }
    }

    /// Whether a resource is currently tracked
    #[inline]
    pub fn contains(&self, id: ResourceId) -> bool {
        self.index.contains(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
