/*!
 * Invalidation Guard
 * One-way validity flag shared across a proxy family
 *
 * Every strategy derived from a connection holds the SAME guard cell,
 * so invalidating the connection invalidates every statement and
 * metadata proxy without walking them.
 */

use crate::core::errors::HandleError;
use crate::core::id::HandleId;
use std::cell::Cell;
use std::rc::Rc;

/// Shared reference to a proxy family's guard
pub type GuardRef = Rc<InvalidationGuard>;

/// Per-handle validity state
///
/// The transition is one-way: once invalid, never valid again. The
/// cell is not synchronized; a handle and its proxies belong to one
/// logical owner at a time.
#[derive(Debug)]
pub struct InvalidationGuard {
    handle: HandleId,
    valid: Cell<bool>,
}

impl InvalidationGuard {
    /// Create a valid guard for a freshly acquired handle
    pub fn new(handle: HandleId) -> GuardRef {
        Rc::new(Self {
            handle,
            valid: Cell::new(true),
        })
    }

    /// Identity token of the owning handle
    #[inline]
    pub fn handle_id(&self) -> HandleId {
        self.handle
    }

    /// Pure validity query
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid.get()
    }

    /// Fail when the guard has been invalidated; no-op otherwise
    ///
    /// Checked at the start of every intercepted operation except
    /// close and cancel.
    pub fn error_if_invalid(&self, operation: &str) -> Result<(), HandleError> {
        if self.valid.get() {
            Ok(())
        } else {
            Err(HandleError::InvalidHandle {
                operation: operation.into(),
                handle: self.handle,
            })
        }
    }

    /// Transition to invalid; idempotent, never fails
    pub fn invalidate(&self) {
        if self.valid.replace(false) {
            log::trace!("invalidating handle {}", self.handle);
        }
    }
}
