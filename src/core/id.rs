/*!
 * ID Generation
 * Type-safe identity tokens for logical handles and derived resources
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// ============================================================================
// Type-Safe ID Wrappers
// ============================================================================

/// Logical handle identity token
///
/// Stable for the whole life of a handle, across any number of
/// physical rebindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandleId(pub u64);

/// Derived resource identity token (statements, metadata objects)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ID Generator
// ============================================================================

/// Generic ID generator interface
pub trait IdGenerator<T> {
    /// Generate next ID
    fn next(&self) -> T;

    /// Get current counter value (for debugging)
    fn current(&self) -> T;
}

/// Atomic counter generator
///
/// Handles and statements are long-lived relative to their id space;
/// no recycling is needed.
pub struct AtomicGenerator<T> {
    counter: Arc<AtomicU64>,
    _marker: std::marker::PhantomData<T>,
}

impl<T> AtomicGenerator<T> {
    /// Create new generator starting at given value
    #[inline]
    pub fn new(start: u64) -> Self {
        Self {
            counter: Arc::new(AtomicU64::new(start)),
            _marker: std::marker::PhantomData,
        }
    }

    /// Create new generator starting at 1
    #[inline]
    pub fn default_start() -> Self {
        Self::new(1)
    }
}

impl<T> Clone for AtomicGenerator<T> {
    fn clone(&self) -> Self {
        Self {
            counter: Arc::clone(&self.counter),
            _marker: std::marker::PhantomData,
        }
    }
}

impl IdGenerator<HandleId> for AtomicGenerator<HandleId> {
    #[inline]
    fn next(&self) -> HandleId {
        HandleId(self.counter.fetch_add(1, Ordering::SeqCst))
    }

    #[inline]
    fn current(&self) -> HandleId {
        HandleId(self.counter.load(Ordering::Relaxed))
    }
}

impl IdGenerator<ResourceId> for AtomicGenerator<ResourceId> {
    #[inline]
    fn next(&self) -> ResourceId {
        ResourceId(self.counter.fetch_add(1, Ordering::SeqCst))
    }

    #[inline]
    fn current(&self) -> ResourceId {
        ResourceId(self.counter.load(Ordering::Relaxed))
    }
}

// ============================================================================
// Convenience Type Aliases
// ============================================================================

/// Logical handle ID generator
pub type HandleIdGenerator = AtomicGenerator<HandleId>;

/// Derived resource ID generator
pub type ResourceIdGenerator = AtomicGenerator<ResourceId>;

// ============================================================================
// Tests
// ============================================================================
