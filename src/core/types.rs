/*!
 * Core Types
 * Common types used across the interception layer
 */

/// Inline-optimized string for short messages and operation names
///
/// Short strings (≤23 bytes) are stored without heap allocation;
/// most SQLSTATE codes, operation names, and resource type names fit.
pub type InlineString = smartstring::alias::String;

/// Cell value produced by a driver row
pub type Value = serde_json::Value;

/// A single row returned by a query, in column order
pub type Row = Vec<Value>;

/// Common result type for handle and proxy operations
pub type HandleResult<T> = Result<T, super::errors::HandleError>;
